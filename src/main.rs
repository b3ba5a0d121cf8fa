//src/main.rs

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use orbita::{
    authz::PermissionMatcher,
    config::{connect_pool, AppState, Config},
    db::RbacRepository,
    routes,
    services::route_audit,
};

#[derive(Parser)]
#[command(name = "orbita", version, about = "API multi-empresa de workspaces, tarefas e folhas de horas")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sobe o servidor HTTP (padrão)
    Serve,
    /// Lista as rotas nomeadas e a permissão que protege cada uma
    #[command(alias = "app:check-routes")]
    CheckRoutes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::CheckRoutes => {
            check_routes().await;
            Ok(())
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let db_pool = connect_pool(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app_state = AppState::new(&config, db_pool);
    app_state.permissions.reload(&app_state.rbac_repo).await?;

    let app = routes::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// Diagnóstico: nunca falha. Sem banco, todas as rotas aparecem como abertas.
async fn check_routes() {
    let matcher = match load_catalog().await {
        Ok(matcher) => matcher,
        Err(e) => {
            tracing::error!("Não foi possível carregar o catálogo de permissões: {:#}", e);
            PermissionMatcher::empty()
        }
    };

    let rows = route_audit::audit(&routes::table(), &matcher);
    print!("{}", route_audit::render(&rows));
}

async fn load_catalog() -> anyhow::Result<PermissionMatcher> {
    let config = Config::from_env()?;
    let db_pool = connect_pool(&config).await?;
    let permissions = RbacRepository::new(db_pool).list_permissions().await?;
    Ok(PermissionMatcher::build(permissions))
}
