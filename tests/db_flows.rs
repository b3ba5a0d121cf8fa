// Fluxos que dependem do Postgres. Rodar com:
//   DATABASE_URL=postgres://... cargo test -- --ignored

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use orbita::{
    authz::{ResourceKind, ResourcePath, TenantScope},
    common::{error::AppError, multipart::UploadedFile},
    config::{AppState, Config},
    db::UserRepository,
    models::{
        auth::Actor,
        company::{ChangeStatusPayload, Company, CreateCompanyForm, UpdateProfileForm},
        rbac::{CreateRolePayload, PermissionKind, PermissionPayload},
        report::{CompanyExportFilter, CompanyExportQuery},
        timesheet::{ApprovalDecision, ApprovalPayload, CreateEntryPayload, CreateTimesheetPayload},
        workspace::{CreateProjectPayload, CreateSubTaskPayload, CreateTaskPayload, CreateWorkspacePayload, Workspace},
    },
    routes,
};

fn state(pool: PgPool) -> AppState {
    let config = Config {
        database_url: String::new(),
        jwt_secret: "segredo-de-teste".into(),
        bind_addr: "127.0.0.1:0".into(),
        storage_dir: std::env::temp_dir().join("orbita-db-tests"),
        db_max_connections: 1,
    };
    AppState::new(&config, pool)
}

async fn any_category(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories ORDER BY name LIMIT 1")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn form(email: &str, company_name: &str, category_id: Option<Uuid>) -> CreateCompanyForm {
    CreateCompanyForm {
        name: "Dono".into(),
        email: email.into(),
        password: "segredo123".into(),
        password_confirmation: "segredo123".into(),
        company_name: company_name.into(),
        category_id,
        address: None,
        phone: None,
        logo: None,
    }
}

async fn owner_with_company(app: &AppState, email: &str, name: &str) -> (Actor, Company) {
    let category = any_category(&app.db_pool).await;
    let (user, company) = app
        .company_service
        .create_company(form(email, name, Some(category)))
        .await
        .unwrap();
    (Actor { user, is_super_admin: false }, company)
}

async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(pool).await.unwrap()
}

async fn workspace(app: &AppState, actor: &Actor, company: &Company, name: &str) -> Workspace {
    app.workspace_service
        .create_workspace(
            actor,
            &TenantScope::Company(company.clone()),
            &CreateWorkspacePayload { name: name.into(), description: None, company_id: None },
        )
        .await
        .unwrap()
}

// Usuário comum, membro da empresa, sem papel nenhum
async fn member_of(app: &AppState, company: &Company, email: &str) -> Actor {
    let users = UserRepository::new(app.db_pool.clone());
    let user = users
        .create_user(&app.db_pool, "Membro", email, "hash-qualquer")
        .await
        .unwrap();
    users.set_company(&app.db_pool, user.id, company.id).await.unwrap();
    let user = users.find_by_id(user.id).await.unwrap().unwrap();
    Actor { user, is_super_admin: false }
}

fn role(name: &str, workspace_id: Option<Uuid>, permissions: &[&str]) -> CreateRolePayload {
    CreateRolePayload {
        name: name.into(),
        workspace_id,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

fn logo(bytes: &'static [u8]) -> UploadedFile {
    UploadedFile {
        file_name: "logo.png".into(),
        content_type: Some("image/png".into()),
        bytes: Bytes::from_static(bytes),
    }
}

async fn send(app: &AppState, method: &str, uri: &str, token: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = routes::app(app.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn company_creation_is_all_or_nothing(pool: PgPool) {
    let app = state(pool.clone());

    // Categoria inexistente: o INSERT da empresa falha depois do usuário
    let err = app
        .company_service
        .create_company(form("atomico@teste.com", "Atômica", Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("atomico@teste.com")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn created_owner_gets_company_role_and_membership(pool: PgPool) {
    let app = state(pool.clone());
    let (actor, company) = owner_with_company(&app, "dono@acme.com", "Acme Consultoria").await;

    assert_eq!(actor.user.company_id, Some(company.id));
    assert!(company.is_active);
    assert!(company.slug.starts_with("acme-consultoria-"));
    assert_eq!(company.email, "dono@acme.com");

    let rows = app.rbac_repo.grant_rows(actor.id()).await.unwrap();
    assert!(rows.iter().any(|r| r.role_name == "company" && r.role_company_id.is_none()));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn suspension_writes_exactly_one_appeal_log(pool: PgPool) {
    let app = state(pool.clone());
    let (owner, company) = owner_with_company(&app, "alvo@teste.com", "Alvo").await;
    let (admin, _) = owner_with_company(&app, "admin@teste.com", "Admin").await;
    let admin = Actor { is_super_admin: true, ..admin };

    let suspended = app
        .company_service
        .change_status(
            &admin,
            company.id,
            &ChangeStatusPayload { is_active: false, reason: Some("policy violation".into()) },
        )
        .await
        .unwrap();
    assert!(!suspended.is_active);

    // Repetir o mesmo estado não gera histórico
    app.company_service
        .change_status(&admin, company.id, &ChangeStatusPayload { is_active: false, reason: None })
        .await
        .unwrap();

    let logs = app.company_service.appeal_logs(company.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].company_id, company.id);
    assert_eq!(logs[0].user_id, admin.id());
    assert_eq!(logs[0].status_to.as_str(), "suspended");
    assert_eq!(logs[0].reason.as_deref(), Some("policy violation"));
    assert_ne!(logs[0].user_id, owner.id());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn toggling_a_sub_task_twice_restores_it(pool: PgPool) {
    let app = state(pool.clone());
    let (actor, company) = owner_with_company(&app, "tarefas@teste.com", "Tarefas").await;
    let scope = TenantScope::Company(company);

    let ws = app
        .workspace_service
        .create_workspace(&actor, &scope, &CreateWorkspacePayload { name: "Ops".into(), description: None, company_id: None })
        .await
        .unwrap();
    let project = app
        .workspace_service
        .create_project(ws.id, &CreateProjectPayload { name: "Migração".into(), description: None })
        .await
        .unwrap();
    let task = app
        .workspace_service
        .create_task(
            &actor,
            project.id,
            &CreateTaskPayload { title: "Servidor".into(), description: None, status: None, due_date: None },
        )
        .await
        .unwrap();
    let sub_task = app
        .workspace_service
        .create_sub_task(project.id, task.id, &CreateSubTaskPayload { title: "Criar usuário".into() })
        .await
        .unwrap();
    assert!(!sub_task.is_completed);

    let once = app.workspace_service.toggle_sub_task(&actor, sub_task.id).await.unwrap();
    assert!(once.is_completed);
    assert_eq!(once.completed_by, Some(actor.id()));

    let twice = app.workspace_service.toggle_sub_task(&actor, sub_task.id).await.unwrap();
    assert!(!twice.is_completed);
    assert_eq!(twice.completed_by, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn broken_chain_is_not_found_and_foreign_chain_is_forbidden(pool: PgPool) {
    let app = state(pool.clone());
    let (actor, company) = owner_with_company(&app, "hier@teste.com", "Hierarquia").await;
    let (stranger, _) = owner_with_company(&app, "outra@teste.com", "Outra").await;
    let scope = TenantScope::Company(company);

    let ws = app
        .workspace_service
        .create_workspace(&actor, &scope, &CreateWorkspacePayload { name: "WS".into(), description: None, company_id: None })
        .await
        .unwrap();
    let p1 = app
        .workspace_service
        .create_project(ws.id, &CreateProjectPayload { name: "P1".into(), description: None })
        .await
        .unwrap();
    let p2 = app
        .workspace_service
        .create_project(ws.id, &CreateProjectPayload { name: "P2".into(), description: None })
        .await
        .unwrap();
    let task = app
        .workspace_service
        .create_task(&actor, p2.id, &CreateTaskPayload { title: "T".into(), description: None, status: None, due_date: None })
        .await
        .unwrap();
    let sub_task = app
        .workspace_service
        .create_sub_task(p2.id, task.id, &CreateSubTaskPayload { title: "S".into() })
        .await
        .unwrap();

    // A tarefa é do projeto 2, a URL diz projeto 1
    let wrong = ResourcePath::workspace(ws.id)
        .then(ResourceKind::Project, p1.id)
        .then(ResourceKind::Task, task.id)
        .then(ResourceKind::SubTask, sub_task.id);
    assert!(matches!(
        app.hierarchy.authorize(&actor, &wrong).await,
        Err(AppError::ResourceNotFound)
    ));

    let right = ResourcePath::workspace(ws.id)
        .then(ResourceKind::Project, p2.id)
        .then(ResourceKind::Task, task.id)
        .then(ResourceKind::SubTask, sub_task.id);
    assert!(app.hierarchy.authorize(&actor, &right).await.is_ok());
    assert!(matches!(
        app.hierarchy.authorize(&stranger, &right).await,
        Err(AppError::TenantMismatch)
    ));

    // Super-admin passa na posse, mas não numa cadeia quebrada
    let admin = Actor { is_super_admin: true, ..stranger };
    assert!(app.hierarchy.authorize(&admin, &right).await.is_ok());
    assert!(matches!(
        app.hierarchy.authorize(&admin, &wrong).await,
        Err(AppError::ResourceNotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn timesheet_totals_follow_entries_until_decided(pool: PgPool) {
    let app = state(pool.clone());
    let (actor, company) = owner_with_company(&app, "horas@teste.com", "Horas").await;
    let scope = TenantScope::Company(company);
    let ws = app
        .workspace_service
        .create_workspace(&actor, &scope, &CreateWorkspacePayload { name: "WS".into(), description: None, company_id: None })
        .await
        .unwrap();

    let day = |d: u32| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
    let timesheet = app
        .timesheet_service
        .create(&actor, ws.id, &CreateTimesheetPayload { task_id: None, start_date: day(3), end_date: day(7) })
        .await
        .unwrap();

    let entry = |d: u32, start: &str, end: &str| CreateEntryPayload {
        work_date: day(d),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        is_billable: true,
        description: None,
    };

    let first = app.timesheet_service.add_entry(timesheet.id, &entry(3, "09:00:00", "12:30:00")).await.unwrap();
    app.timesheet_service.add_entry(timesheet.id, &entry(4, "13:00:00", "17:00:00")).await.unwrap();

    let total = |id| count(&pool, "SELECT (total_hours * 100)::BIGINT FROM timesheets WHERE id = $1", id);
    assert_eq!(total(timesheet.id).await, 750);

    app.timesheet_service.delete_entry(timesheet.id, first.id).await.unwrap();
    assert_eq!(total(timesheet.id).await, 400);

    // Fora do período da folha
    assert!(matches!(
        app.timesheet_service.add_entry(timesheet.id, &entry(10, "09:00:00", "10:00:00")).await,
        Err(AppError::ValidationError(_))
    ));

    let approval = app
        .timesheet_service
        .decide(&actor, timesheet.id, &ApprovalPayload { decision: ApprovalDecision::Approved, comments: None })
        .await
        .unwrap();
    assert_eq!(approval.timesheet_id, timesheet.id);

    assert!(matches!(
        app.timesheet_service.add_entry(timesheet.id, &entry(5, "09:00:00", "10:00:00")).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        app.timesheet_service
            .decide(&actor, timesheet.id, &ApprovalPayload { decision: ApprovalDecision::Rejected, comments: None })
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn export_filters_active_companies_sorted_by_name(pool: PgPool) {
    let app = state(pool.clone());
    let (admin, _) = owner_with_company(&app, "root@teste.com", "Zeta").await;
    let admin = Actor { is_super_admin: true, ..admin };
    let (_, beta) = owner_with_company(&app, "beta@teste.com", "Beta").await;
    owner_with_company(&app, "alfa@teste.com", "Alfa").await;

    app.company_service
        .change_status(&admin, beta.id, &ChangeStatusPayload { is_active: false, reason: None })
        .await
        .unwrap();

    let filter = CompanyExportFilter::try_from(CompanyExportQuery {
        is_active: Some("1".into()),
        sort_by: Some("name".into()),
        sort_dir: Some("asc".into()),
        ..Default::default()
    })
    .unwrap();
    let file = app.report_service.export_companies(&filter).await.unwrap();
    assert!(file.file_name.starts_with("companies_") && file.file_name.ends_with(".csv"));

    let csv = String::from_utf8(file.content).unwrap();
    let names: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(names, vec!["Alfa", "Zeta"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn profile_update_keeps_absent_fields_and_swaps_logo_only_on_upload(pool: PgPool) {
    let app = state(pool.clone());
    let category = any_category(&pool).await;
    let mut create = form("perfil@teste.com", "Perfil Ltda", Some(category));
    create.address = Some("Rua A, 10".into());
    create.phone = Some("1199".into());
    create.logo = Some(logo(b"logo-antigo"));
    let (user, company) = app.company_service.create_company(create).await.unwrap();
    let actor = Actor { user, is_super_admin: false };
    let old_logo = company.logo_path.clone().expect("logo gravado");
    let storage = std::env::temp_dir().join("orbita-db-tests");

    sqlx::query("UPDATE users SET email_verified_at = NOW() WHERE id = $1")
        .bind(actor.id())
        .execute(&pool)
        .await
        .unwrap();

    let update = |company_name: Option<&str>, new_logo: Option<UploadedFile>| UpdateProfileForm {
        name: "Dono Renomeado".into(),
        email: "perfil@teste.com".into(),
        company_name: company_name.map(String::from),
        address: None,
        phone: None,
        logo: new_logo,
    };

    // Sem nome da empresa, sem contato, sem logo: nada disso muda
    let kept = app.company_service.update_profile(&actor, update(None, None)).await.unwrap();
    let kept_company = kept.company.expect("empresa");
    assert_eq!(kept.user.name, "Dono Renomeado");
    assert!(kept.user.email_verified_at.is_some());
    assert_eq!(kept_company.slug, company.slug);
    assert_eq!(kept_company.address.as_deref(), Some("Rua A, 10"));
    assert_eq!(kept_company.phone.as_deref(), Some("1199"));
    assert_eq!(kept_company.logo_path.as_deref(), Some(old_logo.as_str()));
    assert!(storage.join(&old_logo).exists());

    // Mesmo nome: o slug fica
    let same = app
        .company_service
        .update_profile(&actor, update(Some("Perfil Ltda"), None))
        .await
        .unwrap();
    assert_eq!(same.company.expect("empresa").slug, company.slug);

    // Nome novo + logo novo: slug regenerado e logo antigo removido
    let renamed = app
        .company_service
        .update_profile(&actor, update(Some("Novo Nome"), Some(logo(b"logo-novo"))))
        .await
        .unwrap();
    let renamed_company = renamed.company.expect("empresa");
    assert!(renamed_company.slug.starts_with("novo-nome-"));
    let new_logo = renamed_company.logo_path.expect("logo novo");
    assert_ne!(new_logo, old_logo);
    assert!(storage.join(&new_logo).exists());
    assert!(!storage.join(&old_logo).exists());
    assert!(renamed.user.email_verified_at.is_some());
    assert_eq!(renamed_company.address.as_deref(), Some("Rua A, 10"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn roles_stay_inside_their_company(pool: PgPool) {
    let app = state(pool.clone());
    let (owner_a, company_a) = owner_with_company(&app, "a@teste.com", "Empresa A").await;
    let (owner_b, company_b) = owner_with_company(&app, "b@teste.com", "Empresa B").await;
    let scope_a = TenantScope::Company(company_a.clone());
    let scope_b = TenantScope::Company(company_b.clone());
    let ws_b = workspace(&app, &owner_b, &company_b, "WS B").await;

    // Workspace de outra empresa
    assert!(matches!(
        app.rbac_service.create_role(&owner_a, &scope_a, &role("Intruso", Some(ws_b.id), &[])).await,
        Err(AppError::TenantMismatch)
    ));

    // Nomes dos papéis globais
    for reserved in ["admin", "Company"] {
        assert!(matches!(
            app.rbac_service.create_role(&owner_a, &scope_a, &role(reserved, None, &[])).await,
            Err(AppError::ValidationError(_))
        ));
    }

    // Papel de outra empresa
    let role_b = app.rbac_service.create_role(&owner_b, &scope_b, &role("Equipe B", None, &[])).await.unwrap();
    assert!(matches!(
        app.rbac_service.assign_role(&scope_a, role_b.role.id, owner_a.id()).await,
        Err(AppError::ResourceNotFound)
    ));

    // Usuário de outra empresa ou inexistente
    let role_a = app
        .rbac_service
        .create_role(&owner_a, &scope_a, &role("Equipe A", None, &["tasks.view"]))
        .await
        .unwrap();
    assert_eq!(role_a.role.company_id, Some(company_a.id));
    assert!(matches!(
        app.rbac_service.assign_role(&scope_a, role_a.role.id, owner_b.id()).await,
        Err(AppError::ResourceNotFound)
    ));
    assert!(matches!(
        app.rbac_service.assign_role(&scope_a, role_a.role.id, Uuid::new_v4()).await,
        Err(AppError::ResourceNotFound)
    ));

    // Membro da própria empresa recebe o papel
    let member = member_of(&app, &company_a, "membro-a@teste.com").await;
    let assigned = app.rbac_service.assign_role(&scope_a, role_a.role.id, member.id()).await.unwrap();
    assert_eq!(assigned.permissions, vec!["tasks.view".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn roles_only_carry_permissions_the_creator_holds(pool: PgPool) {
    let app = state(pool.clone());
    let (owner, company) = owner_with_company(&app, "limite@teste.com", "Limite").await;
    let scope = TenantScope::Company(company.clone());

    // Permissão paga cadastrada depois: o papel "company" não a tem
    let admin = Actor { is_super_admin: true, ..owner.clone() };
    app.rbac_service
        .create_permission(&PermissionPayload {
            name: "reports.premium".into(),
            module: "REPORTS".into(),
            kind: Some(PermissionKind::Unique),
            scope: None,
            price: Some(Decimal::new(4990, 2)),
            route_name: None,
            route_path: None,
            controller_action: None,
            icon: None,
            is_menu: false,
            is_group: false,
            group_routes: None,
        })
        .await
        .unwrap();

    let err = app
        .rbac_service
        .create_role(&owner, &scope, &role("Premium", None, &["tasks.view", "reports.premium"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(ref p) if p == "reports.premium"));

    // Membro com só "tasks.view" não repassa "roles.manage"
    let viewer = app
        .rbac_service
        .create_role(&owner, &scope, &role("Leitor", None, &["tasks.view"]))
        .await
        .unwrap();
    let member = member_of(&app, &company, "leitor@teste.com").await;
    app.rbac_service.assign_role(&scope, viewer.role.id, member.id()).await.unwrap();

    assert!(matches!(
        app.rbac_service.create_role(&member, &scope, &role("Gerente", None, &["roles.manage"])).await,
        Err(AppError::PermissionDenied(_))
    ));
    assert!(app
        .rbac_service
        .create_role(&member, &scope, &role("Leitor 2", None, &["tasks.view"]))
        .await
        .is_ok());

    // Super-admin não tem esse limite
    assert!(app
        .rbac_service
        .create_role(&admin, &TenantScope::Unrestricted, &role("Global Premium", None, &["reports.premium"]))
        .await
        .is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn tenant_role_named_admin_does_not_open_admin_routes(pool: PgPool) {
    let app = state(pool.clone());
    app.permissions.reload(&app.rbac_repo).await.unwrap();
    let (owner, company) = owner_with_company(&app, "esperto@teste.com", "Esperta").await;
    let token = app.auth_service.create_token(owner.id()).unwrap();

    let (status, body) = send(&app, "POST", "/api/roles", &token, Some(r#"{"name":"admin","permissions":[]}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("name").is_some());

    // Mesmo que exista um "admin" da empresa atribuído ao dono
    let role_id = sqlx::query_scalar::<_, Uuid>("INSERT INTO roles (name, company_id) VALUES ('admin', $1) RETURNING id")
        .bind(company.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    app.rbac_repo.assign_role(&pool, owner.id(), role_id).await.unwrap();

    let (status, _) = send(&app, "GET", "/api/companies", &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/permissions", &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn guard_checks_permission_and_workspace_scope_over_http(pool: PgPool) {
    let app = state(pool.clone());
    app.permissions.reload(&app.rbac_repo).await.unwrap();
    let (owner, company) = owner_with_company(&app, "guarda@teste.com", "Guarda").await;
    let ws1 = workspace(&app, &owner, &company, "Um").await;
    let ws2 = workspace(&app, &owner, &company, "Dois").await;

    let member = member_of(&app, &company, "sem-papel@teste.com").await;
    let token = app.auth_service.create_token(member.id()).unwrap();
    let projects = |ws: Uuid| format!("/api/workspaces/{}/projects", ws);

    // Autenticado, mas sem a permissão que guarda "projects.*"
    let (status, body) = send(&app, "GET", &projects(ws1.id), &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let scoped = app
        .rbac_service
        .create_role(&owner, &TenantScope::Company(company.clone()), &role("Projetos Um", Some(ws1.id), &["projects.access"]))
        .await
        .unwrap();
    app.rbac_service
        .assign_role(&TenantScope::Company(company.clone()), scoped.role.id, member.id())
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", &projects(ws1.id), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());

    // O papel só vale dentro do próprio workspace
    let (status, _) = send(&app, "GET", &projects(ws2.id), &token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de um Postgres em DATABASE_URL"]
async fn export_treats_empty_dates_as_absent(pool: PgPool) {
    let app = state(pool.clone());
    let (owner, _) = owner_with_company(&app, "raiz@teste.com", "Raiz").await;
    let admin_role = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM roles WHERE name = 'admin' AND company_id IS NULL AND workspace_id IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    app.rbac_repo.assign_role(&pool, owner.id(), admin_role).await.unwrap();
    let token = app.auth_service.create_token(owner.id()).unwrap();

    let (status, _) = send(&app, "GET", "/api/reports/company/export?start_date=&end_date=", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/reports/company/export?start_date=ontem", &token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("start_date").is_some());
}
