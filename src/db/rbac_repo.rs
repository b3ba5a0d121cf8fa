// src/db/rbac_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::rbac::{Permission, PermissionKind, PermissionPayload, PermissionScope, Role, RoleGrantRow},
};

const PERMISSION_COLUMNS: &str = "id, name, module, type, scope, price, route_name, route_path, \
     controller_action, icon, is_menu, is_group, group_routes, created_at, updated_at";

const ROLE_COLUMNS: &str = "id, name, guard_name, company_id, workspace_id, created_at";

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Catálogo de permissões
    // ---

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let sql = format!("SELECT {} FROM permissions ORDER BY module, name", PERMISSION_COLUMNS);
        let permissions = sqlx::query_as::<_, Permission>(&sql).fetch_all(&self.pool).await?;
        Ok(permissions)
    }

    pub async fn create_permission(&self, payload: &PermissionPayload) -> Result<Permission, AppError> {
        let sql = format!(
            r#"
            INSERT INTO permissions (
                name, module, type, scope, price, route_name, route_path,
                controller_action, icon, is_menu, is_group, group_routes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            PERMISSION_COLUMNS
        );
        bind_permission(sqlx::query_as::<_, Permission>(&sql), payload)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe uma permissão com esse nome."))
    }

    pub async fn update_permission(&self, id: Uuid, payload: &PermissionPayload) -> Result<Option<Permission>, AppError> {
        let sql = format!(
            r#"
            UPDATE permissions
            SET name = $1, module = $2, type = $3, scope = $4, price = $5, route_name = $6,
                route_path = $7, controller_action = $8, icon = $9, is_menu = $10,
                is_group = $11, group_routes = $12, updated_at = NOW()
            WHERE id = $13
            RETURNING {}
            "#,
            PERMISSION_COLUMNS
        );
        bind_permission(sqlx::query_as::<_, Permission>(&sql), payload)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe uma permissão com esse nome."))
    }

    // Resolve nomes ("tasks.manage") para permissões
    pub async fn find_permissions_by_names<'e, E>(&self, executor: E, names: &[String]) -> Result<Vec<Permission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM permissions WHERE name = ANY($1) ORDER BY id", PERMISSION_COLUMNS);
        let permissions = sqlx::query_as::<_, Permission>(&sql)
            .bind(names)
            .fetch_all(executor)
            .await?;
        Ok(permissions)
    }

    pub async fn find_permission_ids_by_scope<'e, E>(&self, executor: E, scope: PermissionScope) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM permissions WHERE scope = $1 ORDER BY id")
            .bind(scope.as_str())
            .fetch_all(executor)
            .await?;
        Ok(ids)
    }

    // ---
    // Papéis
    // ---

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        company_id: Option<Uuid>,
        workspace_id: Option<Uuid>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO roles (name, company_id, workspace_id) VALUES ($1, $2, $3) RETURNING {}",
            ROLE_COLUMNS
        );
        sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .bind(company_id)
            .bind(workspace_id)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe um cargo com esse nome neste escopo."))
    }

    pub async fn find_role(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let sql = format!("SELECT {} FROM roles WHERE id = $1", ROLE_COLUMNS);
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    /// Papel global (sem empresa e sem workspace), como `company` e `admin`.
    pub async fn find_global_role<'e, E>(&self, executor: E, name: &str) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM roles WHERE name = $1 AND company_id IS NULL AND workspace_id IS NULL",
            ROLE_COLUMNS
        );
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    /// Papéis globais + os da empresa (todos, se `company_id` for `None`).
    pub async fn list_roles(&self, company_id: Option<Uuid>) -> Result<Vec<Role>, AppError> {
        let sql = format!(
            "SELECT {} FROM roles WHERE $1::uuid IS NULL OR company_id IS NULL OR company_id = $1 ORDER BY name, id",
            ROLE_COLUMNS
        );
        let roles = sqlx::query_as::<_, Role>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn permission_names_for_role(&self, role_id: Uuid) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    // Inserção em massa usando UNNEST
    pub async fn assign_permissions<'e, E>(&self, executor: E, role_id: Uuid, permission_ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn assign_role<'e, E>(&self, executor: E, user_id: Uuid, role_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(role_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Todos os papéis do usuário com suas permissões (uma linha por par).
    /// O filtro de escopo é feito em memória por `Grants::from_rows`.
    pub async fn grant_rows(&self, user_id: Uuid) -> Result<Vec<RoleGrantRow>, AppError> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT
                r.name AS role_name,
                r.company_id AS role_company_id,
                r.workspace_id AS role_workspace_id,
                p.id AS permission_id,
                p.name AS permission_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

type PermissionQuery<'q> =
    sqlx::query::QueryAs<'q, Postgres, Permission, sqlx::postgres::PgArguments>;

// Mesma ordem de parâmetros no INSERT e no UPDATE ($1..$12)
fn bind_permission<'q>(query: PermissionQuery<'q>, payload: &'q PermissionPayload) -> PermissionQuery<'q> {
    let kind = payload.kind.unwrap_or(PermissionKind::General);
    let scope = payload.scope.unwrap_or(PermissionScope::Company);
    let group_routes = if payload.is_group {
        payload.group_routes.clone().map(Json)
    } else {
        None
    };

    query
        .bind(payload.name.trim())
        .bind(payload.module.trim())
        .bind(kind.as_str())
        .bind(scope.as_str())
        .bind(payload.price.unwrap_or_default())
        .bind(payload.route_name.as_deref().map(str::trim).filter(|r| !r.is_empty()))
        .bind(payload.route_path.as_deref())
        .bind(payload.controller_action.as_deref())
        .bind(payload.icon.as_deref())
        .bind(payload.is_menu)
        .bind(payload.is_group)
        .bind(group_routes)
}
