// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    authz::gate::COMPANY_ROLE,
    common::{error::AppError, slug::company_slug, storage::LocalStorage},
    db::{
        company_repo::{CompanyProfileUpdate, NewCompany},
        CompanyRepository, RbacRepository, UserRepository,
    },
    events::{DomainEvent, EventBus},
    models::{
        auth::{Actor, User},
        company::{AppealStatus, ChangeStatusPayload, Company, CompanyAppealLog, CreateCompanyForm, ProfileResponse, UpdateProfileForm},
    },
    services::{auth::hash_password, tenancy_service::TenantService},
};

const LOGO_DIR: &str = "logos";

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    user_repo: UserRepository,
    rbac_repo: RbacRepository,
    tenants: TenantService,
    storage: LocalStorage,
    events: EventBus,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(
        company_repo: CompanyRepository,
        user_repo: UserRepository,
        rbac_repo: RbacRepository,
        tenants: TenantService,
        storage: LocalStorage,
        events: EventBus,
        pool: PgPool,
    ) -> Self {
        Self { company_repo, user_repo, rbac_repo, tenants, storage, events, pool }
    }

    /// Cadastro de empresa + dono. Tudo ou nada: se algo falhar, o usuário
    /// não fica no banco e o logo já gravado é apagado.
    pub async fn create_company(&self, form: CreateCompanyForm) -> Result<(User, Company), AppError> {
        // Checagem antecipada para devolver erro de campo em vez de 409
        if self.user_repo.find_by_email(&self.pool, &form.email).await?.is_some() {
            return Err(AppError::field("email", "unique", "Este e-mail já está em uso."));
        }

        let password_hash = hash_password(&form.password).await?;

        let logo_path = match &form.logo {
            Some(file) => Some(self.storage.put(LOGO_DIR, file).await?),
            None => None,
        };

        let result = self.create_company_tx(&form, &password_hash, logo_path.as_deref()).await;

        if result.is_err() {
            if let Some(path) = &logo_path {
                self.storage.delete(path).await;
            }
        }
        result
    }

    async fn create_company_tx(
        &self,
        form: &CreateCompanyForm,
        password_hash: &str,
        logo_path: Option<&str>,
    ) -> Result<(User, Company), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, &form.name, &form.email, password_hash)
            .await?;

        let company_role = self
            .rbac_repo
            .find_global_role(&mut *tx, COMPANY_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Papel global '{}' não cadastrado", COMPANY_ROLE))?;
        self.rbac_repo.assign_role(&mut *tx, user.id, company_role.id).await?;

        let slug = company_slug(&form.company_name);
        let company = self
            .company_repo
            .create(
                &mut *tx,
                &NewCompany {
                    user_id: user.id,
                    category_id: form.category_id,
                    name: &form.company_name,
                    slug: &slug,
                    logo_path,
                    email: &user.email,
                    address: form.address.as_deref(),
                    phone: form.phone.as_deref(),
                },
            )
            .await?;

        self.user_repo.set_company(&mut *tx, user.id, company.id).await?;

        tx.commit().await?;

        tracing::info!(company_id = %company.id, user_id = %user.id, "Empresa cadastrada");
        let user = User { company_id: Some(company.id), ..user };
        Ok((user, company))
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.company_repo.list_all().await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.company_repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound)
    }

    pub async fn appeal_logs(&self, company_id: Uuid) -> Result<Vec<CompanyAppealLog>, AppError> {
        self.get_company(company_id).await?;
        self.company_repo.list_appeal_logs(company_id).await
    }

    pub async fn profile(&self, actor: &Actor) -> Result<ProfileResponse, AppError> {
        let company = self.tenants.find_company(&actor.user).await?;
        Ok(ProfileResponse { user: actor.user.clone(), company })
    }

    /// Atualiza usuário e empresa na mesma transação. O slug só muda se o
    /// nome mudou; o logo antigo só é apagado depois do commit.
    pub async fn update_profile(&self, actor: &Actor, form: UpdateProfileForm) -> Result<ProfileResponse, AppError> {
        if let Some(other) = self.user_repo.find_by_email(&self.pool, &form.email).await? {
            if other.id != actor.id() {
                return Err(AppError::field("email", "unique", "Este e-mail já está em uso."));
            }
        }

        let current = self.tenants.find_company(&actor.user).await?;

        let new_logo = match (&form.logo, &current) {
            (Some(file), Some(_)) => Some(self.storage.put(LOGO_DIR, file).await?),
            _ => None,
        };

        let result = self.update_profile_tx(actor, &form, current.as_ref(), new_logo.as_deref()).await;

        match (&result, &new_logo) {
            (Err(_), Some(path)) => self.storage.delete(path).await,
            (Ok(_), Some(_)) => {
                if let Some(old) = current.as_ref().and_then(|c| c.logo_path.as_deref()) {
                    self.storage.delete(old).await;
                }
            }
            _ => {}
        }

        result
    }

    async fn update_profile_tx(
        &self,
        actor: &Actor,
        form: &UpdateProfileForm,
        current: Option<&Company>,
        new_logo: Option<&str>,
    ) -> Result<ProfileResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .update_profile(&mut *tx, actor.id(), &form.name, &form.email)
            .await?;

        let company = match current {
            Some(company) => {
                let name = form.company_name.as_deref().unwrap_or(&company.name);
                let slug = if name != company.name {
                    company_slug(name)
                } else {
                    company.slug.clone()
                };

                let update = CompanyProfileUpdate {
                    name,
                    slug: &slug,
                    email: &user.email,
                    // Campo ausente mantém o valor atual
                    address: form.address.as_deref().or(company.address.as_deref()),
                    phone: form.phone.as_deref().or(company.phone.as_deref()),
                    logo_path: new_logo.or(company.logo_path.as_deref()),
                };
                Some(self.company_repo.update_profile(&mut *tx, company.id, &update).await?)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "Perfil atualizado");
        Ok(ProfileResponse { user, company })
    }

    /// Ativa/suspende a empresa. Só publica o evento (e gera histórico)
    /// quando o estado realmente muda.
    pub async fn change_status(
        &self,
        actor: &Actor,
        company_id: Uuid,
        payload: &ChangeStatusPayload,
    ) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        let company = self
            .company_repo
            .find_for_update(&mut *tx, company_id)
            .await?
            .ok_or(AppError::ResourceNotFound)?;

        let Some(status_to) = AppealStatus::from_transition(company.is_active, payload.is_active) else {
            tx.commit().await?;
            return Ok(company);
        };

        let updated = self.company_repo.set_active(&mut *tx, company.id, payload.is_active).await?;

        let reason = payload
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);

        self.events
            .publish(
                &mut *tx,
                DomainEvent::CompanyStatusChanged {
                    company_id: company.id,
                    user_id: actor.id(),
                    status_to,
                    reason,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(company_id = %company.id, status = status_to.as_str(), "Status da empresa alterado");
        Ok(updated)
    }
}
