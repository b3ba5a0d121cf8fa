// src/services/timesheet_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{timesheet_repo::NewEntry, TimesheetRepository, WorkspaceRepository},
    events::{DomainEvent, EventBus},
    models::{
        auth::Actor,
        timesheet::{
            hours_between, ApprovalPayload, CreateEntryPayload, CreateTimesheetPayload, Timesheet,
            TimesheetApproval, TimesheetEntry,
        },
    },
};

#[derive(Clone)]
pub struct TimesheetService {
    repo: TimesheetRepository,
    workspace_repo: WorkspaceRepository,
    events: EventBus,
    pool: PgPool,
}

fn already_decided() -> AppError {
    AppError::Conflict("Este timesheet já foi avaliado.".into())
}

impl TimesheetService {
    pub fn new(repo: TimesheetRepository, workspace_repo: WorkspaceRepository, events: EventBus, pool: PgPool) -> Self {
        Self { repo, workspace_repo, events, pool }
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Timesheet>, AppError> {
        self.repo.list(workspace_id).await
    }

    pub async fn create(&self, actor: &Actor, workspace_id: Uuid, payload: &CreateTimesheetPayload) -> Result<Timesheet, AppError> {
        if let Some(task_id) = payload.task_id {
            if !self.workspace_repo.task_in_workspace(task_id, workspace_id).await? {
                return Err(AppError::field("task_id", "exists", "A tarefa não pertence a este workspace."));
            }
        }

        let timesheet = self
            .repo
            .create(actor.id(), workspace_id, payload.task_id, payload.start_date, payload.end_date)
            .await?;

        tracing::info!(timesheet_id = %timesheet.id, "Timesheet criado");
        Ok(timesheet)
    }

    /// Lança horas. O total do timesheet é recalculado pelo handler do
    /// evento, dentro da mesma transação.
    pub async fn add_entry(&self, timesheet_id: Uuid, payload: &CreateEntryPayload) -> Result<TimesheetEntry, AppError> {
        let hours = hours_between(payload.start_time, payload.end_time)
            .ok_or_else(|| AppError::field("end_time", "time_range", "O horário final deve ser posterior ao inicial."))?;

        let mut tx = self.pool.begin().await?;

        let timesheet = self
            .repo
            .find_for_update(&mut *tx, timesheet_id)
            .await?
            .ok_or(AppError::ResourceNotFound)?;

        if timesheet.status.is_decided() {
            return Err(already_decided());
        }
        if !timesheet.covers(payload.work_date) {
            return Err(AppError::field("work_date", "period", "A data está fora do período do timesheet."));
        }

        let entry = self
            .repo
            .insert_entry(
                &mut *tx,
                timesheet.id,
                &NewEntry {
                    work_date: payload.work_date,
                    start_time: payload.start_time,
                    end_time: payload.end_time,
                    hours,
                    is_billable: payload.is_billable,
                    description: payload.description.as_deref(),
                },
            )
            .await?;

        self.events
            .publish(&mut *tx, DomainEvent::TimesheetEntriesChanged { timesheet_id: timesheet.id })
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn delete_entry(&self, timesheet_id: Uuid, entry_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let timesheet = self
            .repo
            .find_for_update(&mut *tx, timesheet_id)
            .await?
            .ok_or(AppError::ResourceNotFound)?;

        if timesheet.status.is_decided() {
            return Err(already_decided());
        }

        if !self.repo.delete_entry(&mut *tx, entry_id).await? {
            return Err(AppError::ResourceNotFound);
        }

        self.events
            .publish(&mut *tx, DomainEvent::TimesheetEntriesChanged { timesheet_id: timesheet.id })
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Aprova ou rejeita. Um timesheet só é avaliado uma vez.
    pub async fn decide(&self, actor: &Actor, timesheet_id: Uuid, payload: &ApprovalPayload) -> Result<TimesheetApproval, AppError> {
        let mut tx = self.pool.begin().await?;

        let timesheet = self
            .repo
            .find_for_update(&mut *tx, timesheet_id)
            .await?
            .ok_or(AppError::ResourceNotFound)?;

        if timesheet.status.is_decided() {
            return Err(already_decided());
        }

        let approval = self
            .repo
            .insert_approval(&mut *tx, timesheet.id, actor.id(), payload.decision, payload.comments.as_deref())
            .await?;
        self.repo
            .set_status(&mut *tx, timesheet.id, payload.decision.resulting_status())
            .await?;

        tx.commit().await?;

        tracing::info!(
            timesheet_id = %timesheet.id,
            reviewer_id = %actor.id(),
            decision = payload.decision.as_str(),
            "Timesheet avaliado"
        );
        Ok(approval)
    }
}
