// src/db/timesheet_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::timesheet::{ApprovalDecision, Timesheet, TimesheetApproval, TimesheetEntry, TimesheetStatus},
};

const TIMESHEET_COLUMNS: &str =
    "id, user_id, workspace_id, task_id, start_date, end_date, total_hours, status, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, timesheet_id, work_date, start_time, end_time, hours, is_billable, description, created_at";

/// Entrada já validada e com as horas calculadas.
#[derive(Debug)]
pub struct NewEntry<'a> {
    pub work_date: NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub hours: Decimal,
    pub is_billable: bool,
    pub description: Option<&'a str>,
}

#[derive(Clone)]
pub struct TimesheetRepository {
    pool: PgPool,
}

impl TimesheetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Timesheet>, AppError> {
        let sql = format!(
            "SELECT {} FROM timesheets WHERE workspace_id = $1 ORDER BY start_date DESC, id",
            TIMESHEET_COLUMNS
        );
        let timesheets = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(timesheets)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        task_id: Option<Uuid>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Timesheet, AppError> {
        let sql = format!(
            r#"
            INSERT INTO timesheets (user_id, workspace_id, task_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TIMESHEET_COLUMNS
        );
        let timesheet = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(user_id)
            .bind(workspace_id)
            .bind(task_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(timesheet)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Timesheet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM timesheets WHERE id = $1 FOR UPDATE", TIMESHEET_COLUMNS);
        let timesheet = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(timesheet)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: TimesheetStatus) -> Result<Timesheet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE timesheets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TIMESHEET_COLUMNS
        );
        let timesheet = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(executor)
            .await?;
        Ok(timesheet)
    }

    pub async fn set_total_hours<'e, E>(&self, executor: E, id: Uuid, total: Decimal) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE timesheets SET total_hours = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(total)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // Entradas
    // ---

    pub async fn entry_hours<'e, E>(&self, executor: E, timesheet_id: Uuid) -> Result<Vec<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hours = sqlx::query_scalar::<_, Decimal>("SELECT hours FROM timesheet_entries WHERE timesheet_id = $1")
            .bind(timesheet_id)
            .fetch_all(executor)
            .await?;
        Ok(hours)
    }

    pub async fn insert_entry<'e, E>(&self, executor: E, timesheet_id: Uuid, entry: &NewEntry<'_>) -> Result<TimesheetEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO timesheet_entries (timesheet_id, work_date, start_time, end_time, hours, is_billable, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, TimesheetEntry>(&sql)
            .bind(timesheet_id)
            .bind(entry.work_date)
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(entry.hours)
            .bind(entry.is_billable)
            .bind(entry.description)
            .fetch_one(executor)
            .await?;
        Ok(entry)
    }

    pub async fn delete_entry<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM timesheet_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Aprovação
    // ---

    pub async fn insert_approval<'e, E>(
        &self,
        executor: E,
        timesheet_id: Uuid,
        reviewer_id: Uuid,
        decision: ApprovalDecision,
        comments: Option<&str>,
    ) -> Result<TimesheetApproval, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TimesheetApproval>(
            r#"
            INSERT INTO timesheet_approvals (timesheet_id, reviewer_id, decision, comments)
            VALUES ($1, $2, $3, $4)
            RETURNING id, timesheet_id, reviewer_id, decision, comments, created_at
            "#,
        )
        .bind(timesheet_id)
        .bind(reviewer_id)
        .bind(decision.as_str())
        .bind(comments)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Este timesheet já foi avaliado.".into());
                }
            }
            e.into()
        })
    }
}
