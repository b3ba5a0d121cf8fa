// src/models/timesheet.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Draft => "draft",
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Approved => "approved",
            TimesheetStatus::Rejected => "rejected",
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self, TimesheetStatus::Approved | TimesheetStatus::Rejected)
    }
}

impl TryFrom<String> for TimesheetStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(TimesheetStatus::Draft),
            "submitted" => Ok(TimesheetStatus::Submitted),
            "approved" => Ok(TimesheetStatus::Approved),
            "rejected" => Ok(TimesheetStatus::Rejected),
            _ => Err(UnknownVariant(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl ApprovalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalDecision::Approved => "approved",
            ApprovalDecision::Rejected => "rejected",
        }
    }

    pub fn resulting_status(&self) -> TimesheetStatus {
        match self {
            ApprovalDecision::Approved => TimesheetStatus::Approved,
            ApprovalDecision::Rejected => TimesheetStatus::Rejected,
        }
    }
}

impl TryFrom<String> for ApprovalDecision {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "approved" => Ok(ApprovalDecision::Approved),
            "rejected" => Ok(ApprovalDecision::Rejected),
            _ => Err(UnknownVariant(value)),
        }
    }
}

// Cabeçalho: um por usuário/workspace/período
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub task_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // Sempre a soma das horas das entradas
    #[schema(value_type = f64, example = 7.5)]
    pub total_hours: Decimal,

    #[sqlx(try_from = "String")]
    pub status: TimesheetStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timesheet {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub work_date: NaiveDate,

    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,

    #[schema(value_type = String, example = "12:30:00")]
    pub end_time: NaiveTime,

    #[schema(value_type = f64, example = 3.5)]
    pub hours: Decimal,

    pub is_billable: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetApproval {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub reviewer_id: Uuid,

    #[sqlx(try_from = "String")]
    pub decision: ApprovalDecision,

    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Horas decimais entre dois horários do mesmo dia, com 2 casas.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> Option<Decimal> {
    if end <= start {
        return None;
    }
    let seconds = (end - start).num_seconds();
    let hours = Decimal::from(seconds) / Decimal::from(3600);
    Some(hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Total de um timesheet a partir das horas das entradas.
pub fn total_hours(entries: &[Decimal]) -> Decimal {
    entries.iter().copied().sum()
}

// ---
// Payloads
// ---

fn validate_period(payload: &CreateTimesheetPayload) -> Result<(), ValidationError> {
    if payload.start_date > payload.end_date {
        let mut err = ValidationError::new("period");
        err.message = Some("A data inicial deve ser anterior ou igual à data final.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_period"))]
pub struct CreateTimesheetPayload {
    pub task_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_times(payload: &CreateEntryPayload) -> Result<(), ValidationError> {
    if payload.end_time <= payload.start_time {
        let mut err = ValidationError::new("time_range");
        err.message = Some("O horário final deve ser posterior ao inicial.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_times"))]
pub struct CreateEntryPayload {
    pub work_date: NaiveDate,

    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,

    #[schema(value_type = String, example = "12:30:00")]
    pub end_time: NaiveTime,

    #[serde(default = "default_billable")]
    pub is_billable: bool,

    #[validate(length(max = 1000, message = "Descrição muito longa."))]
    pub description: Option<String>,
}

fn default_billable() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    pub decision: ApprovalDecision,

    #[validate(length(max = 1000, message = "Comentário muito longo."))]
    pub comments: Option<String>,
}
