// src/events.rs

use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, TimesheetRepository},
    models::{company::AppealStatus, timesheet::total_hours},
};

/// Efeitos colaterais das mutações, publicados explicitamente pelo serviço
/// que fez a alteração.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    CompanyStatusChanged {
        company_id: Uuid,
        user_id: Uuid,
        status_to: AppealStatus,
        reason: Option<String>,
    },
    TimesheetEntriesChanged {
        timesheet_id: Uuid,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::CompanyStatusChanged { .. } => "company.status_changed",
            DomainEvent::TimesheetEntriesChanged { .. } => "timesheet.entries_changed",
        }
    }
}

/// Os handlers rodam na conexão (transação) de quem publicou: se um
/// falhar, a mutação inteira é desfeita.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn id(&self) -> &'static str;

    async fn handle(&self, conn: &mut PgConnection, event: &DomainEvent) -> Result<(), AppError>;
}

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Barramento com os handlers da aplicação.
    pub fn with_defaults(companies: CompanyRepository, timesheets: TimesheetRepository) -> Self {
        Self::new()
            .subscribe(AppealLogRecorder { companies })
            .subscribe(TimesheetTotalsRecalculator { timesheets })
    }

    pub async fn publish(&self, conn: &mut PgConnection, event: DomainEvent) -> Result<(), AppError> {
        tracing::debug!(event = event.name(), "Publicando evento");
        for handler in &self.handlers {
            if let Err(e) = handler.handle(&mut *conn, &event).await {
                tracing::error!(handler = handler.id(), event = event.name(), "Handler falhou: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Grava uma linha em `company_appeal_logs` a cada ativação/suspensão.
pub struct AppealLogRecorder {
    companies: CompanyRepository,
}

#[async_trait]
impl EventHandler for AppealLogRecorder {
    fn id(&self) -> &'static str {
        "appeal_log_recorder"
    }

    async fn handle(&self, conn: &mut PgConnection, event: &DomainEvent) -> Result<(), AppError> {
        let DomainEvent::CompanyStatusChanged { company_id, user_id, status_to, reason } = event else {
            return Ok(());
        };

        self.companies
            .insert_appeal_log(conn, *company_id, *user_id, *status_to, reason.as_deref())
            .await?;
        Ok(())
    }
}

/// Mantém `timesheets.total_hours` igual à soma das entradas.
pub struct TimesheetTotalsRecalculator {
    timesheets: TimesheetRepository,
}

#[async_trait]
impl EventHandler for TimesheetTotalsRecalculator {
    fn id(&self) -> &'static str {
        "timesheet_totals"
    }

    async fn handle(&self, conn: &mut PgConnection, event: &DomainEvent) -> Result<(), AppError> {
        let DomainEvent::TimesheetEntriesChanged { timesheet_id } = event else {
            return Ok(());
        };

        let hours = self.timesheets.entry_hours(&mut *conn, *timesheet_id).await?;
        let total = total_hours(&hours);
        self.timesheets.set_total_hours(&mut *conn, *timesheet_id, total).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl EventHandler for Arc<Counter> {
        fn id(&self) -> &'static str {
            "counter"
        }

        async fn handle(&self, _conn: &mut PgConnection, _event: &DomainEvent) -> Result<(), AppError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn subscribe_keeps_registration_order() {
        let counter = Arc::new(Counter::default());
        let bus = EventBus::new().subscribe(counter.clone()).subscribe(counter);
        assert_eq!(bus.handlers.len(), 2);
        assert_eq!(bus.handlers[0].id(), "counter");
    }

    #[test]
    fn event_names_are_stable() {
        let event = DomainEvent::TimesheetEntriesChanged { timesheet_id: Uuid::nil() };
        assert_eq!(event.name(), "timesheet.entries_changed");
    }
}
