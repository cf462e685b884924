//! PostgreSQL-backed `AuditLog` implementation using Diesel.
//!
//! Appends are single-row inserts; the table is never updated or deleted
//! from by the application. Reads page newest-first so the most recent
//! dispositions are always on the first page.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AuditLog, AuditLogError};
use crate::domain::{AuditAction, AuditEntry, DomainName, NormalizedEmail};

use super::models::{AuditLogRow, NewAuditLogRow};
use super::pool::{DbPool, PoolError};
use super::schema::audit_logs;

/// Diesel-backed implementation of the `AuditLog` port.
#[derive(Clone)]
pub struct DieselAuditLog {
    pool: DbPool,
}

impl DieselAuditLog {
    /// Create a new audit log backed by the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuditLogError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AuditLogError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AuditLogError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "audit log operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "audit log operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AuditLogError::connection("database connection error")
        }
        _ => AuditLogError::query("database error"),
    }
}

#[async_trait]
impl AuditLog for DieselAuditLog {
    async fn record(
        &self,
        email: &NormalizedEmail,
        domain: &DomainName,
        ip: Option<String>,
        action: AuditAction,
    ) -> Result<(), AuditLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewAuditLogRow {
            id: Uuid::new_v4(),
            email: email.as_str().to_owned(),
            domain: domain.as_str().to_owned(),
            ip,
            action: action.as_str().to_owned(),
        };
        diesel::insert_into(audit_logs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn recent(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AuditEntry>, AuditLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let rows: Vec<AuditLogRow> = audit_logs::table
            .order(audit_logs::recorded_at.desc())
            .offset(offset)
            .limit(i64::from(page_size))
            .select(AuditLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(AuditEntry::from).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<AuditEntry>, AuditLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AuditLogRow> = audit_logs::table
            .filter(audit_logs::email.eq(email))
            .order(audit_logs::recorded_at.desc())
            .select(AuditLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(AuditEntry::from).collect())
    }
}
