//! Port for the append-only audit sink and its read side.
//!
//! Writes are fire-and-observe: the classification response never waits on
//! a failed audit append. The paginated read operations back the audit-log
//! endpoints.

use async_trait::async_trait;

use crate::domain::{AuditAction, AuditEntry, DomainName, NormalizedEmail};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit log adapters.
    pub enum AuditLogError {
        /// Sink connection could not be established.
        Connection { message: String } =>
            "audit log connection failed: {message}",
        /// Append or query failed during execution.
        Query { message: String } =>
            "audit log query failed: {message}",
    }
}

/// Port for audit persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one audit entry.
    async fn record(
        &self,
        email: &NormalizedEmail,
        domain: &DomainName,
        ip: Option<String>,
        action: AuditAction,
    ) -> Result<(), AuditLogError>;

    /// Most recent entries, newest first.
    async fn recent(&self, page: u32, page_size: u32)
        -> Result<Vec<AuditEntry>, AuditLogError>;

    /// Every entry recorded for one email address, newest first.
    async fn find_by_email(&self, email: &str) -> Result<Vec<AuditEntry>, AuditLogError>;
}

/// Fixture sink that discards appends and returns no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditLog;

#[async_trait]
impl AuditLog for FixtureAuditLog {
    async fn record(
        &self,
        _email: &NormalizedEmail,
        _domain: &DomainName,
        _ip: Option<String>,
        _action: AuditAction,
    ) -> Result<(), AuditLogError> {
        Ok(())
    }

    async fn recent(
        &self,
        _page: u32,
        _page_size: u32,
    ) -> Result<Vec<AuditEntry>, AuditLogError> {
        Ok(Vec::new())
    }

    async fn find_by_email(&self, _email: &str) -> Result<Vec<AuditEntry>, AuditLogError> {
        Ok(Vec::new())
    }
}
