//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuditLog, CheckEmailCommand, DomainAdminCommand, FixtureAuditLog, FixtureCheckEmailCommand,
    FixtureDomainAdminCommand, FixtureSyncCommand, SyncCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub check_email: Arc<dyn CheckEmailCommand>,
    pub admin: Arc<dyn DomainAdminCommand>,
    pub sync: Arc<dyn SyncCommand>,
    pub audit: Arc<dyn AuditLog>,
}

impl HttpState {
    /// Construct state from port implementations.
    pub fn new(
        check_email: Arc<dyn CheckEmailCommand>,
        admin: Arc<dyn DomainAdminCommand>,
        sync: Arc<dyn SyncCommand>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            check_email,
            admin,
            sync,
            audit,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            check_email: Arc::new(FixtureCheckEmailCommand),
            admin: Arc::new(FixtureDomainAdminCommand),
            sync: Arc::new(FixtureSyncCommand),
            audit: Arc::new(FixtureAuditLog),
        }
    }
}
