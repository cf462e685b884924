//! Driving port for bulk list resynchronization.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;

/// Counts reported by a completed sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Disposable domains installed.
    pub disposable: u64,
    /// Allowlisted domains installed.
    pub allowlisted: u64,
    /// Stale cached verdicts invalidated (zero unless immediate
    /// invalidation is configured).
    pub invalidated: u64,
}

/// Driving port exposed to inbound adapters and the background scheduler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncCommand: Send + Sync {
    /// Replace the authoritative lists from the upstream feeds and
    /// repopulate the verdict cache.
    async fn sync(&self) -> Result<SyncReport, Error>;
}

/// Fixture implementation reporting an empty sync.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSyncCommand;

#[async_trait]
impl SyncCommand for FixtureSyncCommand {
    async fn sync(&self) -> Result<SyncReport, Error> {
        Ok(SyncReport::default())
    }
}
