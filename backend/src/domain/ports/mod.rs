//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log;
mod check_email_command;
mod domain_admin_command;
mod domain_feed;
mod domain_list_repository;
mod sync_command;
mod verdict_cache;

#[cfg(test)]
pub use audit_log::MockAuditLog;
pub use audit_log::{AuditLog, AuditLogError, FixtureAuditLog};
#[cfg(test)]
pub use check_email_command::MockCheckEmailCommand;
pub use check_email_command::{CheckEmailCommand, FixtureCheckEmailCommand};
#[cfg(test)]
pub use domain_admin_command::MockDomainAdminCommand;
pub use domain_admin_command::{AddDomainOutcome, DomainAdminCommand, FixtureDomainAdminCommand};
#[cfg(test)]
pub use domain_feed::MockDomainFeed;
pub use domain_feed::{DomainFeed, DomainFeedError, FeedKind, FixtureDomainFeed};
#[cfg(test)]
pub use domain_list_repository::MockDomainListRepository;
pub use domain_list_repository::{
    DomainListRepository, DomainListRepositoryError, FixtureDomainListRepository,
};
#[cfg(test)]
pub use sync_command::MockSyncCommand;
pub use sync_command::{FixtureSyncCommand, SyncCommand, SyncReport};
#[cfg(test)]
pub use verdict_cache::MockVerdictCache;
pub use verdict_cache::{
    FixtureVerdictCache, VerdictCache, VerdictCacheError, VerdictCacheKey,
};
