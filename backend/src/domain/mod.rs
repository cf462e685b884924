//! Transport-agnostic classification core.
//!
//! The domain layer owns the decision pipeline and the vocabulary it is
//! expressed in. Everything with I/O sits behind the traits in
//! [`ports`]; inbound and outbound adapters depend on this module, never
//! the other way round.

mod classification;
mod classification_service;
mod email;
mod error;
mod list_admin_service;
mod matcher;
pub mod ports;
mod sync_service;

pub use classification::{
    AuditAction, AuditEntry, CheckOutcome, Classification, DomainPage, DomainRecord,
    UnknownClassification, Verdict,
};
pub use classification_service::{ClassificationService, DEFAULT_VERDICT_TTL};
pub use email::{DomainName, DomainParseError, EmailParseError, NormalizedEmail};
pub use error::{Error, ErrorCode};
pub use list_admin_service::ListAdminService;
pub use matcher::DomainMatcher;
pub use sync_service::SyncService;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
