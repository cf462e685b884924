//! PostgreSQL persistence adapters.

mod diesel_audit_log;
mod diesel_domain_list_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_audit_log::DieselAuditLog;
pub use diesel_domain_list_repository::DieselDomainListRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
