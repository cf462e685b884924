//! HTTP inbound adapter exposing REST endpoints.

pub mod audit_logs;
pub mod check_email;
pub mod client_ip;
pub mod domains;
pub mod error;
pub mod health;
pub mod state;
pub mod sync;

pub use error::ApiResult;
