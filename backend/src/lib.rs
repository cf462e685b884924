//! Disposable email domain screening backend.
//!
//! The crate follows a ports-and-adapters layout: the decision pipeline
//! lives in [`domain`], transport and storage concerns live in [`inbound`]
//! and [`outbound`], and [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
