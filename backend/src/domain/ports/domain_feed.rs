//! Port for the upstream domain list feeds.
//!
//! The feed collaborator returns raw newline-delimited text; parsing and
//! normalization stay inside the sync service so every adapter behaves
//! identically.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by feed adapters.
    pub enum DomainFeedError {
        /// Network failure before a response arrived.
        Transport { message: String } =>
            "feed transport failure: {message}",
        /// The request timed out.
        Timeout { message: String } =>
            "feed request timed out: {message}",
        /// The feed answered with a non-success HTTP status.
        Status { code: u16, message: String } =>
            "feed returned status {code}: {message}",
    }
}

/// Which upstream list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// The disposable-domain blocklist feed.
    Disposable,
    /// The trusted-domain allowlist feed.
    Allowlist,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disposable => f.write_str("disposable"),
            Self::Allowlist => f.write_str("allowlist"),
        }
    }
}

/// Port for fetching one upstream list as newline-delimited text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainFeed: Send + Sync {
    /// Fetch the raw body of the requested feed.
    async fn fetch(&self, kind: FeedKind) -> Result<String, DomainFeedError>;
}

/// Fixture feed returning empty bodies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDomainFeed;

#[async_trait]
impl DomainFeed for FixtureDomainFeed {
    async fn fetch(&self, _kind: FeedKind) -> Result<String, DomainFeedError> {
        Ok(String::new())
    }
}
