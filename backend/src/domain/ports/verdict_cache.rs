//! Port for the per-domain verdict cache.
//!
//! Cache writes are best-effort: a failed write must never fail the
//! classification request, because the caller already holds the
//! authoritative verdict. Cache reads that fail are treated as misses by
//! the services; the error is surfaced here so adapters can log it.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CheckOutcome, DomainName};

use super::define_port_error;

/// Key prefix shared by every cached verdict.
const VERDICT_KEY_PREFIX: &str = "check-email";

define_port_error! {
    /// Errors raised by verdict cache adapters.
    pub enum VerdictCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } =>
            "verdict cache backend failure: {message}",
        /// Serialization of a cached verdict failed.
        Serialization { message: String } =>
            "verdict cache serialization failed: {message}",
    }
}

/// Cache key for a domain's verdict, in the `check-email:{domain}` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerdictCacheKey(String);

impl VerdictCacheKey {
    /// Build the key for a domain.
    pub fn for_domain(domain: &DomainName) -> Self {
        Self(format!("{VERDICT_KEY_PREFIX}:{domain}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for VerdictCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for VerdictCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Port for verdict caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerdictCache: Send + Sync {
    /// Read a cached verdict. `None` is a miss.
    async fn get(&self, key: &VerdictCacheKey)
        -> Result<Option<CheckOutcome>, VerdictCacheError>;

    /// Store a verdict with an expiry.
    async fn put(
        &self,
        key: &VerdictCacheKey,
        outcome: &CheckOutcome,
        ttl: Duration,
    ) -> Result<(), VerdictCacheError>;

    /// Drop a cached verdict, if present.
    async fn invalidate(&self, key: &VerdictCacheKey) -> Result<(), VerdictCacheError>;

    /// Store many verdicts in one batched operation, for sync-time
    /// repopulation.
    async fn put_many(
        &self,
        entries: Vec<(VerdictCacheKey, CheckOutcome)>,
        ttl: Duration,
    ) -> Result<(), VerdictCacheError>;
}

/// Fixture cache that always misses and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVerdictCache;

#[async_trait]
impl VerdictCache for FixtureVerdictCache {
    async fn get(
        &self,
        _key: &VerdictCacheKey,
    ) -> Result<Option<CheckOutcome>, VerdictCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &VerdictCacheKey,
        _outcome: &CheckOutcome,
        _ttl: Duration,
    ) -> Result<(), VerdictCacheError> {
        Ok(())
    }

    async fn invalidate(&self, _key: &VerdictCacheKey) -> Result<(), VerdictCacheError> {
        Ok(())
    }

    async fn put_many(
        &self,
        _entries: Vec<(VerdictCacheKey, CheckOutcome)>,
        _ttl: Duration,
    ) -> Result<(), VerdictCacheError> {
        Ok(())
    }
}
