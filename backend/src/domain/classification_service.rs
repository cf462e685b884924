//! Email classification engine.
//!
//! Implements the ordered decision pipeline: verdict cache, exact store
//! lookup, compiled-pattern match over the disposable set, then the
//! default verdict. Each tier short-circuits; each call performs at most
//! one audit emission and one best-effort cache write.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use crate::domain::matcher::DomainMatcher;
use crate::domain::ports::{
    AuditLog, CheckEmailCommand, DomainListRepository, DomainListRepositoryError, VerdictCache,
    VerdictCacheKey,
};
use crate::domain::{AuditAction, CheckOutcome, Classification, Error, NormalizedEmail};

/// Default verdict lifetime: 24 hours.
pub const DEFAULT_VERDICT_TTL: Duration = Duration::from_secs(86_400);

/// Classification engine composing the cache, store, and matcher tiers.
///
/// Safe for concurrent use; every call is a composition of at most three
/// sequential remote reads plus best-effort side writes.
#[derive(Clone)]
pub struct ClassificationService<R, C, A> {
    repository: Arc<R>,
    cache: Arc<C>,
    audit: Arc<A>,
    verdict_ttl: Duration,
}

impl<R, C, A> ClassificationService<R, C, A> {
    /// Create an engine with the default 24-hour verdict lifetime.
    pub fn new(repository: Arc<R>, cache: Arc<C>, audit: Arc<A>) -> Self {
        Self::with_ttl(repository, cache, audit, DEFAULT_VERDICT_TTL)
    }

    /// Create an engine with an explicit verdict lifetime.
    pub fn with_ttl(
        repository: Arc<R>,
        cache: Arc<C>,
        audit: Arc<A>,
        verdict_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            audit,
            verdict_ttl,
        }
    }
}

/// Map store failures on the classification path.
///
/// A failing store is fatal to the request: answering "allowed" on
/// infrastructure failure would conflate an outage with a benign verdict.
pub(crate) fn map_store_error(error: DomainListRepositoryError) -> Error {
    match error {
        DomainListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("domain list store unavailable: {message}"))
        }
        other => Error::internal(format!("domain list store error: {other}")),
    }
}

/// Spread a TTL by up to five percent so bulk-populated verdicts do not
/// all expire in the same instant.
pub(crate) fn jittered(ttl: Duration) -> Duration {
    let spread = ttl.as_secs() / 20;
    if spread == 0 {
        return ttl;
    }
    ttl + Duration::from_secs(rand::thread_rng().gen_range(0..=spread))
}

impl<R, C, A> ClassificationService<R, C, A>
where
    R: DomainListRepository,
    C: VerdictCache,
    A: AuditLog,
{
    async fn cached_verdict(&self, key: &VerdictCacheKey) -> Option<CheckOutcome> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(error) => {
                // Degrade to store-backed resolution, never fail the request.
                warn!(%key, %error, "verdict cache read failed; treating as miss");
                None
            }
        }
    }

    async fn store_verdict(&self, key: &VerdictCacheKey, outcome: &CheckOutcome) {
        let ttl = jittered(self.verdict_ttl);
        if let Err(error) = self.cache.put(key, outcome, ttl).await {
            warn!(%key, %error, "verdict cache write failed; serving uncached verdict");
        }
    }

    async fn emit_audit(
        &self,
        email: &NormalizedEmail,
        ip: Option<String>,
        action: AuditAction,
    ) {
        if let Err(error) = self
            .audit
            .record(email, email.domain(), ip, action)
            .await
        {
            warn!(domain = %email.domain(), %action, %error, "audit append failed");
        }
    }

    async fn resolve(&self, email: &NormalizedEmail) -> Result<(CheckOutcome, AuditAction), Error> {
        let domain = email.domain();

        if let Some(record) = self.repository.find(domain).await.map_err(map_store_error)? {
            return Ok(match record.classification {
                Classification::Allowlisted => (
                    CheckOutcome::trusted(domain.clone()),
                    AuditAction::VerifiedAllowlistedDb,
                ),
                Classification::Disposable => (
                    CheckOutcome::disposable(domain.clone()),
                    AuditAction::BlockedDisposableDb,
                ),
            });
        }

        // Most expensive tier: load the full disposable set and compile the
        // alternation once for this request.
        let disposable = self
            .repository
            .disposable_domains()
            .await
            .map_err(map_store_error)?;
        let matcher = DomainMatcher::new(disposable.iter().map(|entry| entry.as_str()));
        if matcher.matches(domain) {
            Ok((
                CheckOutcome::similar(domain.clone()),
                AuditAction::BlockedSimilarity,
            ))
        } else {
            Ok((
                CheckOutcome::unknown(domain.clone()),
                AuditAction::VerifiedUnknown,
            ))
        }
    }
}

#[async_trait]
impl<R, C, A> CheckEmailCommand for ClassificationService<R, C, A>
where
    R: DomainListRepository,
    C: VerdictCache,
    A: AuditLog,
{
    async fn check(
        &self,
        email: &str,
        source_ip: Option<String>,
    ) -> Result<CheckOutcome, Error> {
        let email = NormalizedEmail::parse(email)
            .map_err(|error| Error::invalid_request(error.to_string()))?;
        let key = VerdictCacheKey::for_domain(email.domain());

        // Cache hits are returned verbatim; the original resolution already
        // recorded its audit disposition.
        if let Some(outcome) = self.cached_verdict(&key).await {
            return Ok(outcome);
        }

        let (outcome, action) = self.resolve(&email).await?;
        self.emit_audit(&email, source_ip, action).await;
        self.store_verdict(&key, &outcome).await;
        Ok(outcome)
    }
}
