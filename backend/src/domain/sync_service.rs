//! Bulk resynchronization from the upstream feeds.
//!
//! Both feeds are fetched concurrently, normalized, and installed in a
//! single atomic replacement; the verdict cache is then repopulated for
//! every installed domain. Any fetch or store failure aborts the whole
//! sync and leaves the previous state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::try_join;
use tracing::{debug, info, warn};

use crate::domain::classification_service::{jittered, DEFAULT_VERDICT_TTL};
use crate::domain::ports::{
    DomainFeed, DomainListRepository, FeedKind, SyncCommand, SyncReport, VerdictCache,
    VerdictCacheKey,
};
use crate::domain::{CheckOutcome, Classification, DomainName, DomainRecord, Error};

/// Sync coordinator replacing the authoritative lists wholesale.
#[derive(Clone)]
pub struct SyncService<R, C, F> {
    repository: Arc<R>,
    cache: Arc<C>,
    feed: Arc<F>,
    verdict_ttl: Duration,
    /// When set, verdicts for domains dropped by the feed are invalidated
    /// immediately instead of lapsing via TTL.
    immediate_invalidation: bool,
}

impl<R, C, F> SyncService<R, C, F> {
    /// Create a coordinator with the default verdict lifetime.
    pub fn new(repository: Arc<R>, cache: Arc<C>, feed: Arc<F>) -> Self {
        Self {
            repository,
            cache,
            feed,
            verdict_ttl: DEFAULT_VERDICT_TTL,
            immediate_invalidation: false,
        }
    }

    /// Override the verdict lifetime used for repopulated entries.
    pub fn with_verdict_ttl(mut self, ttl: Duration) -> Self {
        self.verdict_ttl = ttl;
        self
    }

    /// Invalidate stale verdicts for dropped domains right after the swap.
    pub fn with_immediate_invalidation(mut self, enabled: bool) -> Self {
        self.immediate_invalidation = enabled;
        self
    }
}

/// Parse one newline-delimited feed body into normalized domains.
///
/// Blank lines and `#` comments are dropped; entries that fail domain
/// validation are skipped rather than aborting the feed.
fn parse_feed(kind: FeedKind, body: &str) -> Vec<DomainName> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match DomainName::new(line) {
            Ok(domain) => Some(domain),
            Err(error) => {
                debug!(%kind, line, %error, "skipping malformed feed entry");
                None
            }
        })
        .collect()
}

fn outcome_for(record: &DomainRecord) -> CheckOutcome {
    match record.classification {
        Classification::Disposable => CheckOutcome::disposable(record.domain.clone()),
        Classification::Allowlisted => CheckOutcome::trusted(record.domain.clone()),
    }
}

impl<R, C, F> SyncService<R, C, F>
where
    R: DomainListRepository,
    C: VerdictCache,
    F: DomainFeed,
{
    async fn stale_domains(
        &self,
        replacement: &BTreeMap<DomainName, Classification>,
    ) -> Vec<DomainName> {
        if !self.immediate_invalidation {
            return Vec::new();
        }
        match self.repository.all_domains().await {
            Ok(previous) => previous
                .into_iter()
                .filter(|domain| !replacement.contains_key(domain))
                .collect(),
            Err(error) => {
                // Missing the stale set only delays invalidation until the
                // TTL lapses; the swap itself stays correct.
                warn!(%error, "could not enumerate previous domains for invalidation");
                Vec::new()
            }
        }
    }

    async fn repopulate_cache(&self, records: &[DomainRecord]) {
        let entries: Vec<_> = records
            .iter()
            .map(|record| {
                (
                    VerdictCacheKey::for_domain(&record.domain),
                    outcome_for(record),
                )
            })
            .collect();
        if let Err(error) = self.cache.put_many(entries, jittered(self.verdict_ttl)).await {
            warn!(%error, "verdict cache repopulation failed; entries will fill on demand");
        }
    }

    async fn invalidate_stale(&self, stale: Vec<DomainName>) -> u64 {
        let mut invalidated = 0;
        for domain in stale {
            let key = VerdictCacheKey::for_domain(&domain);
            match self.cache.invalidate(&key).await {
                Ok(()) => invalidated += 1,
                Err(error) => {
                    warn!(%key, %error, "stale verdict invalidation failed");
                }
            }
        }
        invalidated
    }
}

#[async_trait]
impl<R, C, F> SyncCommand for SyncService<R, C, F>
where
    R: DomainListRepository,
    C: VerdictCache,
    F: DomainFeed,
{
    async fn sync(&self) -> Result<SyncReport, Error> {
        let (disposable_body, allowlist_body) = try_join!(
            self.feed.fetch(FeedKind::Disposable),
            self.feed.fetch(FeedKind::Allowlist),
        )
        .map_err(|error| Error::upstream_unavailable(format!("feed fetch failed: {error}")))?;

        // Allowlist wins on overlap: an explicitly trusted domain overrides
        // any disposable signal from the blocklist feed.
        let mut replacement = BTreeMap::new();
        for domain in parse_feed(FeedKind::Disposable, &disposable_body) {
            replacement.insert(domain, Classification::Disposable);
        }
        for domain in parse_feed(FeedKind::Allowlist, &allowlist_body) {
            replacement.insert(domain, Classification::Allowlisted);
        }

        let stale = self.stale_domains(&replacement).await;

        let records: Vec<DomainRecord> = replacement
            .into_iter()
            .map(|(domain, classification)| DomainRecord {
                domain,
                classification,
            })
            .collect();
        let disposable = records
            .iter()
            .filter(|record| record.classification == Classification::Disposable)
            .count() as u64;
        let allowlisted = records.len() as u64 - disposable;

        self.repository
            .replace_all(records.clone())
            .await
            .map_err(|error| Error::internal(format!("sync failed: {error}")))?;

        self.repopulate_cache(&records).await;
        let invalidated = self.invalidate_stale(stale).await;

        info!(disposable, allowlisted, invalidated, "domain lists synced");
        Ok(SyncReport {
            disposable,
            allowlisted,
            invalidated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        DomainFeedError, DomainListRepositoryError, MockDomainFeed, MockDomainListRepository,
        MockVerdictCache, VerdictCacheError,
    };
    use crate::domain::ErrorCode;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn domain(value: &str) -> DomainName {
        DomainName::new(value).expect("valid domain")
    }

    fn feed_bodies(disposable: &str, allowlist: &str) -> MockDomainFeed {
        let mut feed = MockDomainFeed::new();
        let disposable = disposable.to_owned();
        feed.expect_fetch()
            .with(eq(FeedKind::Disposable))
            .once()
            .return_once(move |_| Ok(disposable));
        let allowlist = allowlist.to_owned();
        feed.expect_fetch()
            .with(eq(FeedKind::Allowlist))
            .once()
            .return_once(move |_| Ok(allowlist));
        feed
    }

    fn service(
        repository: MockDomainListRepository,
        cache: MockVerdictCache,
        feed: MockDomainFeed,
    ) -> SyncService<MockDomainListRepository, MockVerdictCache, MockDomainFeed> {
        SyncService::new(Arc::new(repository), Arc::new(cache), Arc::new(feed))
    }

    #[rstest]
    #[tokio::test]
    async fn installs_both_feeds_and_repopulates_the_cache() {
        let feed = feed_bodies("A.com\nb.com\n\n# comment\n", "c.com\n");
        let mut repository = MockDomainListRepository::new();
        repository
            .expect_replace_all()
            .withf(|records| {
                records.len() == 3
                    && records.iter().any(|r| {
                        r.domain.as_str() == "a.com"
                            && r.classification == Classification::Disposable
                    })
                    && records.iter().any(|r| {
                        r.domain.as_str() == "c.com"
                            && r.classification == Classification::Allowlisted
                    })
            })
            .once()
            .returning(|_| Ok(()));
        let mut cache = MockVerdictCache::new();
        cache
            .expect_put_many()
            .withf(|entries, _| {
                entries.len() == 3
                    && entries
                        .iter()
                        .any(|(key, _)| key.as_str() == "check-email:b.com")
            })
            .once()
            .returning(|_, _| Ok(()));

        let report = service(repository, cache, feed).sync().await.expect("syncs");
        assert_eq!(report.disposable, 2);
        assert_eq!(report.allowlisted, 1);
        assert_eq!(report.invalidated, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn allowlist_wins_when_feeds_overlap() {
        let feed = feed_bodies("x.com\n", "x.com\n");
        let mut repository = MockDomainListRepository::new();
        repository
            .expect_replace_all()
            .withf(|records| {
                records.len() == 1 && records[0].classification == Classification::Allowlisted
            })
            .once()
            .returning(|_| Ok(()));
        let mut cache = MockVerdictCache::new();
        cache.expect_put_many().once().returning(|_, _| Ok(()));

        let report = service(repository, cache, feed).sync().await.expect("syncs");
        assert_eq!(report.disposable, 0);
        assert_eq!(report.allowlisted, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn feed_failure_aborts_before_touching_the_store() {
        let mut feed = MockDomainFeed::new();
        feed.expect_fetch()
            .with(eq(FeedKind::Disposable))
            .returning(|_| Err(DomainFeedError::status(502_u16, "bad gateway")));
        feed.expect_fetch()
            .with(eq(FeedKind::Allowlist))
            .returning(|_| Ok(String::new()));
        let mut repository = MockDomainListRepository::new();
        repository.expect_replace_all().never();
        let mut cache = MockVerdictCache::new();
        cache.expect_put_many().never();

        let error = service(repository, cache, feed)
            .sync()
            .await
            .expect_err("fetch failure aborts");
        assert_eq!(error.code(), ErrorCode::UpstreamUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failure_aborts_without_cache_writes() {
        let feed = feed_bodies("a.com\n", "");
        let mut repository = MockDomainListRepository::new();
        repository
            .expect_replace_all()
            .once()
            .returning(|_| Err(DomainListRepositoryError::query("deadlock")));
        let mut cache = MockVerdictCache::new();
        cache.expect_put_many().never();

        let error = service(repository, cache, feed)
            .sync()
            .await
            .expect_err("store failure aborts");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn cache_repopulation_failure_does_not_fail_the_sync() {
        let feed = feed_bodies("a.com\n", "");
        let mut repository = MockDomainListRepository::new();
        repository.expect_replace_all().once().returning(|_| Ok(()));
        let mut cache = MockVerdictCache::new();
        cache
            .expect_put_many()
            .once()
            .returning(|_, _| Err(VerdictCacheError::backend("redis down")));

        let report = service(repository, cache, feed)
            .sync()
            .await
            .expect("cache repopulation is best-effort");
        assert_eq!(report.disposable, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn immediate_invalidation_drops_verdicts_for_removed_domains() {
        let feed = feed_bodies("a.com\n", "");
        let mut repository = MockDomainListRepository::new();
        repository
            .expect_all_domains()
            .once()
            .returning(|| Ok(vec![domain("a.com"), domain("old.com")]));
        repository.expect_replace_all().once().returning(|_| Ok(()));
        let mut cache = MockVerdictCache::new();
        cache.expect_put_many().once().returning(|_, _| Ok(()));
        cache
            .expect_invalidate()
            .withf(|key| key.as_str() == "check-email:old.com")
            .once()
            .returning(|_| Ok(()));

        let report = service(repository, cache, feed)
            .with_immediate_invalidation(true)
            .sync()
            .await
            .expect("syncs");
        assert_eq!(report.invalidated, 1);
    }

    #[rstest]
    fn feed_parsing_normalizes_and_filters() {
        let domains = parse_feed(
            FeedKind::Disposable,
            "  Mailinator.COM \n\n# temporary providers\nbad domain\ntempmail.dev\n",
        );
        assert_eq!(domains, vec![domain("mailinator.com"), domain("tempmail.dev")]);
    }
}
