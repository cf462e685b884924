//! Administrative list mutations with cache coherence.
//!
//! Every mutation invalidates the affected domain's cached verdict after
//! the store commit. Invalidation is best-effort: a reader racing the
//! mutation may observe the old verdict for at most one TTL window, which
//! the design accepts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::classification_service::map_store_error;
use crate::domain::ports::{
    AddDomainOutcome, DomainAdminCommand, DomainListRepository, DomainListRepositoryError,
    VerdictCache, VerdictCacheKey,
};
use crate::domain::{Classification, DomainName, DomainPage, Error};

/// Admin service over the authoritative list store.
#[derive(Clone)]
pub struct ListAdminService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
}

impl<R, C> ListAdminService<R, C> {
    /// Create a service with the given store and cache handles.
    pub fn new(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self { repository, cache }
    }
}

impl<R, C> ListAdminService<R, C>
where
    R: DomainListRepository,
    C: VerdictCache,
{
    async fn drop_cached_verdict(&self, domain: &DomainName) {
        let key = VerdictCacheKey::for_domain(domain);
        if let Err(error) = self.cache.invalidate(&key).await {
            warn!(%key, %error, "verdict invalidation failed; entry will lapse via TTL");
        }
    }

    fn conflict(domain: &DomainName, classification: Classification) -> Error {
        Error::conflict("domain already listed").with_details(json!({
            "domain": domain.as_str(),
            "classification": classification.as_str(),
        }))
    }
}

#[async_trait]
impl<R, C> DomainAdminCommand for ListAdminService<R, C>
where
    R: DomainListRepository,
    C: VerdictCache,
{
    async fn add(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<AddDomainOutcome, Error> {
        let existing = self
            .repository
            .find(domain)
            .await
            .map_err(map_store_error)?;

        let moved = match existing {
            Some(record) if record.classification == classification => {
                return Err(Self::conflict(domain, classification));
            }
            // Present in the opposite list: move it in place, never
            // duplicating the unique key.
            Some(_) => {
                self.repository
                    .reclassify(domain, classification)
                    .await
                    .map_err(map_store_error)?;
                true
            }
            None => {
                match self.repository.insert(domain, classification).await {
                    Ok(()) => {}
                    // A concurrent add can win the race between our lookup
                    // and the insert; surface it as the same conflict.
                    Err(DomainListRepositoryError::Conflict { .. }) => {
                        return Err(Self::conflict(domain, classification));
                    }
                    Err(other) => return Err(map_store_error(other)),
                }
                false
            }
        };

        self.drop_cached_verdict(domain).await;
        Ok(AddDomainOutcome {
            domain: domain.clone(),
            classification,
            moved,
        })
    }

    async fn remove(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), Error> {
        match self.repository.remove(domain, classification).await {
            Ok(()) => {
                self.drop_cached_verdict(domain).await;
                Ok(())
            }
            Err(DomainListRepositoryError::NotFound { .. }) => Err(Error::not_found(
                format!("domain not listed as {classification}: {domain}"),
            )),
            Err(other) => Err(map_store_error(other)),
        }
    }

    async fn page(
        &self,
        classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<DomainPage, Error> {
        if page == 0 || page_size == 0 {
            return Err(Error::invalid_request("page and page size start at 1"));
        }
        let records = self
            .repository
            .list(classification, page, page_size)
            .await
            .map_err(map_store_error)?;
        let total = self
            .repository
            .count(classification)
            .await
            .map_err(map_store_error)?;
        Ok(DomainPage {
            records,
            page,
            page_size,
            total,
        })
    }
}
