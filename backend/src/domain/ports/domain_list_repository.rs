//! Port for the authoritative domain list store.
//!
//! The repository is the single source of truth for classification
//! membership. The verdict cache is only ever a derived projection of the
//! records held here.

use async_trait::async_trait;

use crate::domain::{Classification, DomainName, DomainRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by domain list repository adapters.
    pub enum DomainListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "domain list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "domain list repository query failed: {message}",
        /// The domain already exists; the unique key forbids a second row.
        Conflict { domain: String } =>
            "domain already listed: {domain}",
        /// The domain was absent where presence was required.
        NotFound { domain: String } =>
            "domain not listed: {domain}",
    }
}

/// Port for authoritative list storage.
///
/// Implementations must be safe for many concurrent callers and must make
/// each mutation individually atomic. `replace_all` in particular must be
/// invisible to concurrent readers: no caller ever observes an empty or
/// half-populated store mid-swap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainListRepository: Send + Sync {
    /// Single authoritative point lookup by the unique domain key.
    async fn find(
        &self,
        domain: &DomainName,
    ) -> Result<Option<DomainRecord>, DomainListRepositoryError>;

    /// Insert a new record.
    ///
    /// Fails with [`DomainListRepositoryError::Conflict`] when the domain is
    /// already present in either list.
    async fn insert(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError>;

    /// Move a domain between lists in place, never duplicating the key.
    ///
    /// Fails with [`DomainListRepositoryError::NotFound`] when absent.
    async fn reclassify(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError>;

    /// Remove a record with a matching classification.
    ///
    /// Fails with [`DomainListRepositoryError::NotFound`] when the domain is
    /// absent or listed under the other classification.
    async fn remove(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError>;

    /// One page of records for a classification, ordered by domain.
    async fn list(
        &self,
        classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<DomainRecord>, DomainListRepositoryError>;

    /// Total records held for a classification.
    async fn count(&self, classification: Classification)
        -> Result<u64, DomainListRepositoryError>;

    /// Atomically discard all existing records and install `records`.
    async fn replace_all(
        &self,
        records: Vec<DomainRecord>,
    ) -> Result<(), DomainListRepositoryError>;

    /// The full current disposable set, for matcher construction.
    async fn disposable_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError>;

    /// Every domain currently held, regardless of classification.
    async fn all_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError>;
}

/// Fixture implementation backed by an empty store.
///
/// Lookups miss, listings are empty, and mutations succeed without effect.
/// Use it in handler tests where list behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDomainListRepository;

#[async_trait]
impl DomainListRepository for FixtureDomainListRepository {
    async fn find(
        &self,
        _domain: &DomainName,
    ) -> Result<Option<DomainRecord>, DomainListRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        _domain: &DomainName,
        _classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        Ok(())
    }

    async fn reclassify(
        &self,
        domain: &DomainName,
        _classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        Err(DomainListRepositoryError::not_found(domain.as_str()))
    }

    async fn remove(
        &self,
        domain: &DomainName,
        _classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        Err(DomainListRepositoryError::not_found(domain.as_str()))
    }

    async fn list(
        &self,
        _classification: Classification,
        _page: u32,
        _page_size: u32,
    ) -> Result<Vec<DomainRecord>, DomainListRepositoryError> {
        Ok(Vec::new())
    }

    async fn count(
        &self,
        _classification: Classification,
    ) -> Result<u64, DomainListRepositoryError> {
        Ok(0)
    }

    async fn replace_all(
        &self,
        _records: Vec<DomainRecord>,
    ) -> Result<(), DomainListRepositoryError> {
        Ok(())
    }

    async fn disposable_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        Ok(Vec::new())
    }

    async fn all_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        Ok(Vec::new())
    }
}
