//! Driving port for administrative list mutations and listings.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Classification, DomainName, DomainPage, Error};

/// Result of an administrative add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddDomainOutcome {
    /// The canonical domain that was listed.
    pub domain: DomainName,
    /// The list the domain now belongs to.
    pub classification: Classification,
    /// Whether the domain was moved from the opposite list rather than
    /// freshly inserted.
    pub moved: bool,
}

/// Driving port exposed to inbound adapters for list administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainAdminCommand: Send + Sync {
    /// Add a domain to a list, moving it from the opposite list when
    /// already present there.
    async fn add(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<AddDomainOutcome, Error>;

    /// Remove a domain from a list.
    async fn remove(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), Error>;

    /// One stable page of a list.
    async fn page(
        &self,
        classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<DomainPage, Error>;
}

/// Fixture implementation accepting every mutation against an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDomainAdminCommand;

#[async_trait]
impl DomainAdminCommand for FixtureDomainAdminCommand {
    async fn add(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<AddDomainOutcome, Error> {
        Ok(AddDomainOutcome {
            domain: domain.clone(),
            classification,
            moved: false,
        })
    }

    async fn remove(
        &self,
        domain: &DomainName,
        _classification: Classification,
    ) -> Result<(), Error> {
        Err(Error::not_found(format!("domain not listed: {domain}")))
    }

    async fn page(
        &self,
        _classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<DomainPage, Error> {
        Ok(DomainPage {
            records: Vec::new(),
            page,
            page_size,
            total: 0,
        })
    }
}
