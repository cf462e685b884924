//! Driving port for email classification.

use async_trait::async_trait;

use crate::domain::{CheckOutcome, DomainName, Error};

/// Driving port exposed to inbound adapters for classifying an address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckEmailCommand: Send + Sync {
    /// Classify `email`, attributing the request to `source_ip` in audit
    /// records.
    async fn check(&self, email: &str, source_ip: Option<String>)
        -> Result<CheckOutcome, Error>;
}

/// Fixture implementation answering every check with an "unknown domain"
/// verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCheckEmailCommand;

#[async_trait]
impl CheckEmailCommand for FixtureCheckEmailCommand {
    async fn check(
        &self,
        email: &str,
        _source_ip: Option<String>,
    ) -> Result<CheckOutcome, Error> {
        let domain = email
            .split('@')
            .nth(1)
            .and_then(|raw| DomainName::new(raw).ok())
            .ok_or_else(|| Error::invalid_request("email must contain a domain"))?;
        Ok(CheckOutcome::unknown(domain))
    }
}
