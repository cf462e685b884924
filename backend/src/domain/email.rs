//! Email normalization and domain extraction.
//!
//! The classification pipeline only ever reasons about the domain part of an
//! address, so the types here normalize aggressively at the boundary: inputs
//! are trimmed and lowercased once, and every later tier sees the same
//! canonical form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical, lowercased domain name used as the unique key across the
/// authoritative store and the verdict cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Construct a domain name, trimming and lowercasing the input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, DomainParseError> {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainParseError::Empty);
        }
        if normalized.chars().any(char::is_whitespace) || normalized.contains('@') {
            return Err(DomainParseError::InvalidCharacters);
        }
        Ok(Self(normalized))
    }

    /// Borrow the canonical form as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validation errors raised when constructing [`DomainName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParseError {
    /// Input is empty after trimming.
    #[error("domain must not be empty")]
    Empty,
    /// Input contains whitespace or an `@` sign.
    #[error("domain contains invalid characters")]
    InvalidCharacters,
}

impl From<DomainParseError> for String {
    fn from(value: DomainParseError) -> Self {
        value.to_string()
    }
}

/// A normalized email address together with its extracted domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmail {
    address: String,
    domain: DomainName,
}

impl NormalizedEmail {
    /// Normalize an email address and extract its domain.
    ///
    /// The domain is everything after the first `@`. Inputs without an `@`,
    /// or with nothing after it, are rejected: the engine treats them as
    /// having no extractable domain.
    pub fn parse(email: impl AsRef<str>) -> Result<Self, EmailParseError> {
        let address = email.as_ref().trim().to_lowercase();
        if address.is_empty() {
            return Err(EmailParseError::Empty);
        }
        let mut parts = address.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().ok_or(EmailParseError::MissingDomain)?;
        if local.is_empty() {
            return Err(EmailParseError::MissingLocalPart);
        }
        let domain = DomainName::new(domain).map_err(|_| EmailParseError::MissingDomain)?;
        Ok(Self { address, domain })
    }

    /// The full normalized address.
    pub fn as_str(&self) -> &str {
        self.address.as_str()
    }

    /// The extracted domain.
    pub fn domain(&self) -> &DomainName {
        &self.domain
    }
}

impl std::fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised when parsing an email address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailParseError {
    /// Input is empty after trimming.
    #[error("email is required")]
    Empty,
    /// No `@` separator, or nothing usable after it.
    #[error("email must contain a domain")]
    MissingDomain,
    /// Nothing before the `@` separator.
    #[error("email must contain a local part")]
    MissingLocalPart,
}
