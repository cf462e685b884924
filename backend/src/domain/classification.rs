//! Core classification vocabulary.
//!
//! Closed enumerations for list membership, verdicts, and audit actions so
//! invalid states are unrepresentable at the data-model level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::email::DomainName;

/// Which authoritative list a domain belongs to.
///
/// A domain is never simultaneously in both lists; the store enforces
/// uniqueness on the domain key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Known temporary/throwaway email provider.
    Disposable,
    /// Explicitly trusted provider, overriding any disposable signal.
    Allowlisted,
}

impl Classification {
    /// Stable tag persisted in the store and accepted on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disposable => "disposable",
            Self::Allowlisted => "allowlist",
        }
    }

    /// The opposite list.
    pub fn other(self) -> Self {
        match self {
            Self::Disposable => Self::Allowlisted,
            Self::Allowlisted => Self::Disposable,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disposable" | "blocklist" => Ok(Self::Disposable),
            "allowlist" => Ok(Self::Allowlisted),
            other => Err(UnknownClassification {
                value: other.to_owned(),
            }),
        }
    }
}

/// Error returned when a classification tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown classification: {value}")]
pub struct UnknownClassification {
    /// The rejected input.
    pub value: String,
}

/// A single authoritative list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Unique, lowercased domain key.
    pub domain: DomainName,
    /// The list the domain currently belongs to.
    pub classification: Classification,
}

/// Binary outcome of a classification decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The address may be used.
    Allowed,
    /// The address comes from a disposable provider.
    Blocked,
}

impl Verdict {
    /// Whether the verdict blocks the address.
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// Audit disposition recorded for each freshly resolved classification.
///
/// Cache hits never emit a new action; the original resolution already
/// logged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Domain was found on the allowlist in the store.
    VerifiedAllowlistedDb,
    /// Domain was found on the disposable list in the store.
    BlockedDisposableDb,
    /// Domain matched the compiled disposable pattern.
    BlockedSimilarity,
    /// Domain was absent from every tier.
    VerifiedUnknown,
}

impl AuditAction {
    /// Stable tag persisted by the audit sink.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VerifiedAllowlistedDb => "verified_allowlisted_db",
            Self::BlockedDisposableDb => "blocked_disposable_db",
            Self::BlockedSimilarity => "blocked_similarity",
            Self::VerifiedUnknown => "verified_unknown",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full result of classifying one address.
///
/// This is also the payload stored in the verdict cache: a derived,
/// disposable projection of a decision, never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// The extracted, normalized domain.
    pub domain: DomainName,
    /// Allowed or blocked.
    pub verdict: Verdict,
    /// Short machine-friendly reason.
    pub reason: String,
    /// Human-readable message for end users.
    pub message: String,
}

impl CheckOutcome {
    /// Outcome for a domain found on the allowlist.
    pub fn trusted(domain: DomainName) -> Self {
        Self {
            domain,
            verdict: Verdict::Allowed,
            reason: "trusted".to_owned(),
            message: "Great news! This email address is from a trusted provider".to_owned(),
        }
    }

    /// Outcome for a domain found on the disposable list.
    pub fn disposable(domain: DomainName) -> Self {
        Self {
            domain,
            verdict: Verdict::Blocked,
            reason: "not allowed".to_owned(),
            message: "This looks like a temporary email address. Please use your regular email instead"
                .to_owned(),
        }
    }

    /// Outcome for a domain matching the compiled disposable pattern.
    pub fn similar(domain: DomainName) -> Self {
        Self {
            domain,
            verdict: Verdict::Blocked,
            reason: "similar to known disposable domains".to_owned(),
            message: "Please use a different email address from a trusted provider".to_owned(),
        }
    }

    /// Outcome for a domain absent from every tier.
    pub fn unknown(domain: DomainName) -> Self {
        Self {
            domain,
            verdict: Verdict::Allowed,
            reason: "domain not found in any list".to_owned(),
            message: "This email address looks good to use".to_owned(),
        }
    }
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// Normalized email address that was checked.
    pub email: String,
    /// Extracted domain.
    pub domain: String,
    /// Source IP as reported by the transport, when available.
    pub ip: Option<String>,
    /// Disposition tag, e.g. `blocked_disposable_db`.
    pub action: String,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A stable page of list entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPage {
    /// Records in this page, ordered by domain.
    pub records: Vec<DomainRecord>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total records with this classification.
    pub total: u64,
}
