//! Compiled matcher over the disposable domain set.
//!
//! The matcher compiles the construction-time set into a single anchored,
//! case-insensitive alternation. Each entry is escaped so a literal `.`
//! never behaves as a wildcard, which keeps the effective semantics at
//! exact-match-on-construction-set. It is the most expensive classification
//! tier and is only built when both the cache and the store lookup miss.

use regex::{Regex, RegexBuilder};

use super::email::DomainName;

/// Pattern matcher over a fixed set of disposable domains.
///
/// Pure function of its input; construction is O(total pattern length) and
/// `matches` does not touch I/O.
#[derive(Debug, Clone)]
pub struct DomainMatcher {
    pattern: Option<Regex>,
}

impl DomainMatcher {
    /// Compile a matcher from the current disposable set.
    ///
    /// An empty set produces a matcher that never matches. Compilation
    /// cannot fail because every entry is escaped before being joined into
    /// the alternation; a failure is reported as a never-matching matcher
    /// rather than a panic.
    pub fn new<I>(domains: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let alternation = domains
            .into_iter()
            .map(|domain| format!("^{}$", regex::escape(domain.as_ref().trim())))
            .collect::<Vec<_>>()
            .join("|");
        if alternation.is_empty() {
            return Self { pattern: None };
        }

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build();
        if let Err(error) = &pattern {
            tracing::warn!(%error, "disposable domain pattern failed to compile");
        }
        Self {
            pattern: pattern.ok(),
        }
    }

    /// Whether `candidate` equals one of the construction-time domains,
    /// case-insensitively.
    pub fn matches(&self, candidate: &DomainName) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(candidate.as_str()))
    }
}
