//! Reqwest-backed upstream feed adapter.
//!
//! This adapter owns transport details only: endpoint selection, request
//! timeout, and HTTP error mapping. The returned body is raw
//! newline-delimited text; parsing stays in the sync service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{DomainFeed, DomainFeedError, FeedKind};

const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "email-screening-backend/0.1";

/// Endpoints for the two upstream lists.
#[derive(Debug, Clone)]
pub struct FeedEndpoints {
    /// URL of the disposable-domain blocklist feed.
    pub disposable: Url,
    /// URL of the trusted-domain allowlist feed.
    pub allowlist: Url,
}

/// Feed adapter that performs HTTP GET requests against the configured
/// endpoints.
pub struct HttpDomainFeed {
    client: Client,
    endpoints: FeedEndpoints,
}

impl HttpDomainFeed {
    /// Build an adapter using a reqwest client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: FeedEndpoints) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoints, DEFAULT_FEED_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoints: FeedEndpoints,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, endpoints })
    }

    fn endpoint(&self, kind: FeedKind) -> &Url {
        match kind {
            FeedKind::Disposable => &self.endpoints.disposable,
            FeedKind::Allowlist => &self.endpoints.allowlist,
        }
    }
}

#[async_trait]
impl DomainFeed for HttpDomainFeed {
    async fn fetch(&self, kind: FeedKind) -> Result<String, DomainFeedError> {
        let response = self
            .client
            .get(self.endpoint(kind).clone())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(kind, status));
        }
        response.text().await.map_err(map_transport_error)
    }
}

fn map_transport_error(error: reqwest::Error) -> DomainFeedError {
    if error.is_timeout() {
        DomainFeedError::timeout(error.to_string())
    } else {
        DomainFeedError::transport(error.to_string())
    }
}

fn map_status_error(kind: FeedKind, status: StatusCode) -> DomainFeedError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DomainFeedError::timeout(format!("{kind} feed returned {}", status.as_u16()))
        }
        _ => DomainFeedError::status(status.as_u16(), format!("{kind} feed request failed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn endpoints() -> FeedEndpoints {
        FeedEndpoints {
            disposable: Url::parse("https://feeds.invalid/disposable.txt").expect("valid URL"),
            allowlist: Url::parse("https://feeds.invalid/allowlist.txt").expect("valid URL"),
        }
    }

    #[rstest]
    fn endpoint_selection_follows_feed_kind() {
        let feed = HttpDomainFeed::new(endpoints()).expect("client builds");
        assert_eq!(
            feed.endpoint(FeedKind::Disposable).as_str(),
            "https://feeds.invalid/disposable.txt"
        );
        assert_eq!(
            feed.endpoint(FeedKind::Allowlist).as_str(),
            "https://feeds.invalid/allowlist.txt"
        );
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT)]
    fn timeout_statuses_map_to_timeout(#[case] status: StatusCode) {
        assert!(matches!(
            map_status_error(FeedKind::Disposable, status),
            DomainFeedError::Timeout { .. }
        ));
    }

    #[rstest]
    fn other_statuses_carry_the_code() {
        let error = map_status_error(FeedKind::Allowlist, StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(error, DomainFeedError::Status { code: 503, .. }));
    }
}
