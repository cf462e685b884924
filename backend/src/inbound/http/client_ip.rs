//! Source IP extraction for audit attribution.
//!
//! The service normally runs behind a reverse proxy, so the first entry of
//! `X-Forwarded-For` is preferred over the peer address. The value is
//! attribution metadata only and is never used for authorization.

use actix_web::HttpRequest;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort source IP of the request.
pub fn source_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded) = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
    {
        let first = forwarded.split(',').next().unwrap_or_default().trim();
        if !first.is_empty() {
            return Some(first.to_owned());
        }
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn prefers_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.2"))
            .to_http_request();
        assert_eq!(source_ip(&req).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn blank_forwarded_header_is_ignored() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "  "))
            .to_http_request();
        assert_eq!(source_ip(&req), None);
    }

    #[test]
    fn missing_header_and_peer_yields_none() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(source_ip(&req), None);
    }
}
