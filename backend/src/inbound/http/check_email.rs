//! Email classification HTTP handler.
//!
//! ```text
//! POST /api/v1/check-email
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CheckOutcome, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::client_ip::source_ip;
use crate::inbound::http::state::HttpState;

/// Request payload for a classification check.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckEmailRequest {
    /// Email address to classify.
    pub email: Option<String>,
}

/// Response payload for a classification check.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailResponse {
    /// `allowed` or `blocked`.
    pub status: String,
    /// Whether the address comes from a disposable provider.
    pub disposable: bool,
    /// The extracted, normalized domain.
    pub domain: String,
    /// Short machine-friendly reason.
    pub reason: String,
    /// Human-readable message for end users.
    pub message: String,
}

impl From<CheckOutcome> for CheckEmailResponse {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            status: if outcome.verdict.is_blocked() {
                "blocked".to_owned()
            } else {
                "allowed".to_owned()
            },
            disposable: outcome.verdict.is_blocked(),
            domain: outcome.domain.to_string(),
            reason: outcome.reason,
            message: outcome.message,
        }
    }
}

/// Classify an email address.
#[utoipa::path(
    post,
    path = "/api/v1/check-email",
    request_body = CheckEmailRequest,
    responses(
        (status = 200, description = "Classification verdict", body = CheckEmailResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Authoritative store unavailable", body = Error)
    ),
    tags = ["classification"],
    operation_id = "checkEmail"
)]
#[post("/check-email")]
pub async fn check_email(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<CheckEmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = payload
        .into_inner()
        .email
        .ok_or_else(|| Error::invalid_request("email is required"))?;
    let outcome = state
        .check_email
        .check(&email, source_ip(&request))
        .await?;
    Ok(HttpResponse::Ok().json(CheckEmailResponse::from(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::json;

    async fn call(payload: serde_json::Value) -> (u16, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::default()))
                .service(web::scope("/api/v1").service(check_email)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/check-email")
            .set_json(payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status().as_u16();
        let body = test::read_body_json(res).await;
        (status, body)
    }

    #[actix_web::test]
    async fn unknown_domain_is_allowed() {
        let (status, body) = call(json!({ "email": "user@example.com" })).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "allowed");
        assert_eq!(body["disposable"], false);
        assert_eq!(body["domain"], "example.com");
    }

    #[actix_web::test]
    async fn missing_email_is_rejected() {
        let (status, body) = call(json!({})).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn address_without_domain_is_rejected() {
        let (status, body) = call(json!({ "email": "not-an-address" })).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "invalid_request");
    }
}
