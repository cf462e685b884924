//! Audit log read HTTP handlers.
//!
//! ```text
//! GET /api/v1/audit-logs
//! GET /api/v1/audit-logs/{email}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::AuditLogError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;

/// Query parameters for paging through recent audit entries.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogsQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Entries per page, capped at 500.
    pub page_size: Option<u32>,
}

fn map_audit_error(error: AuditLogError) -> Error {
    warn!(%error, "audit log read failed");
    match error {
        AuditLogError::Connection { .. } => Error::service_unavailable("audit log unavailable"),
        AuditLogError::Query { .. } => Error::internal("audit log query failed"),
    }
}

/// Most recent audit entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/audit-logs",
    params(AuditLogsQuery),
    responses(
        (status = 200, description = "One page of audit entries"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Audit log unavailable", body = Error)
    ),
    tags = ["audit"],
    operation_id = "recentAuditLogs"
)]
#[get("/audit-logs")]
pub async fn recent_audit_logs(
    state: web::Data<HttpState>,
    query: web::Query<AuditLogsQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 || page_size == 0 {
        return Err(Error::invalid_request("page and pageSize must be positive"));
    }
    if page_size > MAX_PAGE_SIZE {
        return Err(Error::invalid_request(format!(
            "pageSize must not exceed {MAX_PAGE_SIZE}"
        )));
    }

    let entries = state
        .audit
        .recent(page, page_size)
        .await
        .map_err(map_audit_error)?;
    Ok(HttpResponse::Ok().json(entries))
}

/// Every audit entry recorded for one email address.
#[utoipa::path(
    get,
    path = "/api/v1/audit-logs/{email}",
    params(("email" = String, Path, description = "Email address to look up")),
    responses(
        (status = 200, description = "Audit entries for the address"),
        (status = 503, description = "Audit log unavailable", body = Error)
    ),
    tags = ["audit"],
    operation_id = "auditLogsForEmail"
)]
#[get("/audit-logs/{email}")]
pub async fn audit_logs_for_email(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let email = path.into_inner().trim().to_lowercase();
    let entries = state
        .audit
        .find_by_email(&email)
        .await
        .map_err(map_audit_error)?;
    Ok(HttpResponse::Ok().json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    async fn service() -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::default()))
                .service(
                    web::scope("/api/v1")
                        .service(recent_audit_logs)
                        .service(audit_logs_for_email),
                ),
        )
        .await
    }

    #[actix_web::test]
    async fn recent_returns_an_array() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/audit-logs")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body.as_array().is_some_and(Vec::is_empty));
    }

    #[actix_web::test]
    async fn zero_page_is_rejected() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/audit-logs?page=0")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn email_lookup_normalizes_the_address() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/audit-logs/User@Example.com")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
    }
}
