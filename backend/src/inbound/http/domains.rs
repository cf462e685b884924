//! List administration HTTP handlers.
//!
//! ```text
//! POST   /api/v1/domains
//! DELETE /api/v1/domains
//! GET    /api/v1/domains
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Classification, DomainName, DomainPage, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;

/// Request payload naming a domain and the list it belongs to.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DomainListingRequest {
    /// Domain to add or remove.
    pub domain: Option<String>,
    /// Target list: `disposable` or `allowlist`.
    pub list: Option<String>,
}

/// Response payload for a completed mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainListingResponse {
    /// The canonical domain.
    pub domain: String,
    /// The list the domain now belongs to, or was removed from.
    pub list: String,
    /// Whether the domain was moved from the opposite list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
}

/// Query parameters for listing a page of domains.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListDomainsQuery {
    /// Which list to page through: `disposable` or `allowlist`.
    pub list: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Entries per page, capped at 500.
    pub page_size: Option<u32>,
}

/// One page of list entries.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainPageResponse {
    /// Domains in this page, ordered by name.
    pub domains: Vec<DomainListingResponse>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total entries with this classification.
    pub total: u64,
}

impl From<DomainPage> for DomainPageResponse {
    fn from(page: DomainPage) -> Self {
        Self {
            domains: page
                .records
                .into_iter()
                .map(|record| DomainListingResponse {
                    domain: record.domain.to_string(),
                    list: record.classification.to_string(),
                    moved: None,
                })
                .collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

fn parse_domain(raw: Option<String>) -> Result<DomainName, Error> {
    let raw = raw.ok_or_else(|| Error::invalid_request("domain is required"))?;
    DomainName::new(&raw).map_err(|error| {
        Error::invalid_request(error.to_string()).with_details(json!({ "domain": raw }))
    })
}

fn parse_list(raw: Option<String>) -> Result<Classification, Error> {
    let raw = raw.ok_or_else(|| Error::invalid_request("list is required"))?;
    raw.parse::<Classification>().map_err(|_| {
        Error::invalid_request("list must be disposable or allowlist")
            .with_details(json!({ "list": raw }))
    })
}

/// Add a domain to a list.
#[utoipa::path(
    post,
    path = "/api/v1/domains",
    request_body = DomainListingRequest,
    responses(
        (status = 201, description = "Domain inserted", body = DomainListingResponse),
        (status = 200, description = "Domain moved from the opposite list", body = DomainListingResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Domain already listed", body = Error),
        (status = 503, description = "Authoritative store unavailable", body = Error)
    ),
    tags = ["domains"],
    operation_id = "addDomain"
)]
#[post("/domains")]
pub async fn add_domain(
    state: web::Data<HttpState>,
    payload: web::Json<DomainListingRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let domain = parse_domain(payload.domain)?;
    let classification = parse_list(payload.list)?;

    let outcome = state.admin.add(&domain, classification).await?;
    let body = DomainListingResponse {
        domain: outcome.domain.to_string(),
        list: outcome.classification.to_string(),
        moved: Some(outcome.moved),
    };
    let response = if outcome.moved {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::Created().json(body)
    };
    Ok(response)
}

/// Remove a domain from a list.
#[utoipa::path(
    delete,
    path = "/api/v1/domains",
    request_body = DomainListingRequest,
    responses(
        (status = 200, description = "Domain removed", body = DomainListingResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Domain not listed", body = Error),
        (status = 503, description = "Authoritative store unavailable", body = Error)
    ),
    tags = ["domains"],
    operation_id = "removeDomain"
)]
#[delete("/domains")]
pub async fn remove_domain(
    state: web::Data<HttpState>,
    payload: web::Json<DomainListingRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let domain = parse_domain(payload.domain)?;
    let classification = parse_list(payload.list)?;

    state.admin.remove(&domain, classification).await?;
    Ok(HttpResponse::Ok().json(DomainListingResponse {
        domain: domain.to_string(),
        list: classification.to_string(),
        moved: None,
    }))
}

/// Page through one list.
#[utoipa::path(
    get,
    path = "/api/v1/domains",
    params(ListDomainsQuery),
    responses(
        (status = 200, description = "One page of the requested list", body = DomainPageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Authoritative store unavailable", body = Error)
    ),
    tags = ["domains"],
    operation_id = "listDomains"
)]
#[get("/domains")]
pub async fn list_domains(
    state: web::Data<HttpState>,
    query: web::Query<ListDomainsQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let classification = parse_list(query.list)?;
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size > MAX_PAGE_SIZE {
        return Err(Error::invalid_request(format!(
            "pageSize must not exceed {MAX_PAGE_SIZE}"
        )));
    }

    let result = state.admin.page(classification, page, page_size).await?;
    Ok(HttpResponse::Ok().json(DomainPageResponse::from(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::json;

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
                        .service(add_domain)
                        .service(remove_domain)
                        .service(list_domains),
                ),
        )
        .await
    }

    #[actix_web::test]
    async fn add_inserts_and_reports_the_canonical_domain() {
        let app = service().await;
        let req = test::TestRequest::post()
            .uri("/api/v1/domains")
            .set_json(json!({ "domain": "Mailinator.COM", "list": "disposable" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 201);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["domain"], "mailinator.com");
        assert_eq!(body["list"], "disposable");
        assert_eq!(body["moved"], false);
    }

    #[actix_web::test]
    async fn add_rejects_unknown_lists() {
        let app = service().await;
        let req = test::TestRequest::post()
            .uri("/api/v1/domains")
            .set_json(json!({ "domain": "example.com", "list": "greylist" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn remove_surfaces_not_found() {
        let app = service().await;
        let req = test::TestRequest::delete()
            .uri("/api/v1/domains")
            .set_json(json!({ "domain": "example.com", "list": "allowlist" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 404);
    }

    #[actix_web::test]
    async fn listing_requires_a_known_list() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/domains?page=1")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn listing_returns_a_page_envelope() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/domains?list=disposable&page=2&pageSize=10")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["page"], 2);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["total"], 0);
    }

    #[actix_web::test]
    async fn oversized_pages_are_rejected() {
        let app = service().await;
        let req = test::TestRequest::get()
            .uri("/api/v1/domains?list=disposable&pageSize=1000")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
    }
}
