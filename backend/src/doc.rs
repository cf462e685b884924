//! OpenAPI documentation configuration.
//!
//! Generates the OpenAPI specification for the REST API from the
//! `#[utoipa::path]` annotations on the inbound handlers.

use utoipa::OpenApi;

use crate::domain::ports::SyncReport;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::check_email::{CheckEmailRequest, CheckEmailResponse};
use crate::inbound::http::domains::{
    DomainListingRequest, DomainListingResponse, DomainPageResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Email screening API",
        description = "Disposable email domain classification, list administration, and feed synchronization."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::check_email::check_email,
        crate::inbound::http::domains::add_domain,
        crate::inbound::http::domains::remove_domain,
        crate::inbound::http::domains::list_domains,
        crate::inbound::http::sync::sync_domains,
        crate::inbound::http::audit_logs::recent_audit_logs,
        crate::inbound::http::audit_logs::audit_logs_for_email,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CheckEmailRequest,
        CheckEmailResponse,
        DomainListingRequest,
        DomainListingResponse,
        DomainPageResponse,
        SyncReport,
    )),
    tags(
        (name = "classification", description = "Email classification checks"),
        (name = "domains", description = "List administration"),
        (name = "sync", description = "Bulk feed synchronization"),
        (name = "audit", description = "Audit log reads"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
