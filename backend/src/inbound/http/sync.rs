//! Bulk list synchronization HTTP handler.
//!
//! ```text
//! POST /api/v1/sync-domains
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::Error;
use crate::domain::ports::SyncReport;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Replace both lists from the upstream feeds.
#[utoipa::path(
    post,
    path = "/api/v1/sync-domains",
    responses(
        (status = 200, description = "Sync completed", body = SyncReport),
        (status = 502, description = "Upstream feed unavailable", body = Error),
        (status = 500, description = "Store replacement failed", body = Error)
    ),
    tags = ["sync"],
    operation_id = "syncDomains"
)]
#[post("/sync-domains")]
pub async fn sync_domains(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let report = state.sync.sync().await?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn reports_sync_counts() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::default()))
                .service(web::scope("/api/v1").service(sync_domains)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/sync-domains")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["disposable"], 0);
        assert_eq!(body["allowlisted"], 0);
        assert_eq!(body["invalidated"], 0);
    }
}
