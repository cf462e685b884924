//! Integration tests exercising the classification pipeline over real Actix
//! handlers.
//!
//! These tests substitute deterministic in-memory adapters for the ports so
//! the full decision order (cache, exact list match, default) and the cache
//! consistency rules can be observed end to end without Postgres or Redis.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use backend::domain::ports::{
    AuditLog, AuditLogError, DomainFeed, DomainFeedError, DomainListRepository,
    DomainListRepositoryError, FeedKind, SyncCommand, VerdictCache, VerdictCacheError,
    VerdictCacheKey,
};
use backend::domain::{
    AuditAction, AuditEntry, CheckOutcome, Classification, ClassificationService, DomainName,
    DomainRecord, ListAdminService, NormalizedEmail, SyncService,
};
use backend::inbound::http::audit_logs::{audit_logs_for_email, recent_audit_logs};
use backend::inbound::http::check_email::check_email;
use backend::inbound::http::domains::{add_domain, list_domains, remove_domain};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::sync::sync_domains;

// -----------------------------------------------------------------------------
// In-memory adapters
// -----------------------------------------------------------------------------

#[derive(Default)]
struct MemoryRepository {
    records: Mutex<BTreeMap<DomainName, Classification>>,
}

#[async_trait]
impl DomainListRepository for MemoryRepository {
    async fn find(
        &self,
        domain: &DomainName,
    ) -> Result<Option<DomainRecord>, DomainListRepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.get(domain).map(|classification| DomainRecord {
            domain: domain.clone(),
            classification: *classification,
        }))
    }

    async fn insert(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned");
        if records.contains_key(domain) {
            return Err(DomainListRepositoryError::conflict(domain.as_str()));
        }
        records.insert(domain.clone(), classification);
        Ok(())
    }

    async fn reclassify(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned");
        match records.get_mut(domain) {
            Some(entry) => {
                *entry = classification;
                Ok(())
            }
            None => Err(DomainListRepositoryError::not_found(domain.as_str())),
        }
    }

    async fn remove(
        &self,
        domain: &DomainName,
        classification: Classification,
    ) -> Result<(), DomainListRepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned");
        match records.get(domain) {
            Some(entry) if *entry == classification => {
                records.remove(domain);
                Ok(())
            }
            _ => Err(DomainListRepositoryError::not_found(domain.as_str())),
        }
    }

    async fn list(
        &self,
        classification: Classification,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<DomainRecord>, DomainListRepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records
            .iter()
            .filter(|(_, entry)| **entry == classification)
            .skip(((page.saturating_sub(1)) as usize) * page_size as usize)
            .take(page_size as usize)
            .map(|(domain, entry)| DomainRecord {
                domain: domain.clone(),
                classification: *entry,
            })
            .collect())
    }

    async fn count(
        &self,
        classification: Classification,
    ) -> Result<u64, DomainListRepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records
            .values()
            .filter(|entry| **entry == classification)
            .count() as u64)
    }

    async fn replace_all(
        &self,
        records: Vec<DomainRecord>,
    ) -> Result<(), DomainListRepositoryError> {
        let mut current = self.records.lock().expect("lock poisoned");
        *current = records
            .into_iter()
            .map(|record| (record.domain, record.classification))
            .collect();
        Ok(())
    }

    async fn disposable_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records
            .iter()
            .filter(|(_, entry)| **entry == Classification::Disposable)
            .map(|(domain, _)| domain.clone())
            .collect())
    }

    async fn all_domains(&self) -> Result<Vec<DomainName>, DomainListRepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.keys().cloned().collect())
    }
}

#[derive(Default)]
struct MemoryCache {
    entries: Mutex<HashMap<String, CheckOutcome>>,
}

impl MemoryCache {
    fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("lock poisoned")
            .contains_key(key)
    }
}

#[async_trait]
impl VerdictCache for MemoryCache {
    async fn get(
        &self,
        key: &VerdictCacheKey,
    ) -> Result<Option<CheckOutcome>, VerdictCacheError> {
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries.get(key.as_str()).cloned())
    }

    async fn put(
        &self,
        key: &VerdictCacheKey,
        outcome: &CheckOutcome,
        _ttl: std::time::Duration,
    ) -> Result<(), VerdictCacheError> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        entries.insert(key.as_str().to_owned(), outcome.clone());
        Ok(())
    }

    async fn invalidate(&self, key: &VerdictCacheKey) -> Result<(), VerdictCacheError> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        entries.remove(key.as_str());
        Ok(())
    }

    async fn put_many(
        &self,
        batch: Vec<(VerdictCacheKey, CheckOutcome)>,
        _ttl: std::time::Duration,
    ) -> Result<(), VerdictCacheError> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        for (key, outcome) in batch {
            entries.insert(key.as_str().to_owned(), outcome);
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    fn actions(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|entry| entry.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(
        &self,
        email: &NormalizedEmail,
        domain: &DomainName,
        ip: Option<String>,
        action: AuditAction,
    ) -> Result<(), AuditLogError> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        entries.push(AuditEntry {
            email: email.as_str().to_owned(),
            domain: domain.to_string(),
            ip,
            action: action.as_str().to_owned(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AuditEntry>, AuditLogError> {
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries
            .iter()
            .rev()
            .skip(((page.saturating_sub(1)) as usize) * page_size as usize)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<AuditEntry>, AuditLogError> {
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.email == email)
            .cloned()
            .collect())
    }
}

struct ScriptedFeed {
    disposable: String,
    allowlist: String,
}

#[async_trait]
impl DomainFeed for ScriptedFeed {
    async fn fetch(&self, kind: FeedKind) -> Result<String, DomainFeedError> {
        Ok(match kind {
            FeedKind::Disposable => self.disposable.clone(),
            FeedKind::Allowlist => self.allowlist.clone(),
        })
    }
}

// -----------------------------------------------------------------------------
// Test harness
// -----------------------------------------------------------------------------

struct Stack {
    cache: Arc<MemoryCache>,
    audit: Arc<MemoryAuditLog>,
    state: web::Data<HttpState>,
}

fn stack_with_feed(disposable: &str, allowlist: &str) -> Stack {
    let repository = Arc::new(MemoryRepository::default());
    let cache = Arc::new(MemoryCache::default());
    let audit = Arc::new(MemoryAuditLog::default());
    let feed = Arc::new(ScriptedFeed {
        disposable: disposable.to_owned(),
        allowlist: allowlist.to_owned(),
    });

    let check = Arc::new(ClassificationService::new(
        repository.clone(),
        cache.clone(),
        audit.clone(),
    ));
    let admin = Arc::new(ListAdminService::new(repository.clone(), cache.clone()));
    let sync: Arc<dyn SyncCommand> = Arc::new(SyncService::new(repository, cache.clone(), feed));

    Stack {
        cache: cache.clone(),
        audit: audit.clone(),
        state: web::Data::new(HttpState::new(check, admin, sync, audit)),
    }
}

fn stack() -> Stack {
    stack_with_feed("", "")
}

async fn app(
    state: web::Data<HttpState>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new().app_data(state).service(
            web::scope("/api/v1")
                .service(check_email)
                .service(add_domain)
                .service(remove_domain)
                .service(list_domains)
                .service(sync_domains)
                .service(recent_audit_logs)
                .service(audit_logs_for_email),
        ),
    )
    .await
}

async fn post_json<S, B>(app: &S, uri: &str, body: serde_json::Value) -> (u16, serde_json::Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
    let res = test::call_service(app, req).await;
    let status = res.status().as_u16();
    (status, test::read_body_json(res).await)
}

async fn get_json<S, B>(app: &S, uri: &str) -> (u16, serde_json::Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let res = test::call_service(app, req).await;
    let status = res.status().as_u16();
    (status, test::read_body_json(res).await)
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[actix_web::test]
async fn listed_disposable_domain_is_blocked_and_audited() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    let (status, _) = post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "mailinator.com", "list": "disposable" }),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = post_json(
        &app,
        "/api/v1/check-email",
        json!({ "email": "User@Mailinator.com" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "blocked");
    assert_eq!(body["disposable"], true);
    assert_eq!(body["reason"], "not allowed");

    assert_eq!(stack.audit.actions(), vec!["blocked_disposable_db"]);
    assert!(stack.cache.contains("check-email:mailinator.com"));
}

#[actix_web::test]
async fn allowlisted_domain_is_trusted() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "fastmail.com", "list": "allowlist" }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/api/v1/check-email",
        json!({ "email": "user@fastmail.com" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["reason"], "trusted");
    assert_eq!(stack.audit.actions(), vec!["verified_allowlisted_db"]);
}

#[actix_web::test]
async fn unlisted_domain_is_allowed_by_default() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/check-email",
        json!({ "email": "user@example.org" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["reason"], "domain not found in any list");
    assert_eq!(stack.audit.actions(), vec!["verified_unknown"]);
}

#[actix_web::test]
async fn cached_verdicts_do_not_emit_new_audit_entries() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    for _ in 0..3 {
        let (status, _) = post_json(
            &app,
            "/api/v1/check-email",
            json!({ "email": "user@example.org" }),
        )
        .await;
        assert_eq!(status, 200);
    }

    assert_eq!(stack.audit.actions().len(), 1);
}

#[actix_web::test]
async fn moving_a_domain_between_lists_drops_its_cached_verdict() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "shared.example", "list": "disposable" }),
    )
    .await;
    let (_, body) = post_json(
        &app,
        "/api/v1/check-email",
        json!({ "email": "user@shared.example" }),
    )
    .await;
    assert_eq!(body["status"], "blocked");
    assert!(stack.cache.contains("check-email:shared.example"));

    let (status, body) = post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "shared.example", "list": "allowlist" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["moved"], true);
    assert!(!stack.cache.contains("check-email:shared.example"));

    let (_, body) = post_json(
        &app,
        "/api/v1/check-email",
        json!({ "email": "user@shared.example" }),
    )
    .await;
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["reason"], "trusted");
}

#[actix_web::test]
async fn duplicate_listing_is_a_conflict() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "mailinator.com", "list": "disposable" }),
    )
    .await;
    let (status, body) = post_json(
        &app,
        "/api/v1/domains",
        json!({ "domain": "mailinator.com", "list": "disposable" }),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn removing_an_unlisted_domain_is_not_found() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/domains")
        .set_json(json!({ "domain": "example.org", "list": "disposable" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 404);
}

#[actix_web::test]
async fn sync_installs_feeds_and_repopulates_the_cache() {
    let stack = stack_with_feed("a.com\nb.com\n# comment\n", "trusted.com\n");
    let app = app(stack.state.clone()).await;

    let (status, report) = post_json(&app, "/api/v1/sync-domains", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(report["disposable"], 2);
    assert_eq!(report["allowlisted"], 1);

    let (status, body) = get_json(&app, "/api/v1/domains?list=disposable").await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 2);

    assert!(stack.cache.contains("check-email:a.com"));
    assert!(stack.cache.contains("check-email:trusted.com"));

    // Verdicts repopulated by sync are served straight from the cache.
    let (_, body) = post_json(&app, "/api/v1/check-email", json!({ "email": "x@a.com" })).await;
    assert_eq!(body["status"], "blocked");
    assert!(stack.audit.actions().is_empty());
}

#[actix_web::test]
async fn audit_log_endpoints_page_and_filter() {
    let stack = stack();
    let app = app(stack.state.clone()).await;

    for email in ["a@one.example", "b@two.example", "a@one.example"] {
        post_json(&app, "/api/v1/check-email", json!({ "email": email })).await;
    }

    let (status, body) = get_json(&app, "/api/v1/audit-logs?page=1&pageSize=2").await;
    assert_eq!(status, 200);
    let page = body.as_array().expect("array body");
    assert_eq!(page.len(), 2);

    let (status, body) = get_json(&app, "/api/v1/audit-logs/a@one.example").await;
    assert_eq!(status, 200);
    let entries = body.as_array().expect("array body");
    assert!(
        entries
            .iter()
            .all(|entry| entry["email"] == "a@one.example")
    );
}
