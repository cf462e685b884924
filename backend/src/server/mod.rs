//! Server construction and wiring.
//!
//! Builds the adapter stack around the domain services, spawns the optional
//! background sync scheduler, and runs the Actix server.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::ports::SyncCommand;
use crate::domain::{ClassificationService, ListAdminService, SyncService};
use crate::inbound::http::audit_logs::{audit_logs_for_email, recent_audit_logs};
use crate::inbound::http::check_email::check_email;
use crate::inbound::http::domains::{add_domain, list_domains, remove_domain};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::sync::sync_domains;
use crate::middleware::Trace;
use crate::outbound::cache::{RedisCacheConfig, RedisVerdictCache};
use crate::outbound::feed::{FeedEndpoints, HttpDomainFeed};
use crate::outbound::persistence::{
    DbPool, DieselAuditLog, DieselDomainListRepository, PoolConfig,
};

/// Build every adapter and service, then run the HTTP server until
/// shutdown.
///
/// # Errors
///
/// Returns [`std::io::Error`] when a dependency cannot be constructed or
/// the listen address cannot be bound.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;
    let cache = Arc::new(
        RedisVerdictCache::connect(RedisCacheConfig::new(&config.redis_url))
            .await
            .map_err(std::io::Error::other)?,
    );
    let feed = Arc::new(
        HttpDomainFeed::new(FeedEndpoints {
            disposable: config.disposable_feed_url.clone(),
            allowlist: config.allowlist_feed_url.clone(),
        })
        .map_err(std::io::Error::other)?,
    );

    let repository = Arc::new(DieselDomainListRepository::new(pool.clone()));
    let audit = Arc::new(DieselAuditLog::new(pool));

    let check_email_service = Arc::new(ClassificationService::with_ttl(
        repository.clone(),
        cache.clone(),
        audit.clone(),
        config.verdict_ttl,
    ));
    let admin_service = Arc::new(ListAdminService::new(repository.clone(), cache.clone()));
    let sync_service: Arc<dyn SyncCommand> = Arc::new(
        SyncService::new(repository, cache, feed)
            .with_verdict_ttl(config.verdict_ttl)
            .with_immediate_invalidation(config.sync_immediate_invalidation),
    );

    if let Some(interval) = config.sync_interval {
        spawn_sync_scheduler(sync_service.clone(), interval);
    }

    let state = web::Data::new(HttpState::new(
        check_email_service,
        admin_service,
        sync_service,
        audit,
    ));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let server_state = state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(check_email)
                    .service(add_domain)
                    .service(remove_domain)
                    .service(list_domains)
                    .service(sync_domains)
                    .service(recent_audit_logs)
                    .service(audit_logs_for_email),
            )
            .service(ready)
            .service(live)
    })
    .bind(config.bind_addr.as_str())?;

    info!(bind_addr = %config.bind_addr, "server listening");
    health_state.mark_ready();
    server.run().await
}

/// Run the sync use-case on a fixed cadence.
///
/// The first run happens one full interval after startup.
fn spawn_sync_scheduler(sync: Arc<dyn SyncCommand>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match sync.sync().await {
                Ok(report) => info!(
                    disposable = report.disposable,
                    allowlisted = report.allowlisted,
                    invalidated = report.invalidated,
                    "scheduled sync completed"
                ),
                Err(error) => warn!(%error, "scheduled sync failed"),
            }
        }
    });
}
