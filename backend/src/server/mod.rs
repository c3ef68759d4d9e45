//! Process wiring: backend construction, HTTP server, and orderly drain.

mod config;

pub use config::AppSettings;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, info_span, warn};

#[cfg(debug_assertions)]
use user_directory::doc::ApiDoc;
use user_directory::domain::UserDirectoryService;
use user_directory::domain::ports::{
    FixtureUserRepository, UserCache, UserDirectory, UserRepository,
};
use user_directory::inbound::http::state::HttpState;
use user_directory::inbound::http::users;
use user_directory::outbound::cache::{CacheTopology, RedisCacheConfig, RedisUserCache};
use user_directory::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Process-wide backend handles, released in drain order on shutdown.
pub struct Backends {
    directory: Arc<dyn UserDirectory>,
    store_pool: Option<DbPool>,
    cache: Option<RedisUserCache>,
}

impl Backends {
    /// Construct the store, the optional cache, and the orchestrator.
    ///
    /// A missing database URL selects the in-memory store. A cache that
    /// cannot be reached is logged and the service runs without one.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the store pool cannot be built.
    pub async fn connect(settings: &AppSettings) -> std::io::Result<Self> {
        let (repository, store_pool): (Arc<dyn UserRepository>, Option<DbPool>) =
            match settings.database_url() {
                Some(url) => {
                    let config = PoolConfig::new(url)
                        .with_max_size(settings.db_max_connections())
                        .with_connection_timeout(settings.backend_timeout());
                    let pool = DbPool::new(config)
                        .await
                        .map_err(|err| std::io::Error::other(err.to_string()))?;
                    info!("record store pool ready");
                    let repository: Arc<dyn UserRepository> =
                        Arc::new(DieselUserRepository::new(pool.clone()));
                    (repository, Some(pool))
                }
                None => {
                    warn!("no database URL configured; using in-memory record store");
                    let repository: Arc<dyn UserRepository> =
                        Arc::new(FixtureUserRepository::new());
                    (repository, None)
                }
            };

        let cache = connect_cache(settings).await;
        let cache_port = cache
            .clone()
            .map(|cache| Arc::new(cache) as Arc<dyn UserCache>);

        let directory = UserDirectoryService::new(repository, cache_port)
            .with_cache_ttl(settings.cache_ttl())
            .with_backend_timeout(settings.backend_timeout())
            .with_span(info_span!("user_directory"));

        Ok(Self {
            directory: Arc::new(directory),
            store_pool,
            cache,
        })
    }

    /// Driving port handed to inbound adapters.
    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        Arc::clone(&self.directory)
    }

    /// Release the cache pool, then the store pool.
    pub fn shutdown(self) {
        let Self {
            directory,
            store_pool,
            cache,
        } = self;
        drop(directory);
        match cache {
            Some(cache) => cache.close(),
            None => info!("no cache to release"),
        }
        match store_pool {
            Some(pool) => pool.close(),
            None => info!("in-memory record store released"),
        }
    }
}

async fn connect_cache(settings: &AppSettings) -> Option<RedisUserCache> {
    let addresses = settings.redis_addrs();
    if addresses.is_empty() {
        info!("no cache addresses configured; running without cache");
        return None;
    }

    let config = RedisCacheConfig::new(addresses)
        .with_default_ttl(settings.cache_ttl())
        .with_connect_timeout(settings.cache_connect_timeout());
    let config = match settings.redis_cluster() {
        Some(true) => config.with_topology(CacheTopology::Cluster),
        Some(false) => config.with_topology(CacheTopology::Standalone),
        None => config,
    };
    match RedisUserCache::connect(config).await {
        Ok(cache) => {
            info!(address = cache.address(), "cache enabled");
            Some(cache)
        }
        Err(err) => {
            warn!(error = %err, "cache unavailable; running without cache");
            None
        }
    }
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1").configure(users::configure);

    let app = App::new()
        .app_data(http_state)
        .app_data(users::json_config())
        .service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the HTTP server over the given driving port.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    directory: Arc<dyn UserDirectory>,
    settings: &AppSettings,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let http_state =
        web::Data::new(HttpState::new(directory).with_request_timeout(settings.request_timeout()));

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "http server listening");
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn in_memory_settings() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            db_max_connections: None,
            redis_addrs: None,
            redis_cluster: None,
            cache_ttl_secs: None,
            cache_connect_timeout_ms: None,
            backend_timeout_ms: None,
            request_timeout_ms: None,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn in_memory_backends_serve_the_full_lifecycle() {
        let backends = Backends::connect(&in_memory_settings())
            .await
            .expect("in-memory backends");
        let state = web::Data::new(HttpState::new(backends.directory()));
        let app = actix_test::init_service(build_app(state)).await;

        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({"email": "ada@example.com", "name": "Ada"}))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(created).await;
        let id = body["id"].as_i64().expect("numeric id");

        let deleted = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let fetched = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(fetched.status(), StatusCode::NOT_FOUND);

        backends.shutdown();
    }

    #[rstest]
    #[case(None)]
    #[case(Some(true))]
    #[actix_web::test]
    async fn unreachable_cache_is_skipped(#[case] cluster: Option<bool>) {
        let settings = AppSettings {
            redis_addrs: Some("127.0.0.1:1".to_owned()),
            redis_cluster: cluster,
            cache_connect_timeout_ms: Some(200),
            ..in_memory_settings()
        };

        let cache = connect_cache(&settings).await;

        assert!(cache.is_none());
    }
}
