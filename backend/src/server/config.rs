//! Process settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `USER_DIRECTORY_*` environment variables over
//! an optional config file. Every field is optional; accessors apply the
//! defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Settings for the `user-directory` server process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_DIRECTORY")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled store connections.
    pub db_max_connections: Option<u32>,
    /// Comma-separated cache node addresses; absent disables the cache.
    pub redis_addrs: Option<String>,
    /// Treat the addresses as Redis Cluster seeds; absent infers from count.
    pub redis_cluster: Option<bool>,
    /// Default TTL for cache entries, in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Per-node bound on the cache connection probe, in milliseconds.
    pub cache_connect_timeout_ms: Option<u64>,
    /// Bound on each store or cache call, in milliseconds.
    pub backend_timeout_ms: Option<u64>,
    /// End-to-end deadline for each HTTP request, in milliseconds.
    pub request_timeout_ms: Option<u64>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppSettings {
    /// Parsed listener address.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::ErrorKind::InvalidInput`] for an unparsable address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Maximum store pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Cache node addresses in probe order; empty disables the cache.
    pub fn redis_addrs(&self) -> Vec<String> {
        self.redis_addrs
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Explicit cluster-mode choice, if configured.
    pub fn redis_cluster(&self) -> Option<bool> {
        self.redis_cluster
    }

    /// Default cache entry TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    /// Cache connect probe timeout.
    pub fn cache_connect_timeout(&self) -> Duration {
        Duration::from_millis(
            self.cache_connect_timeout_ms
                .unwrap_or(DEFAULT_CACHE_CONNECT_TIMEOUT_MS),
        )
    }

    /// Per-call backend timeout.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms.unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS))
    }

    /// Whole-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "USER_DIRECTORY_BIND_ADDR",
        "USER_DIRECTORY_DATABASE_URL",
        "USER_DIRECTORY_DB_MAX_CONNECTIONS",
        "USER_DIRECTORY_REDIS_ADDRS",
        "USER_DIRECTORY_REDIS_CLUSTER",
        "USER_DIRECTORY_CACHE_TTL_SECS",
        "USER_DIRECTORY_CACHE_CONNECT_TIMEOUT_MS",
        "USER_DIRECTORY_BACKEND_TIMEOUT_MS",
        "USER_DIRECTORY_REQUEST_TIMEOUT_MS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("user-directory")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal parses")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_max_connections(), 10);
        assert!(settings.redis_addrs().is_empty());
        assert_eq!(settings.redis_cluster(), None);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
        assert_eq!(settings.cache_connect_timeout(), Duration::from_secs(5));
        assert_eq!(settings.backend_timeout(), Duration::from_secs(2));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_DIRECTORY_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "USER_DIRECTORY_DATABASE_URL",
                Some("postgres://app@db/users".to_owned()),
            ),
            ("USER_DIRECTORY_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            (
                "USER_DIRECTORY_REDIS_ADDRS",
                Some("cache-a:6379, ,redis://cache-b:6379".to_owned()),
            ),
            ("USER_DIRECTORY_REDIS_CLUSTER", Some("false".to_owned())),
            ("USER_DIRECTORY_CACHE_TTL_SECS", Some("60".to_owned())),
            ("USER_DIRECTORY_CACHE_CONNECT_TIMEOUT_MS", None),
            ("USER_DIRECTORY_BACKEND_TIMEOUT_MS", Some("250".to_owned())),
            ("USER_DIRECTORY_REQUEST_TIMEOUT_MS", Some("1000".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr().expect("parses").port(), 9090);
        assert_eq!(settings.database_url(), Some("postgres://app@db/users"));
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(
            settings.redis_addrs(),
            vec!["cache-a:6379".to_owned(), "redis://cache-b:6379".to_owned()]
        );
        assert_eq!(settings.redis_cluster(), Some(false));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.backend_timeout(), Duration::from_millis(250));
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }

    #[rstest]
    fn unparsable_bind_address_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            database_url: None,
            db_max_connections: None,
            redis_addrs: None,
            redis_cluster: None,
            cache_ttl_secs: None,
            cache_connect_timeout_ms: None,
            backend_timeout_ms: None,
            request_timeout_ms: None,
        };

        let err = settings.bind_addr().expect_err("invalid address");

        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn blank_database_url_selects_fixture_store() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: Some("   ".to_owned()),
            db_max_connections: None,
            redis_addrs: None,
            redis_cluster: None,
            cache_ttl_secs: None,
            cache_connect_timeout_ms: None,
            backend_timeout_ms: None,
            request_timeout_ms: None,
        };

        assert!(settings.database_url().is_none());
    }
}
