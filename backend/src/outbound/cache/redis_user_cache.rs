//! Redis-backed `UserCache` implementation.
//!
//! Records are stored as JSON under `user:<id>` with a per-entry expiry.
//! Two topologies are supported. A standalone deployment walks the node
//! list in order and pools connections to the first node that answers
//! `PING`. A cluster deployment treats the list as seed nodes and routes
//! each key to its owning master, following `MOVED`/`ASK` redirects.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::cluster::ClusterClient;
use bb8_redis::redis::cluster_async::ClusterConnection;
use bb8_redis::redis::{self, Cmd, FromRedisValue};
use tracing::{debug, info, warn};

use crate::domain::ports::{UserCache, UserCacheError, UserCacheKey};
use crate::domain::{User, UserId};

/// Default time-to-live applied when a write carries no TTL.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default bound on probing the cache at construction.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const NODE_POOL_SIZE: u32 = 8;

/// How the configured addresses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTopology {
    /// Independent nodes; the first reachable one serves every key.
    Standalone,
    /// Seed nodes of a Redis Cluster; keys are routed by hash slot.
    Cluster,
}

/// Connection settings for [`RedisUserCache`].
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    addresses: Vec<String>,
    topology: CacheTopology,
    default_ttl: Duration,
    connect_timeout: Duration,
}

impl RedisCacheConfig {
    /// Create a configuration for the given node addresses.
    ///
    /// Entries may be `host:port` or full `redis://` / `rediss://` URLs.
    /// Blank entries are ignored. More than one address selects
    /// [`CacheTopology::Cluster`]; see [`Self::with_topology`].
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses: Vec<String> = addresses
            .into_iter()
            .filter_map(|address| normalise_address(address.as_ref()))
            .collect();
        let topology = if addresses.len() > 1 {
            CacheTopology::Cluster
        } else {
            CacheTopology::Standalone
        };
        Self {
            addresses,
            topology,
            default_ttl: DEFAULT_CACHE_TTL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Override the topology inferred from the address count.
    #[must_use]
    pub fn with_topology(mut self, topology: CacheTopology) -> Self {
        self.topology = topology;
        self
    }

    /// TTL applied when callers pass none (or zero).
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.default_ttl = ttl;
        }
        self
    }

    /// Bound on the construction probe (per node when standalone).
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Normalised node URLs in probe order.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Topology used by [`RedisUserCache::connect`].
    pub fn topology(&self) -> CacheTopology {
        self.topology
    }
}

fn normalise_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("redis://") || trimmed.starts_with("rediss://") {
        Some(trimmed.to_owned())
    } else {
        Some(format!("redis://{trimmed}"))
    }
}

/// Whole seconds for `SET EX`. Sub-second remainders round up so an entry
/// never expires before the requested TTL; the result is at least one.
fn expiry_seconds(requested: Option<Duration>, default_ttl: Duration) -> u64 {
    let ttl = requested
        .filter(|ttl| !ttl.is_zero())
        .unwrap_or(default_ttl);
    let whole = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    whole.max(1)
}

#[derive(Clone)]
enum Backend {
    Node(Pool<RedisConnectionManager>),
    Cluster(ClusterConnection),
}

/// Redis adapter for the Accelerator Cache.
#[derive(Clone)]
pub struct RedisUserCache {
    backend: Backend,
    address: String,
    default_ttl: Duration,
}

impl RedisUserCache {
    /// Probe the configured nodes and bind according to the topology.
    ///
    /// # Errors
    ///
    /// Returns [`UserCacheError::Unavailable`] when no address is configured
    /// or the cache does not answer `PING` within the connect timeout.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, UserCacheError> {
        if config.addresses.is_empty() {
            return Err(UserCacheError::unavailable("no cache addresses configured"));
        }
        match config.topology {
            CacheTopology::Standalone => Self::connect_standalone(&config).await,
            CacheTopology::Cluster => Self::connect_cluster(&config).await,
        }
    }

    async fn connect_standalone(config: &RedisCacheConfig) -> Result<Self, UserCacheError> {
        let mut failures = Vec::with_capacity(config.addresses.len());
        for address in &config.addresses {
            match tokio::time::timeout(config.connect_timeout, probe_node(address, config)).await {
                Ok(Ok(pool)) => {
                    info!(%address, "connected to cache node");
                    return Ok(Self {
                        backend: Backend::Node(pool),
                        address: address.clone(),
                        default_ttl: config.default_ttl,
                    });
                }
                Ok(Err(err)) => {
                    warn!(%address, error = %err, "cache node unreachable");
                    failures.push(format!("{address}: {err}"));
                }
                Err(_) => {
                    warn!(%address, "cache node probe timed out");
                    failures.push(format!(
                        "{address}: timed out after {}ms",
                        config.connect_timeout.as_millis()
                    ));
                }
            }
        }

        Err(UserCacheError::unavailable(failures.join("; ")))
    }

    async fn connect_cluster(config: &RedisCacheConfig) -> Result<Self, UserCacheError> {
        let seeds = config.addresses.join(",");
        let outcome = tokio::time::timeout(config.connect_timeout, probe_cluster(config)).await;
        let failure = match outcome {
            Ok(Ok(connection)) => {
                info!(%seeds, "connected to cache cluster");
                return Ok(Self {
                    backend: Backend::Cluster(connection),
                    address: seeds,
                    default_ttl: config.default_ttl,
                });
            }
            Ok(Err(err)) => err,
            Err(_) => format!("timed out after {}ms", config.connect_timeout.as_millis()),
        };
        warn!(%seeds, error = %failure, "cache cluster unreachable");
        Err(UserCacheError::unavailable(format!("cluster {seeds}: {failure}")))
    }

    /// Node URL (standalone) or comma-joined seed list (cluster).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Release this handle, logging what it held.
    pub fn close(self) {
        match &self.backend {
            Backend::Node(pool) => {
                let state = pool.state();
                info!(
                    address = %self.address,
                    connections = state.connections,
                    idle = state.idle_connections,
                    "closing cache pool"
                );
            }
            Backend::Cluster(_) => info!(seeds = %self.address, "closing cache cluster connection"),
        }
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, UserCacheError> {
        match &self.backend {
            Backend::Node(pool) => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|err| UserCacheError::unavailable(err.to_string()))?;
                cmd.query_async(&mut *conn).await.map_err(map_redis_error)
            }
            Backend::Cluster(connection) => {
                let mut conn = connection.clone();
                cmd.query_async(&mut conn).await.map_err(map_redis_error)
            }
        }
    }
}

async fn probe_node(
    address: &str,
    config: &RedisCacheConfig,
) -> Result<Pool<RedisConnectionManager>, String> {
    let manager = RedisConnectionManager::new(address).map_err(|err| err.to_string())?;
    let pool = Pool::builder()
        .max_size(NODE_POOL_SIZE)
        .connection_timeout(config.connect_timeout)
        .build(manager)
        .await
        .map_err(|err| err.to_string())?;

    {
        let mut conn = pool.get().await.map_err(|err| err.to_string())?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|err| err.to_string())?;
    }

    Ok(pool)
}

async fn probe_cluster(config: &RedisCacheConfig) -> Result<ClusterConnection, String> {
    let client = ClusterClient::builder(config.addresses.iter().map(String::as_str))
        .connection_timeout(config.connect_timeout)
        .build()
        .map_err(|err| err.to_string())?;
    let mut connection = client
        .get_async_connection()
        .await
        .map_err(|err| err.to_string())?;
    redis::cmd("PING")
        .query_async::<String>(&mut connection)
        .await
        .map_err(|err| err.to_string())?;
    Ok(connection)
}

fn map_redis_error(error: redis::RedisError) -> UserCacheError {
    if error.is_io_error() || error.is_connection_dropped() || error.is_timeout() {
        UserCacheError::unavailable(error.to_string())
    } else {
        UserCacheError::backend(error.to_string())
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError> {
        let key = UserCacheKey::for_user(id);

        let payload: Option<Vec<u8>> = self.query(&Cmd::get(key.as_str())).await?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let user: User = serde_json::from_slice(&payload).map_err(|err| {
            debug!(%key, error = %err, "undecodable cache entry");
            UserCacheError::serialization(err.to_string())
        })?;
        Ok(Some(user))
    }

    async fn set(&self, user: &User, ttl: Option<Duration>) -> Result<(), UserCacheError> {
        let key = UserCacheKey::for_user(user.id);
        let payload =
            serde_json::to_vec(user).map_err(|err| UserCacheError::serialization(err.to_string()))?;
        let seconds = expiry_seconds(ttl, self.default_ttl);

        self.query::<()>(&Cmd::set_ex(key.as_str(), payload, seconds))
            .await?;
        debug!(%key, ttl_secs = seconds, "cache entry written");
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserCacheError> {
        let key = UserCacheKey::for_user(id);

        self.query::<()>(&Cmd::del(key.as_str())).await
    }
}
