//! Accelerator Cache adapters.
//!
//! The Redis adapter pools connections with `bb8-redis` for a standalone
//! node or routes through the cluster-aware client for a Redis Cluster. It
//! stores records as JSON and applies a TTL to every entry.

mod redis_user_cache;

pub use redis_user_cache::{
    CacheTopology, DEFAULT_CACHE_TTL, DEFAULT_CONNECT_TIMEOUT, RedisCacheConfig, RedisUserCache,
};
