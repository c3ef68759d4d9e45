//! Port interface for the optional Accelerator Cache.
//!
//! The cache mirrors individual user records keyed by [`super::UserCacheKey`].
//! It is never a source of truth: a miss is `Ok(None)`, and deleting an
//! absent key succeeds.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum UserCacheError {
        /// Cache backend rejected or failed the command.
        Backend { message: String } => "user cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "user cache serialisation failed: {message}",
        /// No cache node could be reached.
        Unavailable { message: String } => "user cache unavailable: {message}",
    }
}

/// Driven port for the Accelerator Cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Read the cached record for `id`; absent keys yield `Ok(None)`.
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError>;

    /// Mirror a record. `None` (or a zero TTL) applies the adapter default.
    async fn set(&self, user: &User, ttl: Option<Duration>) -> Result<(), UserCacheError>;

    /// Remove the mirror for `id`; idempotent.
    async fn delete(&self, id: UserId) -> Result<(), UserCacheError>;
}
