//! Driving port for user directory operations.
//!
//! Inbound adapters depend on this trait only; they never see the store or
//! the cache. Identifiers arrive raw so the implementation can reject
//! non-positive values before touching any backend.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Update request as received from a transport.
///
/// Empty `email` or `name` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateUserRequest {
    /// Raw identifier; validated before any backend call.
    pub id: i64,
    /// Replacement email, or empty to keep the stored one.
    pub email: String,
    /// Replacement name, or empty to keep the stored one.
    pub name: String,
}

/// Driving port implemented by the cache-aside orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user with the given email and name.
    async fn create_user(&self, email: &str, name: &str) -> Result<User, Error>;

    /// Look up a user; `Ok(None)` means no such record.
    async fn get_user(&self, id: i64) -> Result<Option<User>, Error>;

    /// Apply a partial update.
    async fn update_user(&self, request: UpdateUserRequest) -> Result<User, Error>;

    /// Delete a user from the store and the cache.
    async fn delete_user(&self, id: i64) -> Result<(), Error>;
}
