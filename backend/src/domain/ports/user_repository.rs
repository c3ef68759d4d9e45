//! Port abstraction for the authoritative Record Store and its errors.
//!
//! The store owns identity assignment (`id`, `created_at`) and email
//! uniqueness. Adapters recognise their backend's uniqueness-violation
//! signal and report it as [`UserPersistenceError::AlreadyExists`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{NewUser, User, UserChanges, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// No row matched the identifier.
        NotFound { id: i64 } => "user {id} not found",
        /// A uniqueness constraint rejected the write.
        AlreadyExists { message: String } => "user already exists: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Driven port for the authoritative Record Store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the store assigns `id` and `created_at`.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier. A missing row is `Ok(None)`.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a partial update and return the stored result.
    async fn update(&self, changes: &UserChanges) -> Result<User, UserPersistenceError>;

    /// Remove a user, reporting `NotFound` when no row matched.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}

#[derive(Debug, Default)]
struct FixtureState {
    next_id: i64,
    users: BTreeMap<UserId, User>,
}

impl FixtureState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// In-memory repository used when no database is configured.
///
/// Mirrors the store contract: sequential ids starting at 1, store-assigned
/// timestamps, and email uniqueness.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    state: Mutex<FixtureState>,
}

impl FixtureUserRepository {
    /// Create an empty fixture repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut FixtureState) -> Result<T, UserPersistenceError>,
    ) -> Result<T, UserPersistenceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| UserPersistenceError::connection("fixture state poisoned"))?;
        f(&mut state)
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        self.with_state(|state| {
            if state.email_taken(user.email(), None) {
                return Err(UserPersistenceError::already_exists(user.email()));
            }
            state.next_id += 1;
            let id = UserId::new(state.next_id)
                .map_err(|err| UserPersistenceError::query(err.to_string()))?;
            let created = User {
                id,
                email: user.email().to_owned(),
                name: user.name().to_owned(),
                created_at: Utc::now(),
            };
            state.users.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.with_state(|state| Ok(state.users.get(&id).cloned()))
    }

    async fn update(&self, changes: &UserChanges) -> Result<User, UserPersistenceError> {
        self.with_state(|state| {
            let id = changes.id();
            let existing = state
                .users
                .get(&id)
                .ok_or_else(|| UserPersistenceError::not_found(id.get()))?;
            let updated = changes.apply_to(existing);
            if changes.email().is_some() && state.email_taken(&updated.email, Some(id)) {
                return Err(UserPersistenceError::already_exists(updated.email));
            }
            state.users.insert(id, updated.clone());
            Ok(updated)
        })
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.with_state(|state| {
            state
                .users
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| UserPersistenceError::not_found(id.get()))
        })
    }
}
