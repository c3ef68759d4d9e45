//! Cache-aside orchestration between the Record Store and the optional
//! Accelerator Cache.
//!
//! Failure policy:
//! - cache reads are best effort: failures are logged and the store answers;
//! - cache writes after a confirmed store mutation are surfaced, so a caller
//!   told "updated" or "deleted" never races a stale mirror;
//! - store failures always surface with their kind preserved.
//!
//! Every backend call is bounded by the configured backend timeout. Dropping
//! an operation's future cancels whichever backend call is in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{Instrument, Span, debug, error, info_span, warn};

use crate::domain::ports::{
    UpdateUserRequest, UserCache, UserCacheError, UserDirectory, UserPersistenceError,
    UserRepository,
};
use crate::domain::{Error, NewUser, User, UserChanges, UserId, UserValidationError};

/// Default bound applied to each store or cache call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Orchestrator implementing the [`UserDirectory`] driving port.
///
/// Holds no record state; the store and cache handles are shared and
/// internally synchronised.
pub struct UserDirectoryService<R: ?Sized, C: ?Sized> {
    repository: Arc<R>,
    cache: Option<Arc<C>>,
    cache_ttl: Option<Duration>,
    backend_timeout: Duration,
    span: Span,
}

impl<R: ?Sized, C: ?Sized> Clone for UserDirectoryService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
            cache_ttl: self.cache_ttl,
            backend_timeout: self.backend_timeout,
            span: self.span.clone(),
        }
    }
}

impl<R: ?Sized, C: ?Sized> UserDirectoryService<R, C> {
    /// Create a service over the given store and optional cache.
    pub fn new(repository: Arc<R>, cache: Option<Arc<C>>) -> Self {
        Self {
            repository,
            cache,
            cache_ttl: None,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            span: Span::none(),
        }
    }

    /// TTL passed with every cache write; without it the adapter default applies.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Bound applied to each individual store or cache call.
    #[must_use]
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Parent span under which every operation span is recorded.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether a cache is configured.
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    async fn bounded<T, E>(
        &self,
        call: impl Future<Output = Result<T, E>>,
        on_timeout: impl FnOnce(String) -> E,
    ) -> Result<T, E> {
        match tokio::time::timeout(self.backend_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(format!(
                "timed out after {}ms",
                self.backend_timeout.as_millis()
            ))),
        }
    }

    async fn store_call<T>(
        &self,
        call: impl Future<Output = Result<T, UserPersistenceError>>,
    ) -> Result<T, UserPersistenceError> {
        self.bounded(call, |message| UserPersistenceError::connection(message))
            .await
    }

    async fn cache_call<T>(
        &self,
        call: impl Future<Output = Result<T, UserCacheError>>,
    ) -> Result<T, UserCacheError> {
        self.bounded(call, |message| UserCacheError::unavailable(message))
            .await
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::NotFound { id } => Error::not_found(format!("user {id} not found")),
        UserPersistenceError::AlreadyExists { message } => {
            Error::already_exists(format!("user already exists: {message}"))
        }
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_cache_error(error: &UserCacheError) -> Error {
    Error::internal(error.to_string())
}

fn surface_store_error(error: UserPersistenceError) -> Error {
    match &error {
        UserPersistenceError::NotFound { .. } | UserPersistenceError::AlreadyExists { .. } => {
            debug!(error = %error, kind = error.variant_name(), "store rejected operation");
        }
        UserPersistenceError::Connection { .. } | UserPersistenceError::Query { .. } => {
            error!(error = %error, kind = error.variant_name(), "store operation failed");
        }
    }
    map_persistence_error(error)
}

fn reject(error: UserValidationError) -> Error {
    warn!(error = %error, "rejected invalid input");
    Error::from(error)
}

#[async_trait]
impl<R, C> UserDirectory for UserDirectoryService<R, C>
where
    R: UserRepository + ?Sized,
    C: UserCache + ?Sized,
{
    async fn create_user(&self, email: &str, name: &str) -> Result<User, Error> {
        let span = info_span!(parent: &self.span, "create_user");
        async move {
            let new_user = NewUser::new(email, name).map_err(reject)?;
            // The cache is not primed here; the first read populates it.
            let user = self
                .store_call(self.repository.create(&new_user))
                .await
                .map_err(surface_store_error)?;
            debug!(user_id = %user.id, "user created");
            Ok(user)
        }
        .instrument(span)
        .await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, Error> {
        let span = info_span!(parent: &self.span, "get_user", user_id = id);
        async move {
            let id = UserId::new(id).map_err(reject)?;

            if let Some(cache) = &self.cache {
                match self.cache_call(cache.get(id)).await {
                    Ok(Some(user)) => {
                        debug!("cache hit");
                        return Ok(Some(user));
                    }
                    Ok(None) => debug!("cache miss"),
                    Err(err) => warn!(
                        error = %err,
                        kind = err.variant_name(),
                        "cache read failed; falling back to store"
                    ),
                }
            }

            let found = match self.store_call(self.repository.find_by_id(id)).await {
                Ok(found) => found,
                Err(UserPersistenceError::NotFound { .. }) => None,
                Err(err) => return Err(surface_store_error(err)),
            };
            let Some(user) = found else {
                debug!("user not found");
                return Ok(None);
            };

            if let Some(cache) = &self.cache {
                if let Err(err) = self.cache_call(cache.set(&user, self.cache_ttl)).await {
                    warn!(
                        error = %err,
                        kind = err.variant_name(),
                        "cache populate failed; returning store result"
                    );
                }
            }
            Ok(Some(user))
        }
        .instrument(span)
        .await
    }

    async fn update_user(&self, request: UpdateUserRequest) -> Result<User, Error> {
        let span = info_span!(parent: &self.span, "update_user", user_id = request.id);
        async move {
            let UpdateUserRequest { id, email, name } = request;
            let id = UserId::new(id).map_err(reject)?;
            let changes = UserChanges::new(id, Some(email), Some(name)).map_err(reject)?;

            let updated = self
                .store_call(self.repository.update(&changes))
                .await
                .map_err(surface_store_error)?;

            if let Some(cache) = &self.cache {
                self.cache_call(cache.set(&updated, self.cache_ttl))
                    .await
                    .map_err(|err| {
                        error!(
                            error = %err,
                            kind = err.variant_name(),
                            "cache overwrite failed after store update"
                        );
                        map_cache_error(&err)
                    })?;
            }
            debug!("user updated");
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    async fn delete_user(&self, id: i64) -> Result<(), Error> {
        let span = info_span!(parent: &self.span, "delete_user", user_id = id);
        async move {
            let id = UserId::new(id).map_err(reject)?;

            self.store_call(self.repository.delete(id))
                .await
                .map_err(surface_store_error)?;

            if let Some(cache) = &self.cache {
                self.cache_call(cache.delete(id)).await.map_err(|err| {
                    error!(
                        error = %err,
                        kind = err.variant_name(),
                        "cache eviction failed after store delete"
                    );
                    map_cache_error(&err)
                })?;
            }
            debug!("user deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
