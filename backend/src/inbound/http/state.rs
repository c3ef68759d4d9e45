//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving port and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::UserDirectory;

/// Default end-to-end deadline applied to each request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Driving port for user operations.
    pub users: Arc<dyn UserDirectory>,
    /// Deadline applied to each handler.
    pub request_timeout: Duration,
}

impl HttpState {
    /// Construct state with the default request deadline.
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self {
            users,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
