//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod user_cache;
mod user_directory;
mod user_repository;

pub use cache_key::{USER_CACHE_KEY_PREFIX, UserCacheKey};
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{UserCache, UserCacheError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UpdateUserRequest, UserDirectory};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
