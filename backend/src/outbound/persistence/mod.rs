//! PostgreSQL persistence adapter for the Record Store.
//!
//! Implements the domain's `UserRepository` port via Diesel with async
//! support through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapter**: the repository only translates between Diesel rows and
//!   domain types.
//! - **Internal models**: `models.rs` and `schema.rs` never leak into the
//!   domain layer.
//! - **Typed errors**: database failures are mapped to
//!   `UserPersistenceError`, with unique violations reported as
//!   `AlreadyExists`.
//!
//! ```ignore
//! use user_directory::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
