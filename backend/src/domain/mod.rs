//! Domain primitives, ports, and the cache-aside orchestrator.
//!
//! Purpose: define strongly typed user records and the consistency rules
//! that keep the Accelerator Cache subordinate to the Record Store.
//! Adapters live under `inbound` and `outbound`; nothing here knows about
//! HTTP, PostgreSQL, or Redis.
//!
//! Public surface:
//! - Error / ErrorCode: transport-neutral failure with a stable kind.
//! - User / UserId / NewUser / UserChanges: validated user data.
//! - UserDirectoryService: implementation of [`ports::UserDirectory`].

pub mod error;
pub mod ports;
pub mod user;
pub mod user_directory_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::user::{NewUser, User, UserChanges, UserId, UserValidationError};
pub use self::user_directory_service::{DEFAULT_BACKEND_TIMEOUT, UserDirectoryService};
