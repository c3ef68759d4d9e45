//! User directory service: a cache-aside consistency layer keeping an
//! optional Redis cache subordinate to an authoritative PostgreSQL store.
//!
//! - [`domain`]: records, errors, ports, and the orchestrator.
//! - [`outbound`]: Diesel store and bb8-redis cache adapters.
//! - [`inbound`]: actix-web HTTP transport.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
