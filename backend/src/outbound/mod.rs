//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL Record Store using Diesel
//! - **cache**: Redis Accelerator Cache using bb8-redis
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no consistency logic; ordering of store
//! and cache calls belongs to the domain service.

pub mod cache;
pub mod persistence;
