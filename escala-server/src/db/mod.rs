//! Database layer - storage traits, PostgreSQL and in-memory backends
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - Nested collections loaded per collection, not per row (no N+1)
//! - Rely on constraints and classify violations, no check-then-insert

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;

pub use error::DbError;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use postgres::PgStore;
pub use store::{
    DbResult, EventStore, LinkStore, MemberStore, NamedStore, ReportStore, SongStore, Store,
};
