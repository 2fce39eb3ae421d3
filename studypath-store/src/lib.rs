//! SQLite storage layer for StudyPath.
//!
//! Provides persistent storage for the offline engine using SQLite.
//! SQLite is chosen for its single-file durability and transactional
//! guarantees, which the sync queue depends on.
//!
//! # Architecture
//!
//! - Domain records are stored as JSON blobs with schema-driven field
//!   extraction: each collection declares which fields are pulled out into
//!   indexed columns for range/filter queries
//! - The response cache and the sync-queue log live in dedicated tables
//!   inside the same database file, so there is exactly one durable store
//! - Schema migrations are idempotent and run on open

mod cache;
mod error;
mod queue;
mod schema;
mod store;

pub use cache::{ResponseCache, DEFAULT_CACHE_TTL};
pub use error::{StoreError, StoreResult};
pub use queue::{QueueStore, QueueTotals};
pub use schema::{Collection, IndexSpec};
pub use store::{Store, StoreTx};
