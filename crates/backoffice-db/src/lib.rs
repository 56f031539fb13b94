//! # backoffice-db: Database Layer for the Back Office API
//!
//! This crate provides the [`Store`] contract and its PostgreSQL
//! implementation, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Back Office Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (GET /receipt)                                           │
//! │       │  Arc<dyn Store>                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  backoffice-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌────────────────┐  │   │
//! │  │   │   Database    │   │  Repositories  │   │   Aggregation  │  │   │
//! │  │   │   (pool.rs)   │   │                │   │  (aggregate.rs)│  │   │
//! │  │   │               │   │ CatalogRepo    │   │                │  │   │
//! │  │   │ PgPool        │◄──│ StaffRepo      │──►│ fan_out        │  │   │
//! │  │   │ Connection    │   │ ReceiptRepo    │   │ JoinSet + slot │  │   │
//! │  │   │ Management    │   │ SupplierOrder  │   │ Mutex          │  │   │
//! │  │   └───────────────┘   └───────┬────────┘   └────────────────┘  │   │
//! │  │                               │ rows.rs (FromRow → records)    │   │
//! │  │   InMemoryStore (memory.rs) ── same Store, no database         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL (sql/schema.sql)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`store`] - The `Store` trait and its PostgreSQL implementation
//! - [`repository`] - SQL per table group
//! - [`aggregate`] - Concurrent line-item fetch for nested reads
//! - [`rows`] - Row structs and their conversion to domain records
//! - [`writer`] - Header + lines write sequence over a `WriteTx`
//! - [`memory`] - In-memory `Store` for tests
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use backoffice_db::{Database, DbConfig, Store};
//!
//! let db = Database::connect(&DbConfig::new("user", "secret")).await?;
//! let receipts = db.full_receipts().await?;
//! db.close().await;
//! ```
//!
//! The schema is not migrated by this crate; `sql/schema.sql` documents
//! the tables the queries expect.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod error;
pub mod memory;
pub mod pool;
pub mod repository;
pub mod rows;
pub mod store;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OperationExt};
pub use memory::InMemoryStore;
pub use pool::{Database, DbConfig};
pub use store::Store;
pub use writer::WriteTx;

// Repository re-exports for convenience
pub use repository::{
    CatalogRepository, PgWriteTx, ReceiptRepository, StaffRepository, SupplierOrderRepository,
};
