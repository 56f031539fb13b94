//! # Back Office API
//!
//! JSON-over-HTTP surface of the retail back office: employees,
//! departments, products, suppliers, supplier orders and sales receipts.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Back Office API                                 │
//! │                                                                         │
//! │  Browser (CORS_ORIGIN) ──► axum Router (routes/) ──► Arc<dyn Store>     │
//! │                               │                         │               │
//! │                               │ ApiError → 500          ├── Database    │
//! │                               │ no route → 404          └── InMemory    │
//! │                               ▼                                         │
//! │                  x-request-id • trace • CORS • timeout                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (optionally from `.env`), see [`config`]:
//! - `DB_USER`, `DB_PASS` - required database credentials
//! - `DB_HOST`, `DB_PORT`, `DB_NAME` - database location
//! - `HTTP_PORT` - listen port (default 8080)
//! - `RUST_LOG` - log filter

use std::sync::Arc;

use backoffice_db::Store;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::{build_router, HttpSettings};

/// Shared application state.
///
/// The store is injected: PostgreSQL in production, the in-memory store in
/// tests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}
