//! # backoffice-core: Pure Domain Types for the Back Office API
//!
//! Entity records, wire DTOs and money arithmetic shared by the database
//! layer and the HTTP adapter. Nothing in here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Back Office Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/api (axum HTTP adapter)                   │   │
//! │  │    GET /receipt ── POST /receipt ── GET /order ── ...           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Store trait                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    backoffice-db                                │   │
//! │  │     fan-out reads, transactional writes, PostgreSQL             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ backoffice-core (THIS CRATE) ★                     │   │
//! │  │     Money • Employee • Department • NewReceipt • FullReceipt    │   │
//! │  │     NO I/O • NO DATABASE • NO NETWORK                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, request bodies, response bodies
//! - [`money`] - Exact decimal money

// =============================================================================
// Module Declarations
// =============================================================================

pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Position value that marks an employee as a teller.
pub const TELLER_POSITION: &str = "cashier";

/// Loyalty card number clients send when the customer has no card.
pub const NO_LOYALTY_CARD: i64 = 0;
