//! # Repository Module
//!
//! PostgreSQL repositories behind the [`Store`](crate::Store) contract.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  state.store.full_receipts()                                   │
//! │       ▼                                                                 │
//! │  impl Store for Database                                               │
//! │       │  db.receipts().list_full()                                     │
//! │       ▼                                                                 │
//! │  ReceiptRepository                                                     │
//! │  ├── create(&self, receipt)    ── writer::write_receipt(PgWriteTx)     │
//! │  ├── list_full(&self)          ── header query + fan_out               │
//! │  └── lines(pool, receipt_id)   ── one receipt's lines                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`] - Products, suppliers, departments
//! - [`StaffRepository`] - Employees
//! - [`ReceiptRepository`] - Receipts and receipt lines
//! - [`SupplierOrderRepository`] - Supplier orders and their lines
//! - [`PgWriteTx`] - The sqlx transaction behind both header + line writes

pub mod catalog;
pub mod receipt;
pub mod staff;
pub mod supplier_order;
pub mod transaction;

pub use catalog::CatalogRepository;
pub use receipt::ReceiptRepository;
pub use staff::StaffRepository;
pub use supplier_order::SupplierOrderRepository;
pub use transaction::PgWriteTx;
