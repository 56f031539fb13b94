//! # Store Contract
//!
//! The single capability interface the HTTP layer talks to. One
//! production implementation ([`Database`], PostgreSQL) and one test double
//! ([`InMemoryStore`](crate::memory::InMemoryStore)).
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Store Operations                               │
//! │                                                                         │
//! │  SIMPLE READS (one query, ordered, empty → [])                         │
//! │  ├── list_products             GET /product/info                       │
//! │  ├── list_full_products        GET /product                            │
//! │  ├── list_suppliers            GET /supplier/info                      │
//! │  ├── list_departments          GET /department/info                    │
//! │  ├── list_employees            GET /employee                           │
//! │  ├── list_employees_by_position                                        │
//! │  │   └── list_tellers          GET /employee/teller/info               │
//! │  └── list_products_by_supplier GET /supplier/product/{id}              │
//! │                                                                         │
//! │  SIMPLE WRITES (one statement, no transaction)                         │
//! │  ├── create_employee           POST /employee                          │
//! │  └── delete_employee           DELETE /employee                        │
//! │                                                                         │
//! │  TRANSACTIONAL WRITES (header + lines, all or nothing)                 │
//! │  ├── create_receipt            POST /receipt                           │
//! │  └── create_supplier_order     POST /order                             │
//! │                                                                         │
//! │  NESTED READS (header query + concurrent per-header line queries)     │
//! │  ├── full_receipts             GET /receipt                            │
//! │  └── full_supplier_orders      GET /order                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure comes back as a [`DbError`](crate::DbError) tagged with
//! the operation name.

use async_trait::async_trait;

use backoffice_core::{
    Department, Employee, EmployeeInfo, FullProduct, FullReceipt, FullSupplierOrder,
    NewEmployee, NewReceipt, NewSupplierOrder, ProductInfo, SupplierInfo, SupplierProduct,
    TellerInfo, TELLER_POSITION,
};

use crate::error::DbResult;
use crate::pool::Database;

// =============================================================================
// Trait
// =============================================================================

#[async_trait]
pub trait Store: Send + Sync {
    /// Products with id, name, stock quantity and price, by id.
    async fn list_products(&self) -> DbResult<Vec<ProductInfo>>;

    /// Products with category and owning department name, by id.
    async fn list_full_products(&self) -> DbResult<Vec<FullProduct>>;

    async fn list_suppliers(&self) -> DbResult<Vec<SupplierInfo>>;

    async fn list_departments(&self) -> DbResult<Vec<Department>>;

    /// The employee roster with department names.
    async fn list_employees(&self) -> DbResult<Vec<EmployeeInfo>>;

    async fn list_employees_by_position(&self, position: &str) -> DbResult<Vec<Employee>>;

    /// Employees whose position is [`TELLER_POSITION`].
    async fn list_tellers(&self) -> DbResult<Vec<TellerInfo>> {
        let employees = self.list_employees_by_position(TELLER_POSITION).await?;
        Ok(employees.iter().map(Employee::to_teller_info).collect())
    }

    /// Distinct products that appear on any order placed with the supplier.
    async fn list_products_by_supplier(&self, supplier_id: i64)
        -> DbResult<Vec<SupplierProduct>>;

    /// Inserts an employee and returns its generated id.
    async fn create_employee(&self, employee: &NewEmployee) -> DbResult<i64>;

    /// Deletes an employee. Deleting an id that does not exist is not an
    /// error.
    async fn delete_employee(&self, id: i64) -> DbResult<()>;

    /// Inserts a receipt header and its lines atomically; returns the
    /// header id.
    async fn create_receipt(&self, receipt: &NewReceipt) -> DbResult<i64>;

    /// Inserts a supplier order header and its lines atomically; returns
    /// the header id.
    async fn create_supplier_order(&self, order: &NewSupplierOrder) -> DbResult<i64>;

    /// Every receipt with its lines, by ascending id.
    async fn full_receipts(&self) -> DbResult<Vec<FullReceipt>>;

    /// Every supplier order with its lines, by ascending id.
    async fn full_supplier_orders(&self) -> DbResult<Vec<FullSupplierOrder>>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

#[async_trait]
impl Store for Database {
    async fn list_products(&self) -> DbResult<Vec<ProductInfo>> {
        self.catalog().list_products().await
    }

    async fn list_full_products(&self) -> DbResult<Vec<FullProduct>> {
        self.catalog().list_full_products().await
    }

    async fn list_suppliers(&self) -> DbResult<Vec<SupplierInfo>> {
        self.catalog().list_suppliers().await
    }

    async fn list_departments(&self) -> DbResult<Vec<Department>> {
        self.catalog().list_departments().await
    }

    async fn list_employees(&self) -> DbResult<Vec<EmployeeInfo>> {
        self.staff().list_employees().await
    }

    async fn list_employees_by_position(&self, position: &str) -> DbResult<Vec<Employee>> {
        self.staff().list_by_position(position).await
    }

    async fn list_products_by_supplier(
        &self,
        supplier_id: i64,
    ) -> DbResult<Vec<SupplierProduct>> {
        self.catalog().list_products_by_supplier(supplier_id).await
    }

    async fn create_employee(&self, employee: &NewEmployee) -> DbResult<i64> {
        self.staff().create(employee).await
    }

    async fn delete_employee(&self, id: i64) -> DbResult<()> {
        self.staff().delete(id).await
    }

    async fn create_receipt(&self, receipt: &NewReceipt) -> DbResult<i64> {
        self.receipts().create(receipt).await
    }

    async fn create_supplier_order(&self, order: &NewSupplierOrder) -> DbResult<i64> {
        self.supplier_orders().create(order).await
    }

    async fn full_receipts(&self) -> DbResult<Vec<FullReceipt>> {
        self.receipts().list_full().await
    }

    async fn full_supplier_orders(&self) -> DbResult<Vec<FullSupplierOrder>> {
        self.supplier_orders().list_full().await
    }
}
