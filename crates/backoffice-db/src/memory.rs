//! # In-Memory Store
//!
//! A [`Store`] backed by ordered maps instead of PostgreSQL. It keeps the
//! behaviors callers rely on so writer and aggregation logic can be tested
//! without a database:
//!
//! - foreign keys are enforced and reported as
//!   [`DbError::ForeignKeyViolation`] tagged like the real writes
//!   (`create_receipt: insert receipt line 2: ...`);
//! - header + line writes run the same [`crate::writer`] sequence as the
//!   database over a journaled transaction: rows are applied one by one
//!   and a failure at line N unwinds the header and lines 1..N-1;
//! - nested reads go through the same [`fan_out`] engine as the database,
//!   one task per header.
//!
//! ## Fault Injection
//! ```text
//! InMemoryStore::new()
//!     .with_line_latency(|id| Duration::from_millis(..))  ← per-header delay
//!     .failing_lines_of(3)                                ← line fetch fails
//!     .failing_operation("list_products")                 ← whole op fails
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

use backoffice_core::{
    Department, Employee, EmployeeInfo, FullProduct, FullReceipt, FullSupplierOrder, Money,
    NewEmployee, NewReceipt, NewReceiptLine, NewSupplierOrder, NewSupplierOrderLine, ProductInfo,
    ReceiptLine, SupplierInfo, SupplierOrderLine, SupplierProduct,
};

use crate::aggregate::fan_out;
use crate::error::{DbError, DbResult, OperationExt};
use crate::rows::SupplierOrderLineRow;
use crate::store::Store;
use crate::writer::{write_receipt, write_supplier_order, WriteTx};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    price: Money,
    category: String,
    quantity_in_stock: i32,
    department_id: i64,
}

#[derive(Debug, Clone)]
struct EmployeeRecord {
    employee: Employee,
    department_id: i64,
}

#[derive(Debug, Clone)]
struct ReceiptRecord {
    number: i64,
    date_time: NaiveDateTime,
    total: Money,
    employee_id: i64,
    loyalty_card_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct ReceiptLineRecord {
    receipt_id: i64,
    product_id: i64,
    quantity: i32,
    price: Money,
    amount: Money,
}

#[derive(Debug, Clone)]
struct SupplierOrderRecord {
    order_date: NaiveDate,
    date_of_receipt: Option<NaiveDate>,
    total: Money,
    supplier_id: i64,
}

#[derive(Debug, Clone)]
struct SupplierOrderLineRecord {
    order_id: i64,
    product_id: i64,
    price: Money,
    quantity: i32,
}

#[derive(Debug, Default)]
struct Tables {
    departments: BTreeMap<i64, Department>,
    products: BTreeMap<i64, ProductRecord>,
    employees: BTreeMap<i64, EmployeeRecord>,
    suppliers: BTreeMap<i64, String>,
    /// id → card number
    loyalty_cards: BTreeMap<i64, i64>,
    receipts: BTreeMap<i64, ReceiptRecord>,
    receipt_lines: Vec<ReceiptLineRecord>,
    supplier_orders: BTreeMap<i64, SupplierOrderRecord>,
    supplier_order_lines: Vec<SupplierOrderLineRecord>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    /// Next value of a per-table sequence, starting at 1. Values are never
    /// reused, even after deletes.
    fn next(&mut self, sequence: &'static str) -> i64 {
        let value = self.sequences.entry(sequence).or_insert(0);
        *value += 1;
        *value
    }
}

fn missing_reference(table: &str, column: &str, value: i64, target: &str) -> DbError {
    DbError::ForeignKeyViolation {
        message: format!("{table}.{column} = {value} is not present in table {target}"),
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

/// A row applied by an open [`MemoryTx`], undone on rollback.
#[derive(Debug, Clone, Copy)]
enum Written {
    Receipt(i64),
    ReceiptLine,
    SupplierOrder(i64),
    SupplierOrderLine,
}

/// Write transaction over the tables.
///
/// Rows are applied as they are inserted and journaled; rollback unwinds
/// the journal newest first. The write lock is held from begin to
/// commit/rollback, so readers never observe a half-written header.
/// Sequence values taken by a rolled-back write stay consumed, as with
/// PostgreSQL sequences.
struct MemoryTx<'a> {
    tables: RwLockWriteGuard<'a, Tables>,
    journal: Vec<Written>,
}

impl<'a> MemoryTx<'a> {
    async fn begin(tables: &'a RwLock<Tables>) -> Self {
        MemoryTx {
            tables: tables.write().await,
            journal: Vec::new(),
        }
    }
}

#[async_trait]
impl<'a> WriteTx for MemoryTx<'a> {
    async fn insert_receipt_header(
        &mut self,
        receipt: &NewReceipt,
        total: Money,
    ) -> DbResult<i64> {
        if !self.tables.employees.contains_key(&receipt.teller_id) {
            return Err(missing_reference(
                "Receipt",
                "employee_id",
                receipt.teller_id,
                "Employee",
            ));
        }
        let loyalty_card_id = receipt.loyalty_card_id();
        if let Some(card) = loyalty_card_id {
            if !self.tables.loyalty_cards.contains_key(&card) {
                return Err(missing_reference("Receipt", "loyalty_card_id", card, "Loyalty_Card"));
            }
        }

        let id = self.tables.next("receipt");
        let number = self.tables.next("receipt_number");
        self.tables.receipts.insert(
            id,
            ReceiptRecord {
                number,
                date_time: Utc::now().naive_utc(),
                total,
                employee_id: receipt.teller_id,
                loyalty_card_id,
            },
        );
        self.journal.push(Written::Receipt(id));
        Ok(id)
    }

    async fn insert_receipt_line(
        &mut self,
        receipt_id: i64,
        line: &NewReceiptLine,
    ) -> DbResult<()> {
        if !self.tables.receipts.contains_key(&receipt_id) {
            return Err(missing_reference(
                "Receipt_Product",
                "receipt_id",
                receipt_id,
                "Receipt",
            ));
        }
        if !self.tables.products.contains_key(&line.product_id) {
            return Err(missing_reference(
                "Receipt_Product",
                "product_id",
                line.product_id,
                "Product",
            ));
        }

        self.tables.receipt_lines.push(ReceiptLineRecord {
            receipt_id,
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
            amount: line.amount,
        });
        self.journal.push(Written::ReceiptLine);
        Ok(())
    }

    async fn insert_supplier_order_header(
        &mut self,
        order: &NewSupplierOrder,
        total: Money,
    ) -> DbResult<i64> {
        if !self.tables.suppliers.contains_key(&order.supplier_id) {
            return Err(missing_reference(
                "Supplier_Order",
                "supplier_id",
                order.supplier_id,
                "Supplier",
            ));
        }

        let id = self.tables.next("supplier_order");
        self.tables.supplier_orders.insert(
            id,
            SupplierOrderRecord {
                order_date: Utc::now().date_naive(),
                date_of_receipt: None,
                total,
                supplier_id: order.supplier_id,
            },
        );
        self.journal.push(Written::SupplierOrder(id));
        Ok(id)
    }

    async fn insert_supplier_order_line(
        &mut self,
        order_id: i64,
        line: &NewSupplierOrderLine,
    ) -> DbResult<()> {
        if !self.tables.supplier_orders.contains_key(&order_id) {
            return Err(missing_reference(
                "Supplier_Order_Items",
                "order_id",
                order_id,
                "Supplier_Order",
            ));
        }
        if !self.tables.products.contains_key(&line.product_id) {
            return Err(missing_reference(
                "Supplier_Order_Items",
                "product_id",
                line.product_id,
                "Product",
            ));
        }

        self.tables.supplier_order_lines.push(SupplierOrderLineRecord {
            order_id,
            product_id: line.product_id,
            price: line.price,
            quantity: line.quantity,
        });
        self.journal.push(Written::SupplierOrderLine);
        Ok(())
    }

    async fn commit(self) -> DbResult<()> {
        debug!(rows = self.journal.len(), "Memory transaction committed");
        Ok(())
    }

    async fn rollback(mut self) -> DbResult<()> {
        debug!(rows = self.journal.len(), "Memory transaction rolled back");
        while let Some(written) = self.journal.pop() {
            match written {
                Written::Receipt(id) => {
                    self.tables.receipts.remove(&id);
                }
                Written::ReceiptLine => {
                    self.tables.receipt_lines.pop();
                }
                Written::SupplierOrder(id) => {
                    self.tables.supplier_orders.remove(&id);
                }
                Written::SupplierOrderLine => {
                    self.tables.supplier_order_lines.pop();
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Faults
// =============================================================================

type LatencyFn = Arc<dyn Fn(i64) -> Duration + Send + Sync>;

#[derive(Clone, Default)]
struct Faults {
    line_latency: Option<LatencyFn>,
    failing_lines: HashSet<i64>,
    failing_operations: HashSet<String>,
}

impl Faults {
    fn check(&self, operation: &str) -> DbResult<()> {
        if self.failing_operations.contains(operation) {
            return Err(DbError::QueryFailed("injected failure".to_string()).in_operation(operation));
        }
        Ok(())
    }

    async fn before_line_fetch(&self, header_id: i64) -> DbResult<()> {
        if let Some(latency) = &self.line_latency {
            tokio::time::sleep(latency(header_id)).await;
        }
        if self.failing_lines.contains(&header_id) {
            return Err(DbError::QueryFailed(format!(
                "injected failure for lines of {header_id}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory [`Store`] with fault injection, for tests.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every line fetch by `latency(header_id)`.
    pub fn with_line_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(i64) -> Duration + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.faults).line_latency = Some(Arc::new(latency));
        self
    }

    /// Makes the line fetch of one header fail.
    pub fn failing_lines_of(mut self, header_id: i64) -> Self {
        Arc::make_mut(&mut self.faults).failing_lines.insert(header_id);
        self
    }

    /// Makes a whole store operation fail, e.g. `"list_products"`.
    pub fn failing_operation(mut self, operation: &str) -> Self {
        Arc::make_mut(&mut self.faults)
            .failing_operations
            .insert(operation.to_string());
        self
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub async fn add_department(&self, id: i64, name: &str, location: &str) {
        self.tables.write().await.departments.insert(
            id,
            Department {
                id,
                name: name.to_string(),
                location: location.to_string(),
                employee_count: 0,
            },
        );
    }

    pub async fn add_product(
        &self,
        id: i64,
        name: &str,
        price: Money,
        category: &str,
        quantity_in_stock: i32,
        department_id: i64,
    ) {
        self.tables.write().await.products.insert(
            id,
            ProductRecord {
                name: name.to_string(),
                price,
                category: category.to_string(),
                quantity_in_stock,
                department_id,
            },
        );
    }

    pub async fn add_supplier(&self, id: i64, name: &str) {
        self.tables
            .write()
            .await
            .suppliers
            .insert(id, name.to_string());
    }

    pub async fn add_loyalty_card(&self, id: i64, number: i64) {
        self.tables.write().await.loyalty_cards.insert(id, number);
    }

    /// Marks a supplier order as received.
    pub async fn set_date_of_receipt(&self, order_id: i64, date: NaiveDate) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .supplier_orders
            .get_mut(&order_id)
            .ok_or_else(|| DbError::not_found("Supplier_Order", order_id))?;
        order.date_of_receipt = Some(date);
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub async fn receipt_count(&self) -> usize {
        self.tables.read().await.receipts.len()
    }

    pub async fn receipt_line_count(&self) -> usize {
        self.tables.read().await.receipt_lines.len()
    }

    pub async fn supplier_order_count(&self) -> usize {
        self.tables.read().await.supplier_orders.len()
    }

    pub async fn supplier_order_line_count(&self) -> usize {
        self.tables.read().await.supplier_order_lines.len()
    }

    /// The loyalty card reference stored on a receipt, `None` when the
    /// receipt has no card or does not exist.
    pub async fn stored_loyalty_card_id(&self, receipt_id: i64) -> Option<i64> {
        self.tables
            .read()
            .await
            .receipts
            .get(&receipt_id)
            .and_then(|receipt| receipt.loyalty_card_id)
    }

    pub async fn stored_receipt_total(&self, receipt_id: i64) -> Option<Money> {
        self.tables
            .read()
            .await
            .receipts
            .get(&receipt_id)
            .map(|receipt| receipt.total)
    }
}

async fn receipt_lines(
    tables: Arc<RwLock<Tables>>,
    faults: Arc<Faults>,
    receipt_id: i64,
) -> DbResult<Vec<ReceiptLine>> {
    faults.before_line_fetch(receipt_id).await?;

    let tables = tables.read().await;
    Ok(tables
        .receipt_lines
        .iter()
        .filter(|line| line.receipt_id == receipt_id)
        .filter_map(|line| {
            let product = tables.products.get(&line.product_id)?;
            Some(ReceiptLine {
                name: product.name.clone(),
                quantity: line.quantity,
                price: line.price,
                amount: line.amount,
            })
        })
        .collect())
}

async fn supplier_order_lines(
    tables: Arc<RwLock<Tables>>,
    faults: Arc<Faults>,
    order_id: i64,
) -> DbResult<Vec<SupplierOrderLine>> {
    faults.before_line_fetch(order_id).await?;

    let tables = tables.read().await;
    tables
        .supplier_order_lines
        .iter()
        .filter(|line| line.order_id == order_id)
        .filter_map(|line| {
            let product = tables.products.get(&line.product_id)?;
            Some(SupplierOrderLine::try_from(SupplierOrderLineRow {
                product_id: line.product_id,
                product_name: product.name.clone(),
                quantity: line.quantity,
                purchase_price: line.price,
            }))
        })
        .collect()
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_products(&self) -> DbResult<Vec<ProductInfo>> {
        self.faults.check("list_products")?;
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .map(|(id, product)| ProductInfo {
                id: *id,
                name: product.name.clone(),
                quantity: product.quantity_in_stock,
                price: product.price,
            })
            .collect())
    }

    async fn list_full_products(&self) -> DbResult<Vec<FullProduct>> {
        self.faults.check("list_full_products")?;
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter_map(|product| {
                let department = tables.departments.get(&product.department_id)?;
                Some(FullProduct {
                    name: product.name.clone(),
                    price: product.price,
                    quantity: product.quantity_in_stock,
                    category: product.category.clone(),
                    department_name: department.name.clone(),
                })
            })
            .collect())
    }

    async fn list_suppliers(&self) -> DbResult<Vec<SupplierInfo>> {
        self.faults.check("list_suppliers")?;
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .iter()
            .map(|(id, name)| SupplierInfo {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn list_departments(&self) -> DbResult<Vec<Department>> {
        self.faults.check("list_departments")?;
        Ok(self.tables.read().await.departments.values().cloned().collect())
    }

    async fn list_employees(&self) -> DbResult<Vec<EmployeeInfo>> {
        self.faults.check("list_employees")?;
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .map(|record| {
                let employee = &record.employee;
                EmployeeInfo {
                    id: employee.id,
                    first_name: employee.first_name.clone(),
                    last_name: employee.last_name.clone(),
                    middle_name: employee.middle_name.clone(),
                    position: employee.position.clone(),
                    salary: employee.salary,
                    department: tables
                        .departments
                        .get(&record.department_id)
                        .map(|department| department.name.clone()),
                }
            })
            .collect())
    }

    async fn list_employees_by_position(&self, position: &str) -> DbResult<Vec<Employee>> {
        self.faults.check("list_employees_by_position")?;
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|record| record.employee.position == position)
            .map(|record| record.employee.clone())
            .collect())
    }

    async fn list_products_by_supplier(
        &self,
        supplier_id: i64,
    ) -> DbResult<Vec<SupplierProduct>> {
        self.faults.check("list_products_by_supplier")?;
        let tables = self.tables.read().await;

        let product_ids: std::collections::BTreeSet<i64> = tables
            .supplier_order_lines
            .iter()
            .filter(|line| {
                tables
                    .supplier_orders
                    .get(&line.order_id)
                    .is_some_and(|order| order.supplier_id == supplier_id)
            })
            .map(|line| line.product_id)
            .collect();

        Ok(product_ids
            .into_iter()
            .filter_map(|id| {
                let product = tables.products.get(&id)?;
                Some(SupplierProduct {
                    id,
                    name: product.name.clone(),
                })
            })
            .collect())
    }

    async fn create_employee(&self, employee: &NewEmployee) -> DbResult<i64> {
        self.faults.check("create_employee")?;
        let mut tables = self.tables.write().await;

        if !tables.departments.contains_key(&employee.department_id) {
            return Err(missing_reference(
                "Employee",
                "department_id",
                employee.department_id,
                "Department",
            )
            .in_operation("create_employee"));
        }

        let id = tables.next("employee");
        tables.employees.insert(
            id,
            EmployeeRecord {
                employee: Employee {
                    id,
                    first_name: employee.first_name.clone(),
                    last_name: employee.last_name.clone(),
                    middle_name: employee.middle_name.clone(),
                    position: employee.position.clone(),
                    salary: employee.salary,
                },
                department_id: employee.department_id,
            },
        );

        debug!(id, "Employee stored in memory");
        Ok(id)
    }

    async fn delete_employee(&self, id: i64) -> DbResult<()> {
        self.faults.check("delete_employee")?;
        let mut tables = self.tables.write().await;

        if tables.receipts.values().any(|receipt| receipt.employee_id == id) {
            return Err(DbError::ForeignKeyViolation {
                message: format!("Employee {id} is still referenced from table Receipt"),
            }
            .in_operation("delete_employee"));
        }

        tables.employees.remove(&id);
        Ok(())
    }

    async fn create_receipt(&self, receipt: &NewReceipt) -> DbResult<i64> {
        self.faults.check("create_receipt")?;

        let tx = MemoryTx::begin(&self.tables).await;
        let id = write_receipt(tx, receipt).await?;

        debug!(id, lines = receipt.products.len(), "Receipt stored in memory");
        Ok(id)
    }

    async fn create_supplier_order(&self, order: &NewSupplierOrder) -> DbResult<i64> {
        self.faults.check("create_supplier_order")?;

        let tx = MemoryTx::begin(&self.tables).await;
        let id = write_supplier_order(tx, order).await?;

        debug!(id, lines = order.supplier_order_items.len(), "Supplier order stored in memory");
        Ok(id)
    }

    async fn full_receipts(&self) -> DbResult<Vec<FullReceipt>> {
        self.faults.check("full_receipts")?;

        let headers: Vec<FullReceipt> = {
            let tables = self.tables.read().await;
            tables
                .receipts
                .iter()
                .filter_map(|(id, receipt)| {
                    let teller = &tables.employees.get(&receipt.employee_id)?.employee;
                    Some(FullReceipt {
                        id: *id,
                        teller_first_name: teller.first_name.clone(),
                        teller_last_name: teller.last_name.clone(),
                        teller_middle_name: teller.middle_name.clone(),
                        number: receipt.number,
                        date: receipt.date_time,
                        total: receipt.total,
                        loyalty_card_number: receipt
                            .loyalty_card_id
                            .and_then(|card| tables.loyalty_cards.get(&card).copied()),
                        products: Vec::new(),
                    })
                })
                .collect()
        };

        let tables = Arc::clone(&self.tables);
        let faults = Arc::clone(&self.faults);
        fan_out(headers, move |receipt_id| {
            receipt_lines(Arc::clone(&tables), Arc::clone(&faults), receipt_id)
        })
        .await
        .operation("full_receipts")
    }

    async fn full_supplier_orders(&self) -> DbResult<Vec<FullSupplierOrder>> {
        self.faults.check("full_supplier_orders")?;

        let headers: Vec<FullSupplierOrder> = {
            let tables = self.tables.read().await;
            tables
                .supplier_orders
                .iter()
                .filter_map(|(id, order)| {
                    let supplier_name = tables.suppliers.get(&order.supplier_id)?;
                    Some(FullSupplierOrder {
                        id: *id,
                        order_date: order.order_date,
                        date_of_receipt: order.date_of_receipt,
                        total: order.total,
                        supplier_name: supplier_name.clone(),
                        supplier_order_items: Vec::new(),
                    })
                })
                .collect()
        };

        let tables = Arc::clone(&self.tables);
        let faults = Arc::clone(&self.faults);
        fan_out(headers, move |order_id| {
            supplier_order_lines(Arc::clone(&tables), Arc::clone(&faults), order_id)
        })
        .await
        .operation("full_supplier_orders")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
