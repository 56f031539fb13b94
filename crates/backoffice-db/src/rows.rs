//! # Row Mapper
//!
//! Flat relational rows as returned by PostgreSQL, and their conversion
//! into the typed records of `backoffice-core`.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SELECT ... (sqlx::FromRow)          backoffice-core record            │
//! │  ──────────────────────────          ──────────────────────            │
//! │  ProductInfoRow                ──►   ProductInfo                       │
//! │  FullProductRow                ──►   FullProduct                       │
//! │  EmployeeRow                   ──►   Employee ──► TellerInfo           │
//! │  EmployeeInfoRow               ──►   EmployeeInfo                      │
//! │  DepartmentRow                 ──►   Department ──► DepartmentInfo     │
//! │  NamedRow                      ──►   SupplierInfo / SupplierProduct    │
//! │  ReceiptHeaderRow              ──►   FullReceipt   (products: [])      │
//! │  ReceiptLineRow                ──►   ReceiptLine                       │
//! │  SupplierOrderHeaderRow        ──►   FullSupplierOrder (items: [])     │
//! │  SupplierOrderLineRow          ──►   SupplierOrderLine (amount = p×q)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows hold no state. Decoding problems are caught by sqlx before a row
//! struct exists; the one fallible conversion is the supplier line amount,
//! which is rejected when price × quantity leaves the decimal range.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::FromRow;

use backoffice_core::{
    Department, DepartmentInfo, Employee, EmployeeInfo, FullProduct, FullReceipt,
    FullSupplierOrder, Money, ProductInfo, ReceiptLine, SupplierInfo, SupplierOrderLine,
    SupplierProduct,
};

use crate::error::DbError;

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, FromRow)]
pub struct ProductInfoRow {
    pub id: i64,
    pub name: String,
    pub quantity_in_stock: i32,
    pub price: Money,
}

impl From<ProductInfoRow> for ProductInfo {
    fn from(row: ProductInfoRow) -> Self {
        ProductInfo {
            id: row.id,
            name: row.name,
            quantity: row.quantity_in_stock,
            price: row.price,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct FullProductRow {
    pub name: String,
    pub price: Money,
    pub quantity_in_stock: i32,
    pub category: String,
    pub department_name: String,
}

impl From<FullProductRow> for FullProduct {
    fn from(row: FullProductRow) -> Self {
        FullProduct {
            name: row.name,
            price: row.price,
            quantity: row.quantity_in_stock,
            category: row.category,
            department_name: row.department_name,
        }
    }
}

/// Any `(id, name)` pair: suppliers, and products ordered from a supplier.
#[derive(Debug, FromRow)]
pub struct NamedRow {
    pub id: i64,
    pub name: String,
}

impl From<NamedRow> for SupplierInfo {
    fn from(row: NamedRow) -> Self {
        SupplierInfo {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<NamedRow> for SupplierProduct {
    fn from(row: NamedRow) -> Self {
        SupplierProduct {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub employee_count: i32,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            location: row.location,
            employee_count: row.employee_count,
        }
    }
}

impl From<DepartmentRow> for DepartmentInfo {
    fn from(row: DepartmentRow) -> Self {
        Department::from(row).to_info()
    }
}

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub position: String,
    pub salary: Money,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            position: row.position,
            salary: row.salary,
        }
    }
}

/// Employee joined with its department; `department_name` is NULL when the
/// LEFT JOIN finds no department.
#[derive(Debug, FromRow)]
pub struct EmployeeInfoRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub position: String,
    pub salary: Money,
    pub department_name: Option<String>,
}

impl From<EmployeeInfoRow> for EmployeeInfo {
    fn from(row: EmployeeInfoRow) -> Self {
        EmployeeInfo {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            position: row.position,
            salary: row.salary,
            department: row.department_name,
        }
    }
}

// =============================================================================
// Receipts
// =============================================================================

#[derive(Debug, FromRow)]
pub struct ReceiptHeaderRow {
    pub id: i64,
    pub teller_first_name: String,
    pub teller_last_name: String,
    pub teller_middle_name: String,
    pub number: i64,
    pub date_time: NaiveDateTime,
    pub total_amount: Money,
    pub loyalty_card_number: Option<i64>,
}

impl From<ReceiptHeaderRow> for FullReceipt {
    fn from(row: ReceiptHeaderRow) -> Self {
        FullReceipt {
            id: row.id,
            teller_first_name: row.teller_first_name,
            teller_last_name: row.teller_last_name,
            teller_middle_name: row.teller_middle_name,
            number: row.number,
            date: row.date_time,
            total: row.total_amount,
            loyalty_card_number: row.loyalty_card_number,
            products: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ReceiptLineRow {
    pub name: String,
    pub quantity: i32,
    pub price_at_purchase: Money,
    pub amount: Money,
}

impl From<ReceiptLineRow> for ReceiptLine {
    fn from(row: ReceiptLineRow) -> Self {
        ReceiptLine {
            name: row.name,
            quantity: row.quantity,
            price: row.price_at_purchase,
            amount: row.amount,
        }
    }
}

// =============================================================================
// Supplier Orders
// =============================================================================

#[derive(Debug, FromRow)]
pub struct SupplierOrderHeaderRow {
    pub id: i64,
    pub order_date: NaiveDate,
    /// NULL until the goods arrive.
    pub date_of_receipt: Option<NaiveDate>,
    pub total_amount: Money,
    pub supplier_name: String,
}

impl From<SupplierOrderHeaderRow> for FullSupplierOrder {
    fn from(row: SupplierOrderHeaderRow) -> Self {
        FullSupplierOrder {
            id: row.id,
            order_date: row.order_date,
            date_of_receipt: row.date_of_receipt,
            total: row.total_amount,
            supplier_name: row.supplier_name,
            supplier_order_items: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SupplierOrderLineRow {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub purchase_price: Money,
}

impl TryFrom<SupplierOrderLineRow> for SupplierOrderLine {
    type Error = DbError;

    fn try_from(row: SupplierOrderLineRow) -> Result<Self, DbError> {
        let amount = row.purchase_price.checked_times(row.quantity).ok_or_else(|| {
            DbError::AmountOverflow(format!(
                "{} × {} for product {}",
                row.purchase_price, row.quantity, row.product_id
            ))
        })?;

        Ok(SupplierOrderLine {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.purchase_price,
            amount,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
