//! # Domain Types
//!
//! Entity records, request bodies and response bodies for the back office.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ENTITIES (rows)          REQUESTS (POST/DELETE)   RESPONSES (GET)      │
//! │  ───────────────          ──────────────────────   ───────────────      │
//! │  Employee ──────────────────────────────────────►  TellerInfo           │
//! │  Department ────────────────────────────────────►  DepartmentInfo       │
//! │                           NewEmployee              EmployeeInfo         │
//! │                           DeleteEmployee           ProductInfo          │
//! │                           NewReceipt               FullProduct          │
//! │                           └─ NewReceiptLine        SupplierInfo         │
//! │                           NewSupplierOrder         SupplierProduct      │
//! │                           └─ NewSupplierOrderLine  FullReceipt          │
//! │                                                    └─ ReceiptLine       │
//! │                                                    FullSupplierOrder    │
//! │                                                    └─ SupplierOrderLine │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All field names on the wire are snake_case and match the struct fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::NO_LOYALTY_CARD;

// =============================================================================
// Entities
// =============================================================================

/// An employee row.
///
/// Employees are created and deleted, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    /// Free-text role, e.g. "cashier".
    pub position: String,
    pub salary: Money,
}

impl Employee {
    /// Projects an employee onto the teller listing.
    pub fn to_teller_info(&self) -> TellerInfo {
        TellerInfo {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone(),
        }
    }
}

/// A department row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub location: String,
    /// Denormalized, read-only here.
    pub employee_count: i32,
}

impl Department {
    pub fn to_info(&self) -> DepartmentInfo {
        DepartmentInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /employee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub position: String,
    #[ts(type = "number")]
    pub salary: Money,
    pub department_id: i64,
}

/// Body of `DELETE /employee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeleteEmployee {
    #[serde(rename = "employee_id")]
    pub id: i64,
}

/// Body of `POST /receipt`.
///
/// ## Loyalty Card Sentinel
/// Clients send `loyalty_card_number: 0` (or omit the field) when the
/// customer has no card. That must never reach the store as a literal
/// zero foreign key, see [`NewReceipt::loyalty_card_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReceipt {
    #[serde(default)]
    #[ts(optional)]
    pub loyalty_card_number: Option<i64>,
    pub teller_id: i64,
    pub products: Vec<NewReceiptLine>,
}

impl NewReceipt {
    /// The loyalty card reference to store, with the "no card" sentinel
    /// translated to `None`.
    ///
    /// ```rust
    /// use backoffice_core::NewReceipt;
    ///
    /// let mut receipt = NewReceipt { loyalty_card_number: Some(0), teller_id: 1, products: vec![] };
    /// assert_eq!(receipt.loyalty_card_id(), None);
    ///
    /// receipt.loyalty_card_number = Some(42);
    /// assert_eq!(receipt.loyalty_card_id(), Some(42));
    /// ```
    pub fn loyalty_card_id(&self) -> Option<i64> {
        self.loyalty_card_number
            .filter(|number| *number != NO_LOYALTY_CARD)
    }

    /// Header total: sum of the client-computed line amounts, `None` when
    /// it does not fit the decimal range.
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.products.iter().map(|line| line.amount))
    }
}

/// One product line of a new receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReceiptLine {
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price at the time of purchase.
    #[ts(type = "number")]
    pub price: Money,
    /// Line amount as computed by the till.
    #[ts(type = "number")]
    pub amount: Money,
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplierOrder {
    pub supplier_id: i64,
    pub supplier_order_items: Vec<NewSupplierOrderLine>,
}

impl NewSupplierOrder {
    /// Header total: Σ purchase price × quantity, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.supplier_order_items
            .iter()
            .map(NewSupplierOrderLine::amount)
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount?))
    }
}

/// One product line of a new supplier order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplierOrderLine {
    /// Purchase price per unit.
    #[ts(type = "number")]
    pub price: Money,
    pub product_id: i64,
    pub quantity: i32,
}

impl NewSupplierOrderLine {
    pub fn amount(&self) -> Option<Money> {
        self.price.checked_times(self.quantity)
    }
}

// =============================================================================
// Responses: flat listings
// =============================================================================

/// Row of `GET /product/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInfo {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    #[ts(type = "number")]
    pub price: Money,
}

/// Row of `GET /product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FullProduct {
    pub name: String,
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: i32,
    pub category: String,
    pub department_name: String,
}

/// Row of `GET /employee/teller/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TellerInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
}

/// Row of `GET /department/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepartmentInfo {
    pub id: i64,
    pub name: String,
}

/// Row of `GET /employee`.
///
/// `department` is `None` for employees whose department row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmployeeInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub position: String,
    #[ts(type = "number")]
    pub salary: Money,
    pub department: Option<String>,
}

/// Row of `GET /supplier/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInfo {
    pub id: i64,
    pub name: String,
}

/// Row of `GET /supplier/product/{id}`: a product ever ordered from the
/// supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierProduct {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Responses: nested (header + line items)
// =============================================================================

/// A receipt with its teller, optional loyalty card and product lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FullReceipt {
    pub id: i64,
    pub teller_first_name: String,
    pub teller_last_name: String,
    pub teller_middle_name: String,
    pub number: i64,
    #[ts(type = "string")]
    pub date: NaiveDateTime,
    #[ts(type = "number")]
    pub total: Money,
    pub loyalty_card_number: Option<i64>,
    pub products: Vec<ReceiptLine>,
}

/// A product line of a stored receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i32,
    #[ts(type = "number")]
    pub price: Money,
    #[ts(type = "number")]
    pub amount: Money,
}

/// A supplier order with its supplier name and line items.
///
/// `date_of_receipt` stays `None` until the goods arrive; it is serialized
/// as `null`, never as a zero date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FullSupplierOrder {
    pub id: i64,
    #[ts(type = "string")]
    pub order_date: NaiveDate,
    #[ts(type = "string | null")]
    pub date_of_receipt: Option<NaiveDate>,
    #[ts(type = "number")]
    pub total: Money,
    pub supplier_name: String,
    pub supplier_order_items: Vec<SupplierOrderLine>,
}

/// A product line of a stored supplier order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierOrderLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    #[ts(type = "number")]
    pub price: Money,
    /// price × quantity
    #[ts(type = "number")]
    pub amount: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
