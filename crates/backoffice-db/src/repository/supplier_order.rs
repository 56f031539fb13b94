//! # Supplier Order Repository
//!
//! Purchase orders placed with suppliers. Same shape as receipts: a header
//! plus lines written in one transaction, read back with one query for the
//! headers and one concurrent query per header for the lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. PLACED   create()         order_date = CURRENT_DATE                 │
//! │                               date_of_receipt = NULL                    │
//! │                               total_amount = Σ price × quantity         │
//! │                                                                         │
//! │  2. RECEIVED (outside this service) date_of_receipt set                │
//! │                                                                         │
//! │  Reads report a NULL date_of_receipt as None, never as a zero date.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::PgPool;
use tracing::{debug, info};

use backoffice_core::{FullSupplierOrder, NewSupplierOrder, SupplierOrderLine};

use crate::aggregate::fan_out;
use crate::error::{DbResult, OperationExt};
use crate::repository::PgWriteTx;
use crate::rows::{SupplierOrderHeaderRow, SupplierOrderLineRow};
use crate::writer::write_supplier_order;

/// Repository for supplier order database operations.
#[derive(Debug, Clone)]
pub struct SupplierOrderRepository {
    pool: PgPool,
}

impl SupplierOrderRepository {
    /// Creates a new SupplierOrderRepository.
    pub fn new(pool: PgPool) -> Self {
        SupplierOrderRepository { pool }
    }

    /// Inserts the order header and its lines atomically and returns the
    /// header id.
    pub async fn create(&self, order: &NewSupplierOrder) -> DbResult<i64> {
        debug!(
            supplier_id = order.supplier_id,
            lines = order.supplier_order_items.len(),
            "Creating supplier order"
        );

        let tx = PgWriteTx::begin(&self.pool)
            .await
            .operation("create_supplier_order")?;
        let id = write_supplier_order(tx, order).await?;

        info!(id, supplier_id = order.supplier_id, "Supplier order created");
        Ok(id)
    }

    /// Every supplier order, ascending by id, with its supplier name and
    /// lines.
    pub async fn list_full(&self) -> DbResult<Vec<FullSupplierOrder>> {
        let headers: Vec<SupplierOrderHeaderRow> = sqlx::query_as(
            r#"
            SELECT
                so.id,
                so.order_date,
                so.date_of_receipt,
                so.total_amount,
                s.name AS supplier_name
            FROM Supplier_Order AS so
            JOIN Supplier AS s ON s.id = so.supplier_id
            ORDER BY so.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("full_supplier_orders")?;

        debug!(count = headers.len(), "Fetched supplier order headers");

        let headers: Vec<FullSupplierOrder> =
            headers.into_iter().map(FullSupplierOrder::from).collect();
        let pool = self.pool.clone();

        fan_out(headers, move |order_id| lines(pool.clone(), order_id))
            .await
            .operation("full_supplier_orders")
    }
}

/// Lines of one supplier order, in insertion order, with the line amount
/// derived from purchase price and quantity.
pub async fn lines(pool: PgPool, order_id: i64) -> DbResult<Vec<SupplierOrderLine>> {
    let rows: Vec<SupplierOrderLineRow> = sqlx::query_as(
        r#"
        SELECT
            soi.product_id,
            p.name AS product_name,
            soi.quantity,
            soi.purchase_price
        FROM Supplier_Order_Items AS soi
        JOIN Product AS p ON p.id = soi.product_id
        WHERE soi.order_id = $1
        ORDER BY soi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(&pool)
    .await?;

    rows.into_iter().map(SupplierOrderLine::try_from).collect()
}
