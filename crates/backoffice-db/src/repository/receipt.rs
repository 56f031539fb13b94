//! # Receipt Repository
//!
//! Writes a receipt header and its product lines as one transaction, and
//! reads every receipt back with its lines.
//!
//! ## Receipt Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(&NewReceipt)                               │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── INSERT INTO Receipt (total Σ amount, teller, card?) RETURNING id  │
//! │   ├── INSERT INTO Receipt_Product (id, line 1)                         │
//! │   ├── INSERT INTO Receipt_Product (id, line 2)                         │
//! │   └── ...                                                               │
//! │  COMMIT            ← only when every insert succeeded                   │
//! │                                                                         │
//! │  any failure ──► ROLLBACK, error tagged "create_receipt: insert ..."   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence is [`crate::writer::write_receipt`] over a
//! [`PgWriteTx`]. The employee, product and loyalty card references are
//! checked by the database's foreign keys, not here.

use sqlx::PgPool;
use tracing::{debug, info};

use backoffice_core::{FullReceipt, NewReceipt, ReceiptLine};

use crate::aggregate::fan_out;
use crate::error::{DbResult, OperationExt};
use crate::repository::PgWriteTx;
use crate::rows::{ReceiptHeaderRow, ReceiptLineRow};
use crate::writer::write_receipt;

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: PgPool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: PgPool) -> Self {
        ReceiptRepository { pool }
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Inserts the header and every line atomically and returns the header
    /// id. Nothing is visible to readers unless all inserts succeed.
    pub async fn create(&self, receipt: &NewReceipt) -> DbResult<i64> {
        debug!(
            teller_id = receipt.teller_id,
            loyalty_card_id = ?receipt.loyalty_card_id(),
            lines = receipt.products.len(),
            "Creating receipt"
        );

        let tx = PgWriteTx::begin(&self.pool)
            .await
            .operation("create_receipt")?;
        let id = write_receipt(tx, receipt).await?;

        info!(id, lines = receipt.products.len(), "Receipt created");
        Ok(id)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Every receipt, ascending by id, with teller name, loyalty card
    /// number (None when the receipt has no card) and product lines.
    pub async fn list_full(&self) -> DbResult<Vec<FullReceipt>> {
        let headers: Vec<ReceiptHeaderRow> = sqlx::query_as(
            r#"
            SELECT
                r.id,
                e.first_name AS teller_first_name,
                e.last_name AS teller_last_name,
                e.middle_name AS teller_middle_name,
                r.number,
                r.date_time,
                r.total_amount,
                lc.number AS loyalty_card_number
            FROM Receipt AS r
            JOIN Employee AS e ON e.id = r.employee_id
            LEFT JOIN Loyalty_Card AS lc ON lc.id = r.loyalty_card_id
            ORDER BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("full_receipts")?;

        debug!(count = headers.len(), "Fetched receipt headers");

        let headers: Vec<FullReceipt> = headers.into_iter().map(FullReceipt::from).collect();
        let pool = self.pool.clone();

        fan_out(headers, move |receipt_id| lines(pool.clone(), receipt_id))
            .await
            .operation("full_receipts")
    }
}

/// Product lines of one receipt, in insertion order.
pub async fn lines(pool: PgPool, receipt_id: i64) -> DbResult<Vec<ReceiptLine>> {
    let rows: Vec<ReceiptLineRow> = sqlx::query_as(
        r#"
        SELECT p.name, rp.quantity, rp.price_at_purchase, rp.amount
        FROM Receipt_Product AS rp
        JOIN Product AS p ON p.id = rp.product_id
        WHERE rp.receipt_id = $1
        ORDER BY rp.id
        "#,
    )
    .bind(receipt_id)
    .fetch_all(&pool)
    .await?;

    Ok(rows.into_iter().map(ReceiptLine::from).collect())
}
