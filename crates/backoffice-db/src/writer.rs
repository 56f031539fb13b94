//! # Transactional Writer
//!
//! The header-then-lines write shared by receipts and supplier orders. The
//! sequence lives here once; the storage side only supplies single-row
//! inserts plus commit and rollback through [`WriteTx`].
//!
//! ## Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  write_receipt(tx, receipt)                                             │
//! │                                                                         │
//! │  total = Σ amount          ── overflow ──┐                              │
//! │  insert header → id        ── error ─────┤                              │
//! │  insert line 1 (id)        ── error ─────┤                              │
//! │  insert line 2 (id)        ── error ─────┼──► rollback, tagged error    │
//! │  ...                                     │    "create_receipt:          │
//! │  commit                    ── error ─────┘     insert receipt line 2:   │
//! │     │                                          ..."                     │
//! │     ▼                                                                   │
//! │  Ok(id)                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: [`PgWriteTx`](crate::repository::PgWriteTx) over a sqlx
//! transaction, and the journaled in-memory transaction of
//! [`InMemoryStore`](crate::InMemoryStore).

use async_trait::async_trait;
use tracing::warn;

use backoffice_core::{Money, NewReceipt, NewReceiptLine, NewSupplierOrder, NewSupplierOrderLine};

use crate::error::{DbError, DbResult, OperationExt};

/// One open write transaction.
///
/// Nothing written through it is visible to readers until
/// [`commit`](WriteTx::commit); [`rollback`](WriteTx::rollback) discards
/// every row written so far.
#[async_trait]
pub trait WriteTx: Send {
    /// Inserts the receipt header and returns its id.
    async fn insert_receipt_header(&mut self, receipt: &NewReceipt, total: Money)
        -> DbResult<i64>;

    async fn insert_receipt_line(&mut self, receipt_id: i64, line: &NewReceiptLine)
        -> DbResult<()>;

    /// Inserts the supplier order header and returns its id.
    async fn insert_supplier_order_header(
        &mut self,
        order: &NewSupplierOrder,
        total: Money,
    ) -> DbResult<i64>;

    async fn insert_supplier_order_line(
        &mut self,
        order_id: i64,
        line: &NewSupplierOrderLine,
    ) -> DbResult<()>;

    async fn commit(self) -> DbResult<()>;

    async fn rollback(self) -> DbResult<()>;
}

/// Writes a receipt and its lines through `tx`, committing only when every
/// row succeeded. Errors are tagged `create_receipt: <step>: ...`.
pub async fn write_receipt<T: WriteTx>(mut tx: T, receipt: &NewReceipt) -> DbResult<i64> {
    let written = receipt_rows(&mut tx, receipt).await;
    finish(tx, written).await.operation("create_receipt")
}

/// Writes a supplier order and its lines through `tx`. Errors are tagged
/// `create_supplier_order: <step>: ...`.
pub async fn write_supplier_order<T: WriteTx>(
    mut tx: T,
    order: &NewSupplierOrder,
) -> DbResult<i64> {
    let written = supplier_order_rows(&mut tx, order).await;
    finish(tx, written).await.operation("create_supplier_order")
}

async fn receipt_rows<T: WriteTx>(tx: &mut T, receipt: &NewReceipt) -> DbResult<i64> {
    let total = receipt
        .total()
        .ok_or_else(|| DbError::AmountOverflow("sum of receipt line amounts".to_string()))
        .operation("compute receipt total")?;

    let receipt_id = tx
        .insert_receipt_header(receipt, total)
        .await
        .operation("insert receipt header")?;

    for (index, line) in receipt.products.iter().enumerate() {
        tx.insert_receipt_line(receipt_id, line)
            .await
            .operation(&format!("insert receipt line {}", index + 1))?;
    }

    Ok(receipt_id)
}

async fn supplier_order_rows<T: WriteTx>(tx: &mut T, order: &NewSupplierOrder) -> DbResult<i64> {
    let total = order
        .total()
        .ok_or_else(|| DbError::AmountOverflow("sum of price × quantity".to_string()))
        .operation("compute supplier order total")?;

    let order_id = tx
        .insert_supplier_order_header(order, total)
        .await
        .operation("insert supplier order header")?;

    for (index, line) in order.supplier_order_items.iter().enumerate() {
        tx.insert_supplier_order_line(order_id, line)
            .await
            .operation(&format!("insert supplier order line {}", index + 1))?;
    }

    Ok(order_id)
}

/// Commits on success, rolls back on failure. A failed rollback is only
/// logged: the original error is what the caller needs.
async fn finish<T: WriteTx>(tx: T, written: DbResult<i64>) -> DbResult<i64> {
    match written {
        Ok(id) => {
            tx.commit().await?;
            Ok(id)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every call; fails the nth line insert or the commit.
    #[derive(Default)]
    struct RecordingTx {
        calls: Arc<Mutex<Vec<String>>>,
        fail_line: Option<usize>,
        fail_commit: bool,
        lines_written: usize,
    }

    impl RecordingTx {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn line(&mut self, call: String) -> DbResult<()> {
            self.lines_written += 1;
            if self.fail_line == Some(self.lines_written) {
                self.record(format!("{call} failed"));
                return Err(DbError::ForeignKeyViolation {
                    message: "product is not present in table Product".to_string(),
                });
            }
            self.record(call);
            Ok(())
        }
    }

    #[async_trait]
    impl WriteTx for RecordingTx {
        async fn insert_receipt_header(
            &mut self,
            receipt: &NewReceipt,
            total: Money,
        ) -> DbResult<i64> {
            self.record(format!("header teller={} total={total}", receipt.teller_id));
            Ok(10)
        }

        async fn insert_receipt_line(
            &mut self,
            receipt_id: i64,
            line: &NewReceiptLine,
        ) -> DbResult<()> {
            self.line(format!("line {receipt_id}/{}", line.product_id))
        }

        async fn insert_supplier_order_header(
            &mut self,
            order: &NewSupplierOrder,
            total: Money,
        ) -> DbResult<i64> {
            self.record(format!("header supplier={} total={total}", order.supplier_id));
            Ok(20)
        }

        async fn insert_supplier_order_line(
            &mut self,
            order_id: i64,
            line: &NewSupplierOrderLine,
        ) -> DbResult<()> {
            self.line(format!("line {order_id}/{}", line.product_id))
        }

        async fn commit(self) -> DbResult<()> {
            if self.fail_commit {
                self.record("commit failed");
                return Err(DbError::TransactionFailed("connection reset".to_string()));
            }
            self.record("commit");
            Ok(())
        }

        async fn rollback(self) -> DbResult<()> {
            self.record("rollback");
            Ok(())
        }
    }

    fn receipt(product_ids: &[i64]) -> NewReceipt {
        NewReceipt {
            loyalty_card_number: None,
            teller_id: 1,
            products: product_ids
                .iter()
                .map(|product_id| NewReceiptLine {
                    product_id: *product_id,
                    quantity: 2,
                    price: Money::from_units(700),
                    amount: Money::from_units(1400),
                })
                .collect(),
        }
    }

    fn supplier_order(product_ids: &[i64]) -> NewSupplierOrder {
        NewSupplierOrder {
            supplier_id: 5,
            supplier_order_items: product_ids
                .iter()
                .map(|product_id| NewSupplierOrderLine {
                    price: Money::from_units(50),
                    product_id: *product_id,
                    quantity: 3,
                })
                .collect(),
        }
    }

    fn calls(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_receipt_commits_after_every_line() {
        let tx = RecordingTx::default();
        let log = Arc::clone(&tx.calls);

        let id = write_receipt(tx, &receipt(&[1, 2])).await.unwrap();

        assert_eq!(id, 10);
        assert_eq!(
            calls(&log),
            vec!["header teller=1 total=2800", "line 10/1", "line 10/2", "commit"]
        );
    }

    #[tokio::test]
    async fn test_failing_line_rolls_back_without_commit() {
        let tx = RecordingTx {
            fail_line: Some(2),
            ..Default::default()
        };
        let log = Arc::clone(&tx.calls);

        let err = write_receipt(tx, &receipt(&[1, 99, 3])).await.unwrap_err();

        assert!(err
            .to_string()
            .starts_with("create_receipt: insert receipt line 2: Foreign key violation"));
        assert!(err.is_constraint_violation());
        assert_eq!(
            calls(&log),
            vec!["header teller=1 total=4200", "line 10/1", "line 10/99 failed", "rollback"]
        );
    }

    #[tokio::test]
    async fn test_commit_failure_is_tagged() {
        let tx = RecordingTx {
            fail_commit: true,
            ..Default::default()
        };

        let err = write_receipt(tx, &receipt(&[1])).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "create_receipt: Transaction failed: connection reset"
        );
    }

    #[tokio::test]
    async fn test_supplier_order_failing_line() {
        let tx = RecordingTx {
            fail_line: Some(3),
            ..Default::default()
        };
        let log = Arc::clone(&tx.calls);

        let err = write_supplier_order(tx, &supplier_order(&[9, 1, 404]))
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("create_supplier_order: insert supplier order line 3:"));
        assert_eq!(calls(&log).last().map(String::as_str), Some("rollback"));
        assert!(!calls(&log).iter().any(|call| call == "commit"));
    }

    #[tokio::test]
    async fn test_overflowing_total_writes_nothing() {
        let huge = Money::from_units(i64::MAX).checked_times(i32::MAX).unwrap();
        let mut order = supplier_order(&[9]);
        order.supplier_order_items[0].price = huge;
        order.supplier_order_items[0].quantity = 5;

        let tx = RecordingTx::default();
        let log = Arc::clone(&tx.calls);

        let err = write_supplier_order(tx, &order).await.unwrap_err();

        assert!(err.to_string().starts_with(
            "create_supplier_order: compute supplier order total: Amount out of range"
        ));
        assert!(matches!(err.root(), DbError::AmountOverflow(_)));
        assert_eq!(calls(&log), vec!["rollback"]);
    }
}
