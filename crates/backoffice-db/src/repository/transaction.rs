//! PostgreSQL side of the transactional writer: one sqlx transaction, one
//! INSERT per row. The write sequence itself is in [`crate::writer`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use backoffice_core::{Money, NewReceipt, NewReceiptLine, NewSupplierOrder, NewSupplierOrderLine};

use crate::error::{DbError, DbResult};
use crate::writer::WriteTx;

/// An open PostgreSQL transaction used by the header + lines writes.
pub struct PgWriteTx {
    tx: Transaction<'static, Postgres>,
}

impl PgWriteTx {
    /// BEGIN on a pooled connection.
    pub async fn begin(pool: &PgPool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(PgWriteTx { tx })
    }
}

#[async_trait]
impl WriteTx for PgWriteTx {
    async fn insert_receipt_header(
        &mut self,
        receipt: &NewReceipt,
        total: Money,
    ) -> DbResult<i64> {
        let (receipt_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO Receipt (total_amount, employee_id, loyalty_card_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(total)
        .bind(receipt.teller_id)
        .bind(receipt.loyalty_card_id())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(receipt_id)
    }

    async fn insert_receipt_line(
        &mut self,
        receipt_id: i64,
        line: &NewReceiptLine,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO Receipt_Product (receipt_id, product_id, quantity, amount, price_at_purchase)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(receipt_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.amount)
        .bind(line.price)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_supplier_order_header(
        &mut self,
        order: &NewSupplierOrder,
        total: Money,
    ) -> DbResult<i64> {
        let (order_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO Supplier_Order (total_amount, supplier_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(total)
        .bind(order.supplier_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(order_id)
    }

    async fn insert_supplier_order_line(
        &mut self,
        order_id: i64,
        line: &NewSupplierOrderLine,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO Supplier_Order_Items (order_id, product_id, purchase_price, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.price)
        .bind(line.quantity)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}
