//! # Catalog Repository
//!
//! Read-only listings of products, suppliers and departments.

use sqlx::PgPool;
use tracing::debug;

use backoffice_core::{Department, FullProduct, ProductInfo, SupplierInfo, SupplierProduct};

use crate::error::{DbResult, OperationExt};
use crate::rows::{DepartmentRow, FullProductRow, NamedRow, ProductInfoRow};

/// Repository for catalog reads.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: PgPool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn list_products(&self) -> DbResult<Vec<ProductInfo>> {
        let rows: Vec<ProductInfoRow> = sqlx::query_as(
            r#"
            SELECT id, name, quantity_in_stock, price
            FROM Product
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("list_products")?;

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(ProductInfo::from).collect())
    }

    /// Products joined with the department that stocks them.
    pub async fn list_full_products(&self) -> DbResult<Vec<FullProduct>> {
        let rows: Vec<FullProductRow> = sqlx::query_as(
            r#"
            SELECT
                p.name,
                p.price,
                p.quantity_in_stock,
                p.category,
                d.name AS department_name
            FROM Product AS p
            JOIN Department AS d ON d.id = p.department_id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("list_full_products")?;

        debug!(count = rows.len(), "Listed full products");
        Ok(rows.into_iter().map(FullProduct::from).collect())
    }

    pub async fn list_suppliers(&self) -> DbResult<Vec<SupplierInfo>> {
        let rows: Vec<NamedRow> = sqlx::query_as("SELECT id, name FROM Supplier ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .operation("list_suppliers")?;

        debug!(count = rows.len(), "Listed suppliers");
        Ok(rows.into_iter().map(SupplierInfo::from).collect())
    }

    pub async fn list_departments(&self) -> DbResult<Vec<Department>> {
        let rows: Vec<DepartmentRow> = sqlx::query_as(
            r#"
            SELECT id, name, location, employee_count
            FROM Department
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .operation("list_departments")?;

        debug!(count = rows.len(), "Listed departments");
        Ok(rows.into_iter().map(Department::from).collect())
    }

    /// Distinct products that appear on any order placed with `supplier_id`.
    ///
    /// An unknown supplier yields an empty list.
    pub async fn list_products_by_supplier(
        &self,
        supplier_id: i64,
    ) -> DbResult<Vec<SupplierProduct>> {
        let rows: Vec<NamedRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT p.id, p.name
            FROM Product AS p
            JOIN Supplier_Order_Items AS soi ON soi.product_id = p.id
            JOIN Supplier_Order AS so ON so.id = soi.order_id
            WHERE so.supplier_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await
        .operation("list_products_by_supplier")?;

        debug!(supplier_id, count = rows.len(), "Listed supplier products");
        Ok(rows.into_iter().map(SupplierProduct::from).collect())
    }
}
