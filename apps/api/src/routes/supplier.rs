//! Suppliers and the products they have been ordered for.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;

use backoffice_core::{SupplierInfo, SupplierProduct};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /supplier/info`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SupplierInfo>>> {
    Ok(Json(state.store.list_suppliers().await?))
}

/// `GET /supplier/product/{id}`
///
/// A non-numeric id is answered like any other failure.
pub async fn products(
    State(state): State<AppState>,
    supplier_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<SupplierProduct>>> {
    let Path(supplier_id) = supplier_id?;
    Ok(Json(state.store.list_products_by_supplier(supplier_id).await?))
}
