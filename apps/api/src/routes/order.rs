//! Supplier orders.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use backoffice_core::{FullSupplierOrder, NewSupplierOrder};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /order`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<FullSupplierOrder>>> {
    Ok(Json(state.store.full_supplier_orders().await?))
}

/// `POST /order`
pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let order: NewSupplierOrder = serde_json::from_slice(&body)?;
    let id = state.store.create_supplier_order(&order).await?;

    debug!(id, supplier_id = order.supplier_id, "Supplier order created via API");
    Ok(StatusCode::OK)
}
