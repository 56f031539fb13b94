//! Sales receipts.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use backoffice_core::{FullReceipt, NewReceipt};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /receipt`: every receipt with teller, loyalty card and lines.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<FullReceipt>>> {
    Ok(Json(state.store.full_receipts().await?))
}

/// `POST /receipt`: header and lines are stored together or not at all.
pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let receipt: NewReceipt = serde_json::from_slice(&body)?;
    let id = state.store.create_receipt(&receipt).await?;

    debug!(id, lines = receipt.products.len(), "Receipt created via API");
    Ok(StatusCode::OK)
}
