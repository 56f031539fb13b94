//! Product catalog.

use axum::extract::State;
use axum::Json;

use backoffice_core::{FullProduct, ProductInfo};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /product`
pub async fn list_full(State(state): State<AppState>) -> ApiResult<Json<Vec<FullProduct>>> {
    Ok(Json(state.store.list_full_products().await?))
}

/// `GET /product/info`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductInfo>>> {
    Ok(Json(state.store.list_products().await?))
}
