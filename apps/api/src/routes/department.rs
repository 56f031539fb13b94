//! Department listing.

use axum::extract::State;
use axum::Json;

use backoffice_core::{Department, DepartmentInfo};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /department/info`: id and name only.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<DepartmentInfo>>> {
    let departments = state.store.list_departments().await?;
    Ok(Json(departments.iter().map(Department::to_info).collect()))
}
