//! Employee roster, hiring, dismissal and the teller listing.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use backoffice_core::{DeleteEmployee, EmployeeInfo, NewEmployee, TellerInfo};

use crate::error::ApiResult;
use crate::AppState;

/// `GET /employee`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EmployeeInfo>>> {
    Ok(Json(state.store.list_employees().await?))
}

/// `POST /employee`
pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let employee: NewEmployee = serde_json::from_slice(&body)?;
    let id = state.store.create_employee(&employee).await?;

    debug!(id, "Employee created via API");
    Ok(StatusCode::OK)
}

/// `DELETE /employee` with body `{"employee_id": N}`
pub async fn delete(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let DeleteEmployee { id } = serde_json::from_slice(&body)?;
    state.store.delete_employee(id).await?;

    Ok(StatusCode::OK)
}

/// `GET /employee/teller/info`
pub async fn tellers(State(state): State<AppState>) -> ApiResult<Json<Vec<TellerInfo>>> {
    Ok(Json(state.store.list_tellers().await?))
}
