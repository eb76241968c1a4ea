use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::{checked_name, DeleteFlagResponse, FlagListResponse};
use crate::error::{ApiError, FlagError};
use crate::flags::{Flag, FlagPatch};
use crate::state::AppState;

/// List every flag, sorted by name
pub async fn list(State(state): State<AppState>) -> Json<FlagListResponse> {
    Json(FlagListResponse { flags: state.flags.list() })
}

/// Create a flag, or replace the one with the same name
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Flag>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(flag) = payload?;
    checked_name(&flag.name)?;

    let stored = state.flags.put(flag);

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Get a single flag by name
pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Flag>, ApiError> {
    let flag = state.flags.get(checked_name(&name)?)?;
    Ok(Json(flag))
}

/// Apply a partial update to an existing flag
pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<FlagPatch>, JsonRejection>,
) -> Result<Json<Flag>, ApiError> {
    let name = checked_name(&name)?;
    let Json(patch) = payload?;

    let flag = state.flags.patch(name, patch)?;
    Ok(Json(flag))
}

/// Delete a flag
pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteFlagResponse>, ApiError> {
    state.flags.delete(checked_name(&name)?)?;
    Ok(Json(DeleteFlagResponse { deleted: name }))
}

/// Catches `/flags/` and `/evaluate/` with no name
pub async fn missing_name() -> ApiError {
    ApiError::from(FlagError::InvalidName("flag name required".to_string()))
}
