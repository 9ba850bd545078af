//! User handlers

use crate::extractors::{RecordPath, ValidJson};
use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use sponsor_core::{User, UserPatch};
use tracing::info;

pub async fn get(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> Result<Json<User>, ApiError> {
    state
        .storage
        .get_user(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

pub async fn update(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    ValidJson(patch): ValidJson<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .storage
        .update_user(id, patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!("Updated user {}", id);
    Ok(Json(user))
}
