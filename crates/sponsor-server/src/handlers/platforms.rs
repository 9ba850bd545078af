//! Platform link handlers

use super::require_user;
use crate::extractors::{RecordPath, ValidJson};
use crate::{ApiError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use sponsor_core::{generate_verification_code, NewPlatformLink, PlatformLink, PlatformLinkPatch};
use tracing::info;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PlatformLink>>, ApiError> {
    Ok(Json(state.storage.list_platforms().await?))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    RecordPath(user_id): RecordPath,
) -> Result<Json<Vec<PlatformLink>>, ApiError> {
    Ok(Json(state.storage.list_user_platforms(user_id).await?))
}

/// Links still waiting for an admin to check the bio code
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlatformLink>>, ApiError> {
    Ok(Json(state.storage.list_pending_platforms().await?))
}

pub async fn get(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> Result<Json<PlatformLink>, ApiError> {
    state
        .storage
        .get_platform(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Platform"))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(link): ValidJson<NewPlatformLink>,
) -> Result<(StatusCode, Json<PlatformLink>), ApiError> {
    require_user(&state, link.user_id).await?;

    let link = state
        .storage
        .create_platform(link, generate_verification_code())
        .await?;
    info!(
        "Linked {} account {} for user {} (platform {})",
        link.platform_type, link.username, link.user_id, link.id
    );
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn update(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    ValidJson(patch): ValidJson<PlatformLinkPatch>,
) -> Result<Json<PlatformLink>, ApiError> {
    let link = state
        .storage
        .update_platform(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Platform"))?;
    info!("Updated platform {} (verified: {})", id, link.is_verified);
    Ok(Json(link))
}
