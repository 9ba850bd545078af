//! Application handlers

use super::require_user;
use crate::extractors::{RecordPath, ValidJson};
use crate::{ApiError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sponsor_core::{Application, ApplicationPatch, NewApplication, QuickApply};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct QuickApplyResponse {
    success: bool,
    application: Application,
}

/// Store a pending application after checking who applies to what
async fn submit(state: &AppState, application: NewApplication) -> Result<Application, ApiError> {
    require_user(state, application.user_id).await?;

    let listing = state
        .storage
        .get_sponsorship(application.sponsorship_id)
        .await?
        .ok_or(ApiError::NotFound("Sponsorship"))?;
    if !listing.is_active {
        return Err(ApiError::Conflict(format!(
            "Sponsorship {} is no longer accepting applications",
            listing.id
        )));
    }

    let application = state.storage.create_application(application).await?;
    info!(
        "User {} applied to sponsorship {} (application {})",
        application.user_id, application.sponsorship_id, application.id
    );
    Ok(application)
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(application): ValidJson<NewApplication>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    let application = submit(&state, application).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// One-step apply form of the mini app
pub async fn quick_apply(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<QuickApply>,
) -> Result<(StatusCode, Json<QuickApplyResponse>), ApiError> {
    let application = submit(&state, NewApplication::from(form)).await?;
    Ok((
        StatusCode::CREATED,
        Json(QuickApplyResponse {
            success: true,
            application,
        }),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> Result<Json<Application>, ApiError> {
    state
        .storage
        .get_application(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Application"))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    RecordPath(user_id): RecordPath,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(state.storage.list_user_applications(user_id).await?))
}

pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(state.storage.list_pending_applications().await?))
}

/// Review decisions are final: the store refuses to move a status out of
/// `approved` or `rejected` (409)
pub async fn update(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    ValidJson(patch): ValidJson<ApplicationPatch>,
) -> Result<Json<Application>, ApiError> {
    let application = state
        .storage
        .update_application(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Application"))?;
    info!("Updated application {} (status: {})", id, application.status);
    Ok(Json(application))
}
