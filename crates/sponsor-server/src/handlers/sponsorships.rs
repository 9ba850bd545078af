//! Sponsorship listing handlers

use crate::extractors::{RecordPath, ValidJson};
use crate::{ApiError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use sponsor_core::{NewSponsorship, Sponsorship, SponsorshipPatch};
use tracing::{debug, info};

/// Active listings only
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Sponsorship>>, ApiError> {
    let listings = state.storage.list_active_sponsorships().await?;
    debug!("Listing {} active sponsorships", listings.len());
    Ok(Json(listings))
}

/// Any listing by id, including closed ones
pub async fn get(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> Result<Json<Sponsorship>, ApiError> {
    state
        .storage
        .get_sponsorship(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Sponsorship"))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(listing): ValidJson<NewSponsorship>,
) -> Result<(StatusCode, Json<Sponsorship>), ApiError> {
    let listing = state.storage.create_sponsorship(listing).await?;
    info!("Created sponsorship {}: {}", listing.id, listing.title);
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Budget bounds are checked by the store against the merged record, so a
/// patch that only moves one bound cannot invert them.
pub async fn update(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    ValidJson(patch): ValidJson<SponsorshipPatch>,
) -> Result<Json<Sponsorship>, ApiError> {
    let listing = state
        .storage
        .update_sponsorship(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Sponsorship"))?;
    info!("Updated sponsorship {} (active: {})", id, listing.is_active);
    Ok(Json(listing))
}
