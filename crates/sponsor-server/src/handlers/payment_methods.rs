//! Payout method handlers

use super::require_user;
use crate::extractors::{RecordPath, ValidJson};
use crate::{ApiError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use sponsor_core::{NewPaymentMethod, PaymentMethod, PaymentMethodPatch};
use tracing::info;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    Ok(Json(state.storage.list_payment_methods().await?))
}

/// Active methods of one user
pub async fn list_for_user(
    State(state): State<AppState>,
    RecordPath(user_id): RecordPath,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    Ok(Json(state.storage.list_user_payment_methods(user_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
) -> Result<Json<PaymentMethod>, ApiError> {
    state
        .storage
        .get_payment_method(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Payment method"))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(method): ValidJson<NewPaymentMethod>,
) -> Result<(StatusCode, Json<PaymentMethod>), ApiError> {
    require_user(&state, method.user_id).await?;

    let method = state.storage.create_payment_method(method).await?;
    info!(
        "Added {} payment method {} for user {}",
        method.kind, method.id, method.user_id
    );
    Ok((StatusCode::CREATED, Json(method)))
}

/// The store rejects a merge that leaves the method without exactly the
/// fields its type needs
pub async fn update(
    State(state): State<AppState>,
    RecordPath(id): RecordPath,
    ValidJson(patch): ValidJson<PaymentMethodPatch>,
) -> Result<Json<PaymentMethod>, ApiError> {
    let method = state
        .storage
        .update_payment_method(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Payment method"))?;
    info!("Updated payment method {} (active: {})", id, method.is_active);
    Ok(Json(method))
}
