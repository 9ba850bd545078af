//! Authentication handlers

use crate::extractors::ValidJson;
use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use sponsor_core::{TelegramAuth, User};
use tracing::info;

/// Log in with the identity the Telegram mini app supplies
pub async fn telegram(
    State(state): State<AppState>,
    ValidJson(identity): ValidJson<TelegramAuth>,
) -> Result<Json<User>, ApiError> {
    info!("Telegram login for: {}", identity.telegram_id);
    let user = state.auth.authenticate(identity).await?;
    Ok(Json(user))
}
