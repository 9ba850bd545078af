//! HTTP handlers

pub mod applications;
pub mod auth;
pub mod health;
pub mod payment_methods;
pub mod platforms;
pub mod sponsorships;
pub mod upload;
pub mod users;

pub use health::health;

use crate::{ApiError, AppState};
use sponsor_core::{RecordId, User};

/// 404 unless the referenced user exists
pub(crate) async fn require_user(state: &AppState, user_id: RecordId) -> Result<User, ApiError> {
    state
        .storage
        .get_user(user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))
}
