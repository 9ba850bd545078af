//! Path id extractor

use crate::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use sponsor_core::RecordId;

/// The single `:id`-style path parameter of a route, checked to be positive
#[derive(Debug, Clone, Copy)]
pub struct RecordPath(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for RecordPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<RecordId>::from_request_parts(parts, state).await?;
        if id <= 0 {
            return Err(ApiError::BadRequest(format!("Invalid id: {}", id)));
        }
        Ok(Self(id))
    }
}
