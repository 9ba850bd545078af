//! Profile photo upload

use crate::{ApiError, AppState};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

/// Form fields the mini app has used for the photo over time
const PHOTO_FIELDS: [&str; 3] = ["photo", "file", "image"];

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::Rejected {
        status: e.status(),
        message: e.body_text(),
    }
}

/// Forward an uploaded image to the image host and return its public URL
pub async fn profile_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let Some(host) = state.image_host.as_ref() else {
        return Err(ApiError::Unavailable(
            "Image uploads are not configured".to_string(),
        ));
    };
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !field.name().is_some_and(|name| PHOTO_FIELDS.contains(&name)) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(format!(
                "Expected an image, got '{}'",
                content_type
            )));
        }
        let file_name = field.file_name().unwrap_or("profile-photo").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > state.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge(state.max_upload_bytes));
        }

        let url = host
            .upload(data, file_name, &content_type)
            .await
            .map_err(|e| {
                error!("Profile photo upload failed: {}", e);
                ApiError::Upstream(e.to_string())
            })?;
        info!("Uploaded profile photo to {}", url);
        return Ok(Json(json!({ "url": url })));
    }

    Err(ApiError::BadRequest("No photo in upload".to_string()))
}
