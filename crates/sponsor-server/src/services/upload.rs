//! Client for the external image host that stores profile photos

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("request to image host failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("image host returned {0}")]
    Status(reqwest::StatusCode),

    #[error("image host response has no url")]
    MissingUrl,
}

#[derive(Debug, Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ImageHostClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Post the image and return the URL it is now served from
    pub async fn upload(
        &self,
        data: Bytes,
        file_name: String,
        content_type: &str,
    ) -> Result<String, UploadError> {
        debug!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            data.len(),
            self.endpoint
        );

        let part = Part::bytes(data.to_vec())
            .file_name(file_name)
            .mime_str(content_type)?;
        let mut form = Form::new().part("image", part);
        if let Some(key) = &self.api_key {
            form = form.text("key", key.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Image host returned error: {}", status);
            return Err(UploadError::Status(status));
        }

        let body: Value = response.json().await?;
        hosted_url(&body).ok_or(UploadError::MissingUrl)
    }
}

/// `data.url` as returned by imgbb-style hosts, else a top-level `url`
fn hosted_url(body: &Value) -> Option<String> {
    body.pointer("/data/url")
        .or_else(|| body.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
