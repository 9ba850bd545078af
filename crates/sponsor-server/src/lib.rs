//! Sponsor Connect Server
//!
//! JSON API of the creator sponsorship marketplace mini app. Handlers are
//! backend-agnostic: they only see the [`Storage`] port chosen at startup.

pub mod config;
pub mod error;
mod extractors;
mod handlers;
pub mod services;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use sponsor_core::Storage;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use crate::config::ServerConfig;
pub use error::ApiError;
use services::{AuthService, ImageHostClient};

/// Multipart framing allowance on top of the photo itself
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: Arc<AuthService>,
    pub image_host: Option<ImageHostClient>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: &ServerConfig) -> Self {
        let image_host = config
            .image_host_url
            .as_ref()
            .map(|url| ImageHostClient::new(url.clone(), config.image_host_api_key.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                storage.clone(),
                config.admin_telegram_id.clone(),
            )),
            storage,
            image_host,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Full HTTP app: health, the JSON API and, if given, the mini app bundle
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let upload_limit = state.max_upload_bytes + UPLOAD_OVERHEAD_BYTES;

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes(upload_limit));

    if let Some(dir) = static_dir {
        // SPA fallback - unknown paths serve index.html
        app = app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        );
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn api_routes(upload_limit: usize) -> Router<AppState> {
    use handlers::{applications, auth, payment_methods, platforms, sponsorships, upload, users};

    Router::new()
        .route("/auth/telegram", post(auth::telegram))
        .route("/user/:id", get(users::get).patch(users::update))
        .route(
            "/sponsorships",
            get(sponsorships::list).post(sponsorships::create),
        )
        .route("/sponsorships/:id", patch(sponsorships::update))
        .route("/sponsorship/:id", get(sponsorships::get))
        .route("/apply", post(applications::quick_apply))
        .route("/applications", post(applications::create))
        .route("/applications/pending", get(applications::list_pending))
        .route(
            "/applications/user/:user_id",
            get(applications::list_for_user),
        )
        .route(
            "/applications/:id",
            get(applications::get).patch(applications::update),
        )
        .route("/platforms", get(platforms::list).post(platforms::create))
        .route("/platforms/pending", get(platforms::list_pending))
        .route("/platforms/user/:user_id", get(platforms::list_for_user))
        .route(
            "/platforms/:id",
            get(platforms::get).patch(platforms::update),
        )
        .route(
            "/payment-methods",
            get(payment_methods::list).post(payment_methods::create),
        )
        .route(
            "/payment-methods/user/:user_id",
            get(payment_methods::list_for_user),
        )
        .route(
            "/payment-methods/:id",
            get(payment_methods::get).patch(payment_methods::update),
        )
        .route(
            "/upload/profile-photo",
            post(upload::profile_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
}
