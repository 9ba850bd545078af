//! Business logic services

pub mod auth;
pub mod upload;

pub use auth::AuthService;
pub use upload::{ImageHostClient, UploadError};
