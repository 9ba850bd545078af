//! Request extractors that reject with [`ApiError`](crate::ApiError)

pub mod record_id;
pub mod valid_json;

pub use record_id::RecordPath;
pub use valid_json::ValidJson;
