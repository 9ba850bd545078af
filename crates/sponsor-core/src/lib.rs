//! Sponsor Core Library
//!
//! The storage port shared by every persistence backend, its error type,
//! and platform verification code generation.

// Re-export record schemas from sponsor-types
pub use sponsor_types::*;

pub mod error;
pub mod ports;
pub mod verification;

pub use error::{Result, StorageError};
pub use ports::Storage;
pub use verification::generate_verification_code;
