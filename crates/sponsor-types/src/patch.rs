//! Helpers for partial-update payloads

use crate::ValidationError;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Why a patch cannot be merged into the stored record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchRejection {
    /// The merged record breaks a field rule
    #[error("Invalid {0}")]
    Invalid(#[from] ValidationError),

    /// The stored record is in a state the patch may not move it out of
    #[error("{0}")]
    Conflict(String),
}

/// Deserialize a nullable patch field.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: a missing key stays `None`, an explicit `null`
/// becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrite `target` if the patch carries a value
pub(crate) fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
