//! Sponsor Types - record schemas for the sponsorship marketplace
//!
//! Pure data types shared by the storage port and the HTTP layer. Every
//! entity comes in three shapes: the stored record, an insert payload
//! (`New*`) and a partial-update payload (`*Patch`). Insert and patch
//! payloads reject unknown fields and carry their own [`Validate`] rules.

pub mod application;
pub mod patch;
pub mod payment;
pub mod platform;
pub mod sponsorship;
pub mod user;
pub mod validation;

pub use application::*;
pub use payment::*;
pub use platform::*;
pub use sponsorship::*;
pub use user::*;
pub use patch::PatchRejection;
pub use validation::{Validate, ValidationError};

/// Storage-assigned identifier. Always positive.
pub type RecordId = i64;

/// A stored record carrying a storage-assigned id
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;
}

/// A partial update that can be merged into a stored record.
///
/// Only the fields present in the patch are written; everything else on
/// the target is left untouched. Backends call [`Patch::merged`] while they
/// hold the row, so `check` always sees the record it replaces.
pub trait Patch<T: Clone>: Clone {
    fn apply_to(self, target: &mut T);

    /// Rules the merged record must satisfy given the stored one
    fn check(&self, _current: &T, _merged: &T) -> Result<(), PatchRejection> {
        Ok(())
    }

    /// `current` with this patch merged in, if the result passes `check`
    fn merged(self, current: &T) -> Result<T, PatchRejection> {
        let mut merged = current.clone();
        self.clone().apply_to(&mut merged);
        self.check(current, &merged)?;
        Ok(merged)
    }
}
