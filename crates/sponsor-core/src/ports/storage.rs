//! Storage traits for persistence
//!
//! Every backend assigns ids itself, stamps `createdAt` on insert and
//! merges partial updates field by field. Lookups and updates of an unknown
//! id return `Ok(None)`; lists come back in insertion order.
//!
//! An update reads, merges, runs [`Patch::check`] and writes under one lock
//! or transaction, so concurrent updates of a row are serialized and each
//! is checked against the record it actually replaces. A refused update
//! fails with `StorageError::Rejected` and writes nothing.
//!
//! [`Patch::check`]: sponsor_types::Patch::check

use crate::Result;
use async_trait::async_trait;
use sponsor_types::{
    Application, ApplicationPatch, NewApplication, NewPaymentMethod, NewPlatformLink,
    NewSponsorship, NewUser, PaymentMethod, PaymentMethodPatch, PlatformLink, PlatformLinkPatch,
    RecordId, Sponsorship, SponsorshipPatch, User, UserPatch,
};

/// User store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>>;
    async fn get_user_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>>;
    /// Fails with `StorageError::Duplicate` if the telegram id is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, id: RecordId, patch: UserPatch) -> Result<Option<User>>;
}

/// Sponsorship store
#[async_trait]
pub trait SponsorshipStore: Send + Sync {
    async fn get_sponsorship(&self, id: RecordId) -> Result<Option<Sponsorship>>;
    /// Listings with `isActive = true`
    async fn list_active_sponsorships(&self) -> Result<Vec<Sponsorship>>;
    async fn create_sponsorship(&self, sponsorship: NewSponsorship) -> Result<Sponsorship>;
    async fn update_sponsorship(
        &self,
        id: RecordId,
        patch: SponsorshipPatch,
    ) -> Result<Option<Sponsorship>>;
}

/// Platform link store
#[async_trait]
pub trait PlatformStore: Send + Sync {
    async fn get_platform(&self, id: RecordId) -> Result<Option<PlatformLink>>;
    async fn list_platforms(&self) -> Result<Vec<PlatformLink>>;
    async fn list_user_platforms(&self, user_id: RecordId) -> Result<Vec<PlatformLink>>;
    /// Links with `isVerified = false`
    async fn list_pending_platforms(&self) -> Result<Vec<PlatformLink>>;
    async fn create_platform(
        &self,
        platform: NewPlatformLink,
        verification_code: String,
    ) -> Result<PlatformLink>;
    async fn update_platform(
        &self,
        id: RecordId,
        patch: PlatformLinkPatch,
    ) -> Result<Option<PlatformLink>>;
}

/// Application store
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn get_application(&self, id: RecordId) -> Result<Option<Application>>;
    async fn list_user_applications(&self, user_id: RecordId) -> Result<Vec<Application>>;
    /// Applications with `status = pending`
    async fn list_pending_applications(&self) -> Result<Vec<Application>>;
    async fn create_application(&self, application: NewApplication) -> Result<Application>;
    async fn update_application(
        &self,
        id: RecordId,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>>;
}

/// Payment method store
#[async_trait]
pub trait PaymentMethodStore: Send + Sync {
    async fn get_payment_method(&self, id: RecordId) -> Result<Option<PaymentMethod>>;
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>>;
    /// The user's methods with `isActive = true`
    async fn list_user_payment_methods(&self, user_id: RecordId) -> Result<Vec<PaymentMethod>>;
    async fn create_payment_method(&self, method: NewPaymentMethod) -> Result<PaymentMethod>;
    async fn update_payment_method(
        &self,
        id: RecordId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>>;
}

/// The full storage contract the HTTP layer depends on
pub trait Storage:
    UserStore + SponsorshipStore + PlatformStore + ApplicationStore + PaymentMethodStore
{
    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
