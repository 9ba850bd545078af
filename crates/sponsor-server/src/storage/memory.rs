//! In-memory storage using DashMap
//!
//! Nothing survives a restart. Ids come from one counter per record type.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sponsor_core::ports::{
    ApplicationStore, PaymentMethodStore, PlatformStore, SponsorshipStore, Storage, UserStore,
};
use sponsor_core::{
    Application, ApplicationPatch, ApplicationStatus, NewApplication, NewPaymentMethod,
    NewPlatformLink, NewSponsorship, NewUser, Patch, PaymentMethod, PaymentMethodPatch,
    PlatformLink, PlatformLinkPatch, Record, RecordId, Result, Sponsorship, SponsorshipPatch,
    StorageError, User, UserPatch,
};
use std::sync::atomic::{AtomicI64, Ordering};

/// Rows of one record type keyed by id
struct Table<T> {
    rows: DashMap<RecordId, T>,
    next_id: AtomicI64,
}

impl<T: Record> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> RecordId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn insert(&self, record: T) -> T {
        self.rows.insert(record.id(), record.clone());
        record
    }

    fn get(&self, id: RecordId) -> Option<T> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    /// The shard stays write-locked from read to write
    fn update<P: Patch<T>>(&self, id: RecordId, patch: P) -> Result<Option<T>> {
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Ok(None);
        };
        let merged = patch.merged(row.value())?;
        *row.value_mut() = merged.clone();
        Ok(Some(merged))
    }

    /// Matching rows in insertion (id) order
    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| predicate(row.value()))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by_key(|row| row.id());
        rows
    }
}

pub struct MemoryStorage {
    users: Table<User>,
    /// telegram id -> user id
    telegram_index: DashMap<String, RecordId>,
    sponsorships: Table<Sponsorship>,
    platforms: Table<PlatformLink>,
    applications: Table<Application>,
    payment_methods: Table<PaymentMethod>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: Table::new(),
            telegram_index: DashMap::new(),
            sponsorships: Table::new(),
            platforms: Table::new(),
            applications: Table::new(),
            payment_methods: Table::new(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>> {
        Ok(self.users.get(id))
    }

    async fn get_user_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let id = match self.telegram_index.get(telegram_id) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(id))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        // the index entry stays locked until the user row exists
        match self.telegram_index.entry(user.telegram_id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate {
                table: "users",
                key: format!("telegram_id {}", user.telegram_id),
            }),
            Entry::Vacant(slot) => {
                let id = self.users.allocate_id();
                let record = self.users.insert(user.into_record(id, Utc::now()));
                slot.insert(id);
                Ok(record)
            }
        }
    }

    async fn update_user(&self, id: RecordId, patch: UserPatch) -> Result<Option<User>> {
        self.users.update(id, patch)
    }
}

#[async_trait]
impl SponsorshipStore for MemoryStorage {
    async fn get_sponsorship(&self, id: RecordId) -> Result<Option<Sponsorship>> {
        Ok(self.sponsorships.get(id))
    }

    async fn list_active_sponsorships(&self) -> Result<Vec<Sponsorship>> {
        Ok(self.sponsorships.filter(|s| s.is_active))
    }

    async fn create_sponsorship(&self, sponsorship: NewSponsorship) -> Result<Sponsorship> {
        let id = self.sponsorships.allocate_id();
        Ok(self
            .sponsorships
            .insert(sponsorship.into_record(id, Utc::now())))
    }

    async fn update_sponsorship(
        &self,
        id: RecordId,
        patch: SponsorshipPatch,
    ) -> Result<Option<Sponsorship>> {
        self.sponsorships.update(id, patch)
    }
}

#[async_trait]
impl PlatformStore for MemoryStorage {
    async fn get_platform(&self, id: RecordId) -> Result<Option<PlatformLink>> {
        Ok(self.platforms.get(id))
    }

    async fn list_platforms(&self) -> Result<Vec<PlatformLink>> {
        Ok(self.platforms.filter(|_| true))
    }

    async fn list_user_platforms(&self, user_id: RecordId) -> Result<Vec<PlatformLink>> {
        Ok(self.platforms.filter(|p| p.user_id == user_id))
    }

    async fn list_pending_platforms(&self) -> Result<Vec<PlatformLink>> {
        Ok(self.platforms.filter(|p| !p.is_verified))
    }

    async fn create_platform(
        &self,
        platform: NewPlatformLink,
        verification_code: String,
    ) -> Result<PlatformLink> {
        let id = self.platforms.allocate_id();
        Ok(self
            .platforms
            .insert(platform.into_record(id, verification_code, Utc::now())))
    }

    async fn update_platform(
        &self,
        id: RecordId,
        patch: PlatformLinkPatch,
    ) -> Result<Option<PlatformLink>> {
        self.platforms.update(id, patch)
    }
}

#[async_trait]
impl ApplicationStore for MemoryStorage {
    async fn get_application(&self, id: RecordId) -> Result<Option<Application>> {
        Ok(self.applications.get(id))
    }

    async fn list_user_applications(&self, user_id: RecordId) -> Result<Vec<Application>> {
        Ok(self.applications.filter(|a| a.user_id == user_id))
    }

    async fn list_pending_applications(&self) -> Result<Vec<Application>> {
        Ok(self
            .applications
            .filter(|a| a.status == ApplicationStatus::Pending))
    }

    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        let id = self.applications.allocate_id();
        Ok(self
            .applications
            .insert(application.into_record(id, Utc::now())))
    }

    async fn update_application(
        &self,
        id: RecordId,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>> {
        self.applications.update(id, patch)
    }
}

#[async_trait]
impl PaymentMethodStore for MemoryStorage {
    async fn get_payment_method(&self, id: RecordId) -> Result<Option<PaymentMethod>> {
        Ok(self.payment_methods.get(id))
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        Ok(self.payment_methods.filter(|_| true))
    }

    async fn list_user_payment_methods(&self, user_id: RecordId) -> Result<Vec<PaymentMethod>> {
        Ok(self
            .payment_methods
            .filter(|m| m.user_id == user_id && m.is_active))
    }

    async fn create_payment_method(&self, method: NewPaymentMethod) -> Result<PaymentMethod> {
        let id = self.payment_methods.allocate_id();
        Ok(self
            .payment_methods
            .insert(method.into_record(id, Utc::now())))
    }

    async fn update_payment_method(
        &self,
        id: RecordId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>> {
        self.payment_methods.update(id, patch)
    }
}

impl Storage for MemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }
}
