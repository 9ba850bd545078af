//! Flat-file JSON storage
//!
//! One pretty-printed JSON array per record type in the data directory,
//! read and rewritten whole on every call. A missing file reads as an empty
//! table. Writers inside this process are serialized; running two
//! processes against the same directory is not supported.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sponsor_core::ports::{
    ApplicationStore, PaymentMethodStore, PlatformStore, SponsorshipStore, Storage, UserStore,
};
use sponsor_core::{
    Application, ApplicationPatch, ApplicationStatus, NewApplication, NewPaymentMethod,
    NewPlatformLink, NewSponsorship, NewUser, Patch, PaymentMethod, PaymentMethodPatch,
    PlatformLink, PlatformLinkPatch, Record, RecordId, Result, Sponsorship, SponsorshipPatch,
    StorageError, User, UserPatch,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const USERS: &str = "users";
const SPONSORSHIPS: &str = "sponsorships";
const PLATFORMS: &str = "platforms";
const APPLICATIONS: &str = "applications";
const PAYMENT_METHODS: &str = "payment_methods";

pub struct FileStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("File storage at: {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    async fn read_table<T: DeserializeOwned>(&self, table: &'static str) -> Result<Vec<T>> {
        let path = self.path(table);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            table,
            message: e.to_string(),
        })
    }

    async fn write_table<T: Serialize>(&self, table: &'static str, rows: &[T]) -> Result<()> {
        let path = self.path(table);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(rows)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    async fn get<T>(&self, table: &'static str, id: RecordId) -> Result<Option<T>>
    where
        T: Record + DeserializeOwned,
    {
        let rows: Vec<T> = self.read_table(table).await?;
        Ok(rows.into_iter().find(|row| row.id() == id))
    }

    async fn filter<T>(&self, table: &'static str, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>>
    where
        T: Record + DeserializeOwned,
    {
        let mut rows: Vec<T> = self.read_table(table).await?;
        rows.retain(|row| predicate(row));
        rows.sort_by_key(|row| row.id());
        Ok(rows)
    }

    /// Append a row built from the next free id
    async fn insert<T>(&self, table: &'static str, build: impl FnOnce(RecordId) -> T) -> Result<T>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let _guard = self.write_lock.lock().await;
        let mut rows: Vec<T> = self.read_table(table).await?;
        let record = build(next_id(&rows));
        rows.push(record.clone());
        self.write_table(table, &rows).await?;
        Ok(record)
    }

    async fn update<T, P>(&self, table: &'static str, id: RecordId, patch: P) -> Result<Option<T>>
    where
        T: Record + Serialize + DeserializeOwned,
        P: Patch<T> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut rows: Vec<T> = self.read_table(table).await?;
        let Some(row) = rows.iter_mut().find(|row| row.id() == id) else {
            return Ok(None);
        };
        let updated = patch.merged(row)?;
        *row = updated.clone();
        self.write_table(table, &rows).await?;
        Ok(Some(updated))
    }
}

/// One past the highest id ever written, so ids are never reused
fn next_id<T: Record>(rows: &[T]) -> RecordId {
    rows.iter().map(Record::id).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserStore for FileStorage {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>> {
        self.get(USERS, id).await
    }

    async fn get_user_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.read_table(USERS).await?;
        Ok(users.into_iter().find(|u| u.telegram_id == telegram_id))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<User> = self.read_table(USERS).await?;
        if users.iter().any(|u| u.telegram_id == user.telegram_id) {
            return Err(StorageError::Duplicate {
                table: USERS,
                key: format!("telegram_id {}", user.telegram_id),
            });
        }
        let record = user.into_record(next_id(&users), Utc::now());
        users.push(record.clone());
        self.write_table(USERS, &users).await?;
        Ok(record)
    }

    async fn update_user(&self, id: RecordId, patch: UserPatch) -> Result<Option<User>> {
        self.update(USERS, id, patch).await
    }
}

#[async_trait]
impl SponsorshipStore for FileStorage {
    async fn get_sponsorship(&self, id: RecordId) -> Result<Option<Sponsorship>> {
        self.get(SPONSORSHIPS, id).await
    }

    async fn list_active_sponsorships(&self) -> Result<Vec<Sponsorship>> {
        self.filter(SPONSORSHIPS, |s: &Sponsorship| s.is_active).await
    }

    async fn create_sponsorship(&self, sponsorship: NewSponsorship) -> Result<Sponsorship> {
        self.insert(SPONSORSHIPS, |id| sponsorship.into_record(id, Utc::now()))
            .await
    }

    async fn update_sponsorship(
        &self,
        id: RecordId,
        patch: SponsorshipPatch,
    ) -> Result<Option<Sponsorship>> {
        self.update(SPONSORSHIPS, id, patch).await
    }
}

#[async_trait]
impl PlatformStore for FileStorage {
    async fn get_platform(&self, id: RecordId) -> Result<Option<PlatformLink>> {
        self.get(PLATFORMS, id).await
    }

    async fn list_platforms(&self) -> Result<Vec<PlatformLink>> {
        self.filter(PLATFORMS, |_: &PlatformLink| true).await
    }

    async fn list_user_platforms(&self, user_id: RecordId) -> Result<Vec<PlatformLink>> {
        self.filter(PLATFORMS, |p: &PlatformLink| p.user_id == user_id)
            .await
    }

    async fn list_pending_platforms(&self) -> Result<Vec<PlatformLink>> {
        self.filter(PLATFORMS, |p: &PlatformLink| !p.is_verified).await
    }

    async fn create_platform(
        &self,
        platform: NewPlatformLink,
        verification_code: String,
    ) -> Result<PlatformLink> {
        self.insert(PLATFORMS, |id| {
            platform.into_record(id, verification_code, Utc::now())
        })
        .await
    }

    async fn update_platform(
        &self,
        id: RecordId,
        patch: PlatformLinkPatch,
    ) -> Result<Option<PlatformLink>> {
        self.update(PLATFORMS, id, patch).await
    }
}

#[async_trait]
impl ApplicationStore for FileStorage {
    async fn get_application(&self, id: RecordId) -> Result<Option<Application>> {
        self.get(APPLICATIONS, id).await
    }

    async fn list_user_applications(&self, user_id: RecordId) -> Result<Vec<Application>> {
        self.filter(APPLICATIONS, |a: &Application| a.user_id == user_id)
            .await
    }

    async fn list_pending_applications(&self) -> Result<Vec<Application>> {
        self.filter(APPLICATIONS, |a: &Application| {
            a.status == ApplicationStatus::Pending
        })
        .await
    }

    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        self.insert(APPLICATIONS, |id| application.into_record(id, Utc::now()))
            .await
    }

    async fn update_application(
        &self,
        id: RecordId,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>> {
        self.update(APPLICATIONS, id, patch).await
    }
}

#[async_trait]
impl PaymentMethodStore for FileStorage {
    async fn get_payment_method(&self, id: RecordId) -> Result<Option<PaymentMethod>> {
        self.get(PAYMENT_METHODS, id).await
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        self.filter(PAYMENT_METHODS, |_: &PaymentMethod| true).await
    }

    async fn list_user_payment_methods(&self, user_id: RecordId) -> Result<Vec<PaymentMethod>> {
        self.filter(PAYMENT_METHODS, |m: &PaymentMethod| {
            m.user_id == user_id && m.is_active
        })
        .await
    }

    async fn create_payment_method(&self, method: NewPaymentMethod) -> Result<PaymentMethod> {
        self.insert(PAYMENT_METHODS, |id| method.into_record(id, Utc::now()))
            .await
    }

    async fn update_payment_method(
        &self,
        id: RecordId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>> {
        self.update(PAYMENT_METHODS, id, patch).await
    }
}

impl Storage for FileStorage {
    fn backend(&self) -> &'static str {
        "file"
    }
}
