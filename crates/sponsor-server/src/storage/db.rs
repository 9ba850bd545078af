//! SQLite database layer (embedded, no external dependencies)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sponsor_core::ports::{
    ApplicationStore, PaymentMethodStore, PlatformStore, SponsorshipStore, Storage, UserStore,
};
use sponsor_core::{
    Application, ApplicationPatch, NewApplication, NewPaymentMethod, NewPlatformLink,
    NewSponsorship, NewUser, Patch, PaymentMethod, PaymentMethodPatch, PlatformLink,
    PlatformLinkPatch, RecordId, Result, Sponsorship, SponsorshipPatch, StorageError, User,
    UserPatch,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStorage {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

fn corrupt(table: &'static str, e: impl std::fmt::Display) -> StorageError {
    StorageError::Corrupt {
        table,
        message: e.to_string(),
    }
}

/// Take the write lock on `table` before reading the row an update merges
/// into. A deferred transaction that reads first fails with SQLITE_BUSY
/// when it later upgrades while another writer holds the lock; starting
/// with a write makes it wait on `busy_timeout` instead.
/// Returns false if the row does not exist.
async fn lock_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: RecordId,
) -> Result<bool> {
    let result = sqlx::query(&format!("UPDATE {} SET id = id WHERE id = ?1", table))
        .bind(id)
        .execute(conn)
        .await
        .map_err(db_err)?;
    Ok(result.rows_affected() > 0)
}

impl SqliteStorage {
    pub async fn connect(database_path: &Path) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path.display());

        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        Self::with_pool(pool).await
    }

    /// Private database that lives as long as the pool; used by tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(db_err)?;
        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        tracing::info!("SQLite connection established, running migrations...");
        Self::run_migrations(&pool).await?;
        tracing::info!("Database initialization complete");
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT,
                email TEXT,
                profile_photo TEXT,
                is_admin BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sponsorships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                banner_image TEXT,
                budget_min INTEGER NOT NULL,
                budget_max INTEGER NOT NULL,
                min_followers INTEGER NOT NULL,
                category TEXT NOT NULL,
                deadline DATETIME NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS platforms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                platform_type TEXT NOT NULL,
                username TEXT NOT NULL,
                follower_count INTEGER NOT NULL,
                verification_code TEXT NOT NULL,
                is_verified BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_platforms_user ON platforms (user_id)",
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                sponsorship_id INTEGER NOT NULL,
                platform_type TEXT NOT NULL,
                platform_username TEXT NOT NULL,
                follower_count INTEGER NOT NULL,
                category TEXT NOT NULL,
                message TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at DATETIME NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_applications_user ON applications (user_id)",
            "CREATE INDEX IF NOT EXISTS idx_applications_status ON applications (status)",
            r#"
            CREATE TABLE IF NOT EXISTS payment_methods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                account_number TEXT,
                ifsc_code TEXT,
                upi_number TEXT,
                upi_id TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_payment_methods_user ON payment_methods (user_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }
}

// Column lists shared by the SELECTs below
const USER_COLUMNS: &str =
    "id, telegram_id, username, first_name, last_name, email, profile_photo, is_admin, created_at";
const SPONSORSHIP_COLUMNS: &str = "id, title, description, banner_image, budget_min, budget_max, \
    min_followers, category, deadline, is_active, created_at";
const PLATFORM_COLUMNS: &str = "id, user_id, platform_type, username, follower_count, \
    verification_code, is_verified, created_at";
const APPLICATION_COLUMNS: &str = "id, user_id, sponsorship_id, platform_type, platform_username, \
    follower_count, category, message, status, created_at";
const PAYMENT_METHOD_COLUMNS: &str = "id, user_id, type, account_number, ifsc_code, upi_number, \
    upi_id, is_active, created_at";

#[async_trait]
impl UserStore for SqliteStorage {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE telegram_id = ?1",
            USER_COLUMNS
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (telegram_id, username, first_name, last_name, email,
                               profile_photo, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.telegram_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.profile_photo)
        .bind(user.is_admin)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StorageError::Duplicate {
                table: "users",
                key: format!("telegram_id {}", user.telegram_id),
            },
            _ => db_err(e),
        })?;

        Ok(user.into_record(result.last_insert_rowid(), created_at))
    }

    async fn update_user(&self, id: RecordId, patch: UserPatch) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !lock_row(&mut tx, "users", id).await? {
            return Ok(None);
        }
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let user = patch.merged(&User::from(row))?;

        sqlx::query(
            r#"
            UPDATE users SET username = ?1, first_name = ?2, last_name = ?3, email = ?4,
                             profile_photo = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.profile_photo)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Some(user))
    }
}

#[async_trait]
impl SponsorshipStore for SqliteStorage {
    async fn get_sponsorship(&self, id: RecordId) -> Result<Option<Sponsorship>> {
        let row: Option<SponsorshipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sponsorships WHERE id = ?1",
            SPONSORSHIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Sponsorship::from))
    }

    async fn list_active_sponsorships(&self) -> Result<Vec<Sponsorship>> {
        let rows: Vec<SponsorshipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sponsorships WHERE is_active = 1 ORDER BY id",
            SPONSORSHIP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Sponsorship::from).collect())
    }

    async fn create_sponsorship(&self, sponsorship: NewSponsorship) -> Result<Sponsorship> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO sponsorships (title, description, banner_image, budget_min, budget_max,
                                      min_followers, category, deadline, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sponsorship.title)
        .bind(&sponsorship.description)
        .bind(&sponsorship.banner_image)
        .bind(sponsorship.budget_min)
        .bind(sponsorship.budget_max)
        .bind(sponsorship.min_followers)
        .bind(&sponsorship.category)
        .bind(sponsorship.deadline)
        .bind(sponsorship.is_active)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(sponsorship.into_record(result.last_insert_rowid(), created_at))
    }

    async fn update_sponsorship(
        &self,
        id: RecordId,
        patch: SponsorshipPatch,
    ) -> Result<Option<Sponsorship>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !lock_row(&mut tx, "sponsorships", id).await? {
            return Ok(None);
        }
        let row: Option<SponsorshipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sponsorships WHERE id = ?1",
            SPONSORSHIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let listing = patch.merged(&Sponsorship::from(row))?;

        sqlx::query(
            r#"
            UPDATE sponsorships
            SET title = ?1, description = ?2, banner_image = ?3, budget_min = ?4,
                budget_max = ?5, min_followers = ?6, category = ?7, deadline = ?8,
                is_active = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.banner_image)
        .bind(listing.budget_min)
        .bind(listing.budget_max)
        .bind(listing.min_followers)
        .bind(&listing.category)
        .bind(listing.deadline)
        .bind(listing.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Some(listing))
    }
}

#[async_trait]
impl PlatformStore for SqliteStorage {
    async fn get_platform(&self, id: RecordId) -> Result<Option<PlatformLink>> {
        let row: Option<PlatformRow> = sqlx::query_as(&format!(
            "SELECT {} FROM platforms WHERE id = ?1",
            PLATFORM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(PlatformLink::try_from).transpose()
    }

    async fn list_platforms(&self) -> Result<Vec<PlatformLink>> {
        let rows: Vec<PlatformRow> = sqlx::query_as(&format!(
            "SELECT {} FROM platforms ORDER BY id",
            PLATFORM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PlatformLink::try_from).collect()
    }

    async fn list_user_platforms(&self, user_id: RecordId) -> Result<Vec<PlatformLink>> {
        let rows: Vec<PlatformRow> = sqlx::query_as(&format!(
            "SELECT {} FROM platforms WHERE user_id = ?1 ORDER BY id",
            PLATFORM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PlatformLink::try_from).collect()
    }

    async fn list_pending_platforms(&self) -> Result<Vec<PlatformLink>> {
        let rows: Vec<PlatformRow> = sqlx::query_as(&format!(
            "SELECT {} FROM platforms WHERE is_verified = 0 ORDER BY id",
            PLATFORM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PlatformLink::try_from).collect()
    }

    async fn create_platform(
        &self,
        platform: NewPlatformLink,
        verification_code: String,
    ) -> Result<PlatformLink> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO platforms (user_id, platform_type, username, follower_count,
                                   verification_code, is_verified, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
        )
        .bind(platform.user_id)
        .bind(platform.platform_type.as_str())
        .bind(&platform.username)
        .bind(platform.follower_count)
        .bind(&verification_code)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(platform.into_record(result.last_insert_rowid(), verification_code, created_at))
    }

    async fn update_platform(
        &self,
        id: RecordId,
        patch: PlatformLinkPatch,
    ) -> Result<Option<PlatformLink>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !lock_row(&mut tx, "platforms", id).await? {
            return Ok(None);
        }
        let row: Option<PlatformRow> = sqlx::query_as(&format!(
            "SELECT {} FROM platforms WHERE id = ?1",
            PLATFORM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let link = patch.merged(&PlatformLink::try_from(row)?)?;

        sqlx::query(
            r#"
            UPDATE platforms
            SET platform_type = ?1, username = ?2, follower_count = ?3, is_verified = ?4
            WHERE id = ?5
            "#,
        )
        .bind(link.platform_type.as_str())
        .bind(&link.username)
        .bind(link.follower_count)
        .bind(link.is_verified)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Some(link))
    }
}

#[async_trait]
impl ApplicationStore for SqliteStorage {
    async fn get_application(&self, id: RecordId) -> Result<Option<Application>> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE id = ?1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Application::try_from).transpose()
    }

    async fn list_user_applications(&self, user_id: RecordId) -> Result<Vec<Application>> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE user_id = ?1 ORDER BY id",
            APPLICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Application::try_from).collect()
    }

    async fn list_pending_applications(&self) -> Result<Vec<Application>> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE status = 'pending' ORDER BY id",
            APPLICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Application::try_from).collect()
    }

    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        let created_at = Utc::now();
        let record = application.into_record(0, created_at);
        let result = sqlx::query(
            r#"
            INSERT INTO applications (user_id, sponsorship_id, platform_type, platform_username,
                                      follower_count, category, message, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(record.user_id)
        .bind(record.sponsorship_id)
        .bind(record.platform_type.as_str())
        .bind(&record.platform_username)
        .bind(record.follower_count)
        .bind(&record.category)
        .bind(&record.message)
        .bind(record.status.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Application {
            id: result.last_insert_rowid(),
            ..record
        })
    }

    async fn update_application(
        &self,
        id: RecordId,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !lock_row(&mut tx, "applications", id).await? {
            return Ok(None);
        }
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE id = ?1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let application = patch.merged(&Application::try_from(row)?)?;

        sqlx::query(
            r#"
            UPDATE applications
            SET platform_type = ?1, platform_username = ?2, follower_count = ?3,
                category = ?4, message = ?5, status = ?6
            WHERE id = ?7
            "#,
        )
        .bind(application.platform_type.as_str())
        .bind(&application.platform_username)
        .bind(application.follower_count)
        .bind(&application.category)
        .bind(&application.message)
        .bind(application.status.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Some(application))
    }
}

#[async_trait]
impl PaymentMethodStore for SqliteStorage {
    async fn get_payment_method(&self, id: RecordId) -> Result<Option<PaymentMethod>> {
        let row: Option<PaymentMethodRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payment_methods WHERE id = ?1",
            PAYMENT_METHOD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(PaymentMethod::try_from).transpose()
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        let rows: Vec<PaymentMethodRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payment_methods ORDER BY id",
            PAYMENT_METHOD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PaymentMethod::try_from).collect()
    }

    async fn list_user_payment_methods(&self, user_id: RecordId) -> Result<Vec<PaymentMethod>> {
        let rows: Vec<PaymentMethodRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payment_methods WHERE user_id = ?1 AND is_active = 1 ORDER BY id",
            PAYMENT_METHOD_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PaymentMethod::try_from).collect()
    }

    async fn create_payment_method(&self, method: NewPaymentMethod) -> Result<PaymentMethod> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO payment_methods (user_id, type, account_number, ifsc_code, upi_number,
                                         upi_id, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(method.user_id)
        .bind(method.kind.as_str())
        .bind(&method.account_number)
        .bind(&method.ifsc_code)
        .bind(&method.upi_number)
        .bind(&method.upi_id)
        .bind(method.is_active)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(method.into_record(result.last_insert_rowid(), created_at))
    }

    async fn update_payment_method(
        &self,
        id: RecordId,
        patch: PaymentMethodPatch,
    ) -> Result<Option<PaymentMethod>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !lock_row(&mut tx, "payment_methods", id).await? {
            return Ok(None);
        }
        let row: Option<PaymentMethodRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payment_methods WHERE id = ?1",
            PAYMENT_METHOD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let method = patch.merged(&PaymentMethod::try_from(row)?)?;

        sqlx::query(
            r#"
            UPDATE payment_methods
            SET account_number = ?1, ifsc_code = ?2, upi_number = ?3, upi_id = ?4,
                is_active = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&method.account_number)
        .bind(&method.ifsc_code)
        .bind(&method.upi_number)
        .bind(&method.upi_id)
        .bind(method.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(Some(method))
    }
}

impl Storage for SqliteStorage {
    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    telegram_id: String,
    username: String,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    profile_photo: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            telegram_id: r.telegram_id,
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            profile_photo: r.profile_photo,
            is_admin: r.is_admin,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SponsorshipRow {
    id: i64,
    title: String,
    description: String,
    banner_image: Option<String>,
    budget_min: i64,
    budget_max: i64,
    min_followers: i64,
    category: String,
    deadline: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<SponsorshipRow> for Sponsorship {
    fn from(r: SponsorshipRow) -> Self {
        Sponsorship {
            id: r.id,
            title: r.title,
            description: r.description,
            banner_image: r.banner_image,
            budget_min: r.budget_min,
            budget_max: r.budget_max,
            min_followers: r.min_followers,
            category: r.category,
            deadline: r.deadline,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlatformRow {
    id: i64,
    user_id: i64,
    platform_type: String,
    username: String,
    follower_count: i64,
    verification_code: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PlatformRow> for PlatformLink {
    type Error = StorageError;

    fn try_from(r: PlatformRow) -> Result<Self> {
        Ok(PlatformLink {
            id: r.id,
            user_id: r.user_id,
            platform_type: r
                .platform_type
                .parse()
                .map_err(|e| corrupt("platforms", e))?,
            username: r.username,
            follower_count: r.follower_count,
            verification_code: r.verification_code,
            is_verified: r.is_verified,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: i64,
    user_id: i64,
    sponsorship_id: i64,
    platform_type: String,
    platform_username: String,
    follower_count: i64,
    category: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StorageError;

    fn try_from(r: ApplicationRow) -> Result<Self> {
        Ok(Application {
            id: r.id,
            user_id: r.user_id,
            sponsorship_id: r.sponsorship_id,
            platform_type: r
                .platform_type
                .parse()
                .map_err(|e| corrupt("applications", e))?,
            platform_username: r.platform_username,
            follower_count: r.follower_count,
            category: r.category,
            message: r.message,
            status: r.status.parse().map_err(|e| corrupt("applications", e))?,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentMethodRow {
    id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    account_number: Option<String>,
    ifsc_code: Option<String>,
    upi_number: Option<String>,
    upi_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
    type Error = StorageError;

    fn try_from(r: PaymentMethodRow) -> Result<Self> {
        Ok(PaymentMethod {
            id: r.id,
            user_id: r.user_id,
            kind: r.kind.parse().map_err(|e| corrupt("payment_methods", e))?,
            account_number: r.account_number,
            ifsc_code: r.ifsc_code,
            upi_number: r.upi_number,
            upi_id: r.upi_id,
            is_active: r.is_active,
            created_at: r.created_at,
        })
    }
}
