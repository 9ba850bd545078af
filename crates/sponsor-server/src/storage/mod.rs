//! Storage backends
//!
//! Three interchangeable implementations of the [`Storage`] port, picked by
//! `storage` in the server configuration.

pub mod db;
pub mod file;
pub mod memory;

pub use db::SqliteStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::config::{ServerConfig, StorageBackend};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sponsor_core::{NewSponsorship, Storage};
use std::sync::Arc;
use tracing::info;

/// Open the configured backend
pub async fn open(config: &ServerConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(
            FileStorage::open(&config.data_dir)
                .await
                .with_context(|| format!("opening data dir {}", config.data_dir.display()))?,
        ),
        StorageBackend::Sqlite => {
            let path = config.database_path();
            Arc::new(
                SqliteStorage::connect(&path)
                    .await
                    .with_context(|| format!("opening database {}", path.display()))?,
            )
        }
    };
    info!("Storage backend: {}", storage.backend());

    if config.seed_sample_data {
        seed_sample_data(storage.as_ref())
            .await
            .context("seeding sample listings")?;
    }

    Ok(storage)
}

/// Insert demo listings unless an active one already exists.
/// Returns how many were added.
pub async fn seed_sample_data(storage: &dyn Storage) -> sponsor_core::Result<usize> {
    if !storage.list_active_sponsorships().await?.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let samples = [
        sample(
            "FitTrack Pro - Fitness App Launch",
            "Looking for fitness influencers to promote our new workout tracking app with \
             advanced features and user-friendly interface.",
            "photo-1571019613454-1cb2f99b2d8b",
            (25000, 50000, 10000),
            "Fitness & Health",
            now + Duration::days(5),
        ),
        sample(
            "GlowUp Skincare Collection",
            "Beauty creators wanted for our new organic skincare line launch with natural \
             ingredients and cruelty-free products.",
            "photo-1596462502278-27bfdc403348",
            (15000, 30000, 5000),
            "Beauty & Fashion",
            now + Duration::days(12),
        ),
        sample(
            "TechFlow Wireless Headphones",
            "Looking for tech reviewers to showcase our premium wireless headphones with \
             advanced noise cancellation and superior sound quality.",
            "photo-1560472354-b33ff0c44a43",
            (20000, 40000, 15000),
            "Technology",
            now + Duration::days(5),
        ),
    ];

    let count = samples.len();
    for listing in samples {
        storage.create_sponsorship(listing).await?;
    }
    info!("Seeded {} sample sponsorships", count);
    Ok(count)
}

/// (budget_min, budget_max, min_followers)
type Terms = (i64, i64, i64);

fn sample(
    title: &str,
    description: &str,
    unsplash_photo: &str,
    (budget_min, budget_max, min_followers): Terms,
    category: &str,
    deadline: DateTime<Utc>,
) -> NewSponsorship {
    NewSponsorship {
        title: title.to_string(),
        description: description.to_string(),
        banner_image: Some(format!(
            "https://images.unsplash.com/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=200",
            unsplash_photo
        )),
        budget_min,
        budget_max,
        min_followers,
        category: category.to_string(),
        deadline,
        is_active: true,
    }
}
