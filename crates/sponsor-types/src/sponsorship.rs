//! Sponsorship listing types

use crate::patch::{merge, nullable};
use crate::validation::{non_empty, non_negative};
use crate::{Patch, PatchRejection, Record, RecordId, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A brand's sponsorship listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub banner_image: Option<String>,
    pub budget_min: i64,
    pub budget_max: i64,
    pub min_followers: i64,
    pub category: String,
    pub deadline: DateTime<Utc>,
    /// Only active listings show up in general browsing
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Sponsorship {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Validate for Sponsorship {
    fn validate(&self) -> Result<(), ValidationError> {
        ListingTerms {
            title: &self.title,
            description: &self.description,
            category: &self.category,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            min_followers: self.min_followers,
        }
        .check()
    }
}

/// Borrowed view of the fields every listing must keep valid
struct ListingTerms<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    budget_min: i64,
    budget_max: i64,
    min_followers: i64,
}

impl ListingTerms<'_> {
    fn check(&self) -> Result<(), ValidationError> {
        non_empty("title", self.title)?;
        non_empty("description", self.description)?;
        non_empty("category", self.category)?;
        budget(self.budget_min, self.budget_max)?;
        non_negative("minFollowers", self.min_followers)
    }
}

fn budget(min: i64, max: i64) -> Result<(), ValidationError> {
    non_negative("budgetMin", min)?;
    if min > max {
        return Err(ValidationError::new(
            "budgetMax",
            "must be greater than or equal to budgetMin",
        ));
    }
    Ok(())
}

fn default_active() -> bool {
    true
}

/// Sponsorship insert payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSponsorship {
    pub title: String,
    pub description: String,
    pub banner_image: Option<String>,
    pub budget_min: i64,
    pub budget_max: i64,
    pub min_followers: i64,
    pub category: String,
    pub deadline: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewSponsorship {
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Sponsorship {
        Sponsorship {
            id,
            title: self.title,
            description: self.description,
            banner_image: self.banner_image,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            min_followers: self.min_followers,
            category: self.category,
            deadline: self.deadline,
            is_active: self.is_active,
            created_at,
        }
    }
}

impl Validate for NewSponsorship {
    fn validate(&self) -> Result<(), ValidationError> {
        ListingTerms {
            title: &self.title,
            description: &self.description,
            category: &self.category,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            min_followers: self.min_followers,
        }
        .check()
    }
}

/// Sponsorship partial update.
///
/// `validate` covers the fields it carries; the budget range is checked
/// again on the merged record since a patch may carry just one side of it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SponsorshipPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub banner_image: Option<Option<String>>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub min_followers: Option<i64>,
    pub category: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl Patch<Sponsorship> for SponsorshipPatch {
    fn apply_to(self, listing: &mut Sponsorship) {
        merge(&mut listing.title, self.title);
        merge(&mut listing.description, self.description);
        merge(&mut listing.banner_image, self.banner_image);
        merge(&mut listing.budget_min, self.budget_min);
        merge(&mut listing.budget_max, self.budget_max);
        merge(&mut listing.min_followers, self.min_followers);
        merge(&mut listing.category, self.category);
        merge(&mut listing.deadline, self.deadline);
        merge(&mut listing.is_active, self.is_active);
    }

    fn check(
        &self,
        _current: &Sponsorship,
        merged: &Sponsorship,
    ) -> Result<(), PatchRejection> {
        Ok(merged.validate()?)
    }
}

impl Validate for SponsorshipPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            non_empty("title", title)?;
        }
        if let Some(description) = &self.description {
            non_empty("description", description)?;
        }
        if let Some(category) = &self.category {
            non_empty("category", category)?;
        }
        if let Some(min) = self.budget_min {
            non_negative("budgetMin", min)?;
        }
        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            budget(min, max)?;
        }
        if let Some(min_followers) = self.min_followers {
            non_negative("minFollowers", min_followers)?;
        }
        Ok(())
    }
}
