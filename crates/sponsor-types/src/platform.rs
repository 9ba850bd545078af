//! Social platform link types

use crate::patch::merge;
use crate::validation::{non_empty, non_negative, positive_id};
use crate::{Patch, Record, RecordId, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported social platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Youtube,
    Instagram,
    Facebook,
}

impl PlatformType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Youtube => "youtube",
            PlatformType::Instagram => "instagram",
            PlatformType::Facebook => "facebook",
        }
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(PlatformType::Youtube),
            "instagram" => Ok(PlatformType::Instagram),
            "facebook" => Ok(PlatformType::Facebook),
            other => Err(ValidationError::new(
                "platformType",
                format!("unknown platform '{}'", other),
            )),
        }
    }
}

/// A creator's claim on a social handle, pending admin verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    pub id: RecordId,
    pub user_id: RecordId,
    pub platform_type: PlatformType,
    pub username: String,
    pub follower_count: i64,
    /// Code the creator posts in their bio; generated server-side
    pub verification_code: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for PlatformLink {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Platform link insert payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPlatformLink {
    pub user_id: RecordId,
    pub platform_type: PlatformType,
    pub username: String,
    pub follower_count: i64,
}

impl NewPlatformLink {
    pub fn into_record(
        self,
        id: RecordId,
        verification_code: String,
        created_at: DateTime<Utc>,
    ) -> PlatformLink {
        PlatformLink {
            id,
            user_id: self.user_id,
            platform_type: self.platform_type,
            username: self.username,
            follower_count: self.follower_count,
            verification_code,
            is_verified: false,
            created_at,
        }
    }
}

impl Validate for NewPlatformLink {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("userId", self.user_id)?;
        non_empty("username", &self.username)?;
        non_negative("followerCount", self.follower_count)
    }
}

/// Platform link partial update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlatformLinkPatch {
    pub platform_type: Option<PlatformType>,
    pub username: Option<String>,
    pub follower_count: Option<i64>,
    pub is_verified: Option<bool>,
}

impl Patch<PlatformLink> for PlatformLinkPatch {
    fn apply_to(self, link: &mut PlatformLink) {
        merge(&mut link.platform_type, self.platform_type);
        merge(&mut link.username, self.username);
        merge(&mut link.follower_count, self.follower_count);
        merge(&mut link.is_verified, self.is_verified);
    }
}

impl Validate for PlatformLinkPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = &self.username {
            non_empty("username", username)?;
        }
        if let Some(count) = self.follower_count {
            non_negative("followerCount", count)?;
        }
        Ok(())
    }
}
