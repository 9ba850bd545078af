//! Sponsorship application types

use crate::patch::{merge, nullable};
use crate::validation::{non_empty, non_negative, positive_id};
use crate::{Patch, PatchRejection, PlatformType, Record, RecordId, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Review state of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Decisions are final: only a pending application may change status.
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        *self == next || *self == ApplicationStatus::Pending
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(ValidationError::new(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// A creator's request to be matched with a sponsorship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: RecordId,
    pub user_id: RecordId,
    pub sponsorship_id: RecordId,
    pub platform_type: PlatformType,
    pub platform_username: String,
    pub follower_count: i64,
    pub category: String,
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Application {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Application insert payload. New applications always start pending.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewApplication {
    pub user_id: RecordId,
    pub sponsorship_id: RecordId,
    pub platform_type: PlatformType,
    pub platform_username: String,
    pub follower_count: i64,
    pub category: String,
    pub message: Option<String>,
}

impl NewApplication {
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Application {
        Application {
            id,
            user_id: self.user_id,
            sponsorship_id: self.sponsorship_id,
            platform_type: self.platform_type,
            platform_username: self.platform_username,
            follower_count: self.follower_count,
            category: self.category,
            message: self.message,
            status: ApplicationStatus::Pending,
            created_at,
        }
    }
}

impl Validate for NewApplication {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("userId", self.user_id)?;
        positive_id("sponsorshipId", self.sponsorship_id)?;
        non_empty("platformUsername", &self.platform_username)?;
        non_negative("followerCount", self.follower_count)?;
        non_empty("category", &self.category)
    }
}

/// Body of the one-step apply form in the mini app
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuickApply {
    pub user_id: RecordId,
    pub sponsorship_id: RecordId,
    pub platform: PlatformType,
    pub username: String,
    pub follower_count: i64,
    pub category: String,
    pub message: Option<String>,
}

impl From<QuickApply> for NewApplication {
    fn from(form: QuickApply) -> Self {
        NewApplication {
            user_id: form.user_id,
            sponsorship_id: form.sponsorship_id,
            platform_type: form.platform,
            platform_username: form.username,
            follower_count: form.follower_count,
            category: form.category,
            // the form sends "" when left blank
            message: form.message.filter(|m| !m.trim().is_empty()),
        }
    }
}

impl Validate for QuickApply {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("userId", self.user_id)?;
        positive_id("sponsorshipId", self.sponsorship_id)?;
        non_empty("username", &self.username)?;
        non_negative("followerCount", self.follower_count)?;
        non_empty("category", &self.category)
    }
}

/// Application partial update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationPatch {
    pub platform_type: Option<PlatformType>,
    pub platform_username: Option<String>,
    pub follower_count: Option<i64>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub message: Option<Option<String>>,
    pub status: Option<ApplicationStatus>,
}

impl Patch<Application> for ApplicationPatch {
    fn apply_to(self, application: &mut Application) {
        merge(&mut application.platform_type, self.platform_type);
        merge(&mut application.platform_username, self.platform_username);
        merge(&mut application.follower_count, self.follower_count);
        merge(&mut application.category, self.category);
        merge(&mut application.message, self.message);
        merge(&mut application.status, self.status);
    }

    fn check(&self, current: &Application, merged: &Application) -> Result<(), PatchRejection> {
        if !current.status.can_transition_to(merged.status) {
            return Err(PatchRejection::Conflict(format!(
                "Application is already {}",
                current.status
            )));
        }
        Ok(())
    }
}

impl Validate for ApplicationPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = &self.platform_username {
            non_empty("platformUsername", username)?;
        }
        if let Some(count) = self.follower_count {
            non_negative("followerCount", count)?;
        }
        if let Some(category) = &self.category {
            non_empty("category", category)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Pending));
    }

    #[test]
    fn test_new_application_is_pending() {
        let app: NewApplication = serde_json::from_str(
            r#"{"userId": 1, "sponsorshipId": 2, "platformType": "instagram",
                "platformUsername": "alice", "followerCount": 8000, "category": "Beauty"}"#,
        )
        .unwrap();
        assert!(app.validate().is_ok());

        let record = app.into_record(1, Utc::now());
        assert_eq!(record.status, ApplicationStatus::Pending);
        assert_eq!(record.message, None);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["platformType"], "instagram");
    }

    #[test]
    fn test_client_cannot_create_approved_application() {
        let json = r#"{"userId": 1, "sponsorshipId": 2, "platformType": "instagram",
            "platformUsername": "alice", "followerCount": 8000, "category": "Beauty",
            "status": "approved"}"#;
        assert!(serde_json::from_str::<NewApplication>(json).is_err());
    }

    #[test]
    fn test_quick_apply_maps_form_fields() {
        let form: QuickApply = serde_json::from_str(
            r#"{"userId": 1, "sponsorshipId": 2, "platform": "youtube", "username": "bob",
                "followerCount": 1200, "category": "Tech", "message": ""}"#,
        )
        .unwrap();
        let app = NewApplication::from(form);
        assert_eq!(app.platform_type, PlatformType::Youtube);
        assert_eq!(app.platform_username, "bob");
        assert_eq!(app.message, None);
    }

    #[test]
    fn test_decided_application_rejects_new_status() {
        let mut approved = NewApplication {
            user_id: 1,
            sponsorship_id: 2,
            platform_type: PlatformType::Instagram,
            platform_username: "alice".to_string(),
            follower_count: 8000,
            category: "Beauty".to_string(),
            message: None,
        }
        .into_record(3, Utc::now());
        approved.status = ApplicationStatus::Approved;

        let reject = ApplicationPatch {
            status: Some(ApplicationStatus::Rejected),
            ..Default::default()
        };
        assert_eq!(
            reject.merged(&approved),
            Err(PatchRejection::Conflict(
                "Application is already approved".to_string()
            ))
        );

        // edits that leave the status alone still go through
        let retag = ApplicationPatch {
            category: Some("Skincare".to_string()),
            ..Default::default()
        };
        let merged = retag.merged(&approved).unwrap();
        assert_eq!(merged.status, ApplicationStatus::Approved);
        assert_eq!(merged.category, "Skincare");
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(serde_json::from_str::<ApplicationPatch>(r#"{"status": "expired"}"#).is_err());
        assert!("expired".parse::<ApplicationStatus>().is_err());
    }
}
