//! User types

use crate::patch::{merge, nullable};
use crate::validation::{email, non_empty};
use crate::{Patch, Record, RecordId, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace account, one per Telegram identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    /// Unique and immutable once stored
    pub telegram_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// User insert payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub telegram_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> User {
        User {
            id,
            telegram_id: self.telegram_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            profile_photo: self.profile_photo,
            is_admin: self.is_admin,
            created_at,
        }
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("telegramId", &self.telegram_id)?;
        non_empty("username", &self.username)?;
        non_empty("firstName", &self.first_name)?;
        if let Some(address) = &self.email {
            email("email", address)?;
        }
        Ok(())
    }
}

/// User partial update.
///
/// `telegramId` and `isAdmin` are fixed at creation and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub profile_photo: Option<Option<String>>,
}

impl Patch<User> for UserPatch {
    fn apply_to(self, user: &mut User) {
        merge(&mut user.username, self.username);
        merge(&mut user.first_name, self.first_name);
        merge(&mut user.last_name, self.last_name);
        merge(&mut user.email, self.email);
        merge(&mut user.profile_photo, self.profile_photo);
    }
}

impl Validate for UserPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = &self.username {
            non_empty("username", username)?;
        }
        if let Some(first_name) = &self.first_name {
            non_empty("firstName", first_name)?;
        }
        if let Some(Some(address)) = &self.email {
            email("email", address)?;
        }
        Ok(())
    }
}

/// Identity handed over by the Telegram mini app on launch
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TelegramAuth {
    pub telegram_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
}

impl TelegramAuth {
    pub fn into_new_user(self, is_admin: bool) -> NewUser {
        NewUser {
            telegram_id: self.telegram_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: None,
            profile_photo: self.profile_photo,
            is_admin,
        }
    }
}

impl Validate for TelegramAuth {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("telegramId", &self.telegram_id)?;
        non_empty("username", &self.username)?;
        non_empty("firstName", &self.first_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        NewUser {
            telegram_id: "111".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: Some("Liddell".to_string()),
            email: None,
            profile_photo: None,
            is_admin: false,
        }
        .into_record(1, Utc::now())
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["telegramId"], "111");
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["isAdmin"], false);
        assert!(json["email"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut user = sample_user();
        let before = user.clone();

        let patch: UserPatch = serde_json::from_str(r#"{"username": "alice2"}"#).unwrap();
        patch.apply_to(&mut user);

        assert_eq!(user.username, "alice2");
        assert_eq!(user.first_name, before.first_name);
        assert_eq!(user.last_name, before.last_name);
        assert_eq!(user.created_at, before.created_at);
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let mut user = sample_user();
        let patch: UserPatch = serde_json::from_str(r#"{"lastName": null}"#).unwrap();
        patch.apply_to(&mut user);
        assert_eq!(user.last_name, None);
    }

    #[test]
    fn test_patch_rejects_immutable_fields() {
        assert!(serde_json::from_str::<UserPatch>(r#"{"telegramId": "222"}"#).is_err());
        assert!(serde_json::from_str::<UserPatch>(r#"{"isAdmin": true}"#).is_err());
    }

    #[test]
    fn test_telegram_auth_accepts_null_optionals() {
        let auth: TelegramAuth = serde_json::from_str(
            r#"{"telegramId": "111", "username": "alice", "firstName": "Alice",
                "lastName": null, "profilePhoto": null}"#,
        )
        .unwrap();
        assert!(auth.validate().is_ok());

        let user = auth.into_new_user(true);
        assert!(user.is_admin);
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_new_user_validation() {
        let mut user = NewUser {
            telegram_id: "".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: None,
            email: None,
            profile_photo: None,
            is_admin: false,
        };
        assert_eq!(user.validate().unwrap_err().field, "telegramId");

        user.telegram_id = "111".to_string();
        user.email = Some("not-an-email".to_string());
        assert_eq!(user.validate().unwrap_err().field, "email");

        user.email = Some("alice@example.com".to_string());
        assert!(user.validate().is_ok());
    }
}
