//! Payout method types

use crate::patch::{merge, nullable};
use crate::validation::positive_id;
use crate::{Patch, PatchRejection, Record, RecordId, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of payout destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    Bank,
    UpiNumber,
    UpiId,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodType::Bank => "bank",
            PaymentMethodType::UpiNumber => "upi_number",
            PaymentMethodType::UpiId => "upi_id",
        }
    }
}

impl std::fmt::Display for PaymentMethodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethodType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank" => Ok(PaymentMethodType::Bank),
            "upi_number" => Ok(PaymentMethodType::UpiNumber),
            "upi_id" => Ok(PaymentMethodType::UpiId),
            other => Err(ValidationError::new(
                "type",
                format!("unknown payment method type '{}'", other),
            )),
        }
    }
}

/// A creator's payout destination. Deactivated instead of deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: RecordId,
    pub user_id: RecordId,
    #[serde(rename = "type")]
    pub kind: PaymentMethodType,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub upi_number: Option<String>,
    pub upi_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for PaymentMethod {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Validate for PaymentMethod {
    fn validate(&self) -> Result<(), ValidationError> {
        PayoutDetails {
            kind: self.kind,
            account_number: self.account_number.as_deref(),
            ifsc_code: self.ifsc_code.as_deref(),
            upi_number: self.upi_number.as_deref(),
            upi_id: self.upi_id.as_deref(),
        }
        .check()
    }
}

/// Borrowed view of the type-dependent fields
struct PayoutDetails<'a> {
    kind: PaymentMethodType,
    account_number: Option<&'a str>,
    ifsc_code: Option<&'a str>,
    upi_number: Option<&'a str>,
    upi_id: Option<&'a str>,
}

impl PayoutDetails<'_> {
    /// Exactly the fields belonging to `kind` are set, and they are well formed
    fn check(&self) -> Result<(), ValidationError> {
        let (required, forbidden) = match self.kind {
            PaymentMethodType::Bank => (
                vec![("accountNumber", self.account_number), ("ifscCode", self.ifsc_code)],
                vec![("upiNumber", self.upi_number), ("upiId", self.upi_id)],
            ),
            PaymentMethodType::UpiNumber => (
                vec![("upiNumber", self.upi_number)],
                vec![
                    ("accountNumber", self.account_number),
                    ("ifscCode", self.ifsc_code),
                    ("upiId", self.upi_id),
                ],
            ),
            PaymentMethodType::UpiId => (
                vec![("upiId", self.upi_id)],
                vec![
                    ("accountNumber", self.account_number),
                    ("ifscCode", self.ifsc_code),
                    ("upiNumber", self.upi_number),
                ],
            ),
        };

        for (field, value) in required {
            if value.map_or(true, |v| v.trim().is_empty()) {
                return Err(ValidationError::new(
                    field,
                    format!("required for {} payment methods", self.kind),
                ));
            }
        }
        for (field, value) in forbidden {
            if value.is_some() {
                return Err(ValidationError::new(
                    field,
                    format!("not allowed for {} payment methods", self.kind),
                ));
            }
        }

        if let Some(account) = self.account_number {
            if !account.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::new("accountNumber", "must contain only digits"));
            }
        }
        if let Some(ifsc) = self.ifsc_code {
            if ifsc.len() != 11 || !ifsc.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::new(
                    "ifscCode",
                    "must be 11 alphanumeric characters",
                ));
            }
        }
        if let Some(number) = self.upi_number {
            if !is_phone_number(number) {
                return Err(ValidationError::new(
                    "upiNumber",
                    "must be digits, optionally spaced and with a leading +",
                ));
            }
        }
        if let Some(id) = self.upi_id {
            match id.split_once('@') {
                Some((name, handle)) if !name.is_empty() && !handle.is_empty() => {}
                _ => return Err(ValidationError::new("upiId", "must look like name@bank")),
            }
        }
        Ok(())
    }
}

/// "9876543210", "+91 98765 43210"
fn is_phone_number(number: &str) -> bool {
    let number = number.trim();
    let digits = number.strip_prefix('+').unwrap_or(number);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

fn default_active() -> bool {
    true
}

/// Payment method insert payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPaymentMethod {
    pub user_id: RecordId,
    #[serde(rename = "type")]
    pub kind: PaymentMethodType,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub upi_number: Option<String>,
    pub upi_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewPaymentMethod {
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> PaymentMethod {
        PaymentMethod {
            id,
            user_id: self.user_id,
            kind: self.kind,
            account_number: self.account_number,
            ifsc_code: self.ifsc_code,
            upi_number: self.upi_number,
            upi_id: self.upi_id,
            is_active: self.is_active,
            created_at,
        }
    }
}

impl Validate for NewPaymentMethod {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("userId", self.user_id)?;
        PayoutDetails {
            kind: self.kind,
            account_number: self.account_number.as_deref(),
            ifsc_code: self.ifsc_code.as_deref(),
            upi_number: self.upi_number.as_deref(),
            upi_id: self.upi_id.as_deref(),
        }
        .check()
    }
}

/// Payment method partial update.
///
/// The type is fixed at creation; the merged record is validated again.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentMethodPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub account_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ifsc_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub upi_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub upi_id: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl Patch<PaymentMethod> for PaymentMethodPatch {
    fn apply_to(self, method: &mut PaymentMethod) {
        merge(&mut method.account_number, self.account_number);
        merge(&mut method.ifsc_code, self.ifsc_code);
        merge(&mut method.upi_number, self.upi_number);
        merge(&mut method.upi_id, self.upi_id);
        merge(&mut method.is_active, self.is_active);
    }

    fn check(
        &self,
        _current: &PaymentMethod,
        merged: &PaymentMethod,
    ) -> Result<(), PatchRejection> {
        Ok(merged.validate()?)
    }
}

impl Validate for PaymentMethodPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        // field rules depend on the stored type, see `PaymentMethod::validate`
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upi(user_id: RecordId, upi_id: &str) -> NewPaymentMethod {
        NewPaymentMethod {
            user_id,
            kind: PaymentMethodType::UpiId,
            account_number: None,
            ifsc_code: None,
            upi_number: None,
            upi_id: Some(upi_id.to_string()),
            is_active: true,
        }
    }

    #[test]
    fn test_type_field_wire_name() {
        let method: NewPaymentMethod = serde_json::from_str(
            r#"{"userId": 1, "type": "bank", "accountNumber": "1234567890",
                "ifscCode": "HDFC0001234"}"#,
        )
        .unwrap();
        assert_eq!(method.kind, PaymentMethodType::Bank);
        assert!(method.is_active);
        assert!(method.validate().is_ok());

        let json = serde_json::to_value(method.into_record(1, Utc::now())).unwrap();
        assert_eq!(json["type"], "bank");
        assert!(json["upiId"].is_null());
        assert!(json["upiNumber"].is_null());
    }

    #[test]
    fn test_bank_requires_both_fields() {
        let method = NewPaymentMethod {
            user_id: 1,
            kind: PaymentMethodType::Bank,
            account_number: Some("1234567890".to_string()),
            ifsc_code: None,
            upi_number: None,
            upi_id: None,
            is_active: true,
        };
        assert_eq!(method.validate().unwrap_err().field, "ifscCode");
    }

    #[test]
    fn test_fields_of_other_types_rejected() {
        let mut method = upi(1, "alice@okbank");
        assert!(method.validate().is_ok());

        method.account_number = Some("123".to_string());
        assert_eq!(method.validate().unwrap_err().field, "accountNumber");
    }

    #[test]
    fn test_upi_id_format() {
        assert_eq!(upi(1, "alice").validate().unwrap_err().field, "upiId");
        assert_eq!(upi(1, "@bank").validate().unwrap_err().field, "upiId");
    }

    #[test]
    fn test_soft_delete_patch_keeps_details() {
        let mut method = upi(1, "alice@okbank").into_record(4, Utc::now());
        let patch: PaymentMethodPatch = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        patch.apply_to(&mut method);
        assert!(!method.is_active);
        assert_eq!(method.upi_id.as_deref(), Some("alice@okbank"));
        assert!(method.validate().is_ok());
    }

    #[test]
    fn test_patch_cannot_change_type() {
        assert!(serde_json::from_str::<PaymentMethodPatch>(r#"{"type": "bank"}"#).is_err());
    }

    #[test]
    fn test_patch_that_breaks_details_fails_merged_check() {
        let method = upi(1, "alice@okbank").into_record(4, Utc::now());
        let patch: PaymentMethodPatch = serde_json::from_str(r#"{"upiId": null}"#).unwrap();
        match patch.merged(&method) {
            Err(PatchRejection::Invalid(e)) => assert_eq!(e.field, "upiId"),
            other => panic!("expected invalid upiId, got {:?}", other),
        }
    }

    #[test]
    fn test_upi_number_formats() {
        let number = |value: &str| NewPaymentMethod {
            user_id: 1,
            kind: PaymentMethodType::UpiNumber,
            account_number: None,
            ifsc_code: None,
            upi_number: Some(value.to_string()),
            upi_id: None,
            is_active: true,
        };

        assert!(number("9876543210").validate().is_ok());
        assert!(number("+91 98765 43210").validate().is_ok());
        assert!(number("98765 43210").validate().is_ok());

        for bad in ["+", "91-98765", "98+765", "call me"] {
            assert_eq!(number(bad).validate().unwrap_err().field, "upiNumber", "{}", bad);
        }
    }
}
