use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::conversation::Slot;
use super::de;

pub static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]+$").expect("mobile pattern is valid"));

/// Accumulated, partially filled booking for one phone call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub persons: Option<u32>,
    #[serde(default)]
    pub comment: String,
}

impl BookingDraft {
    /// Takes every field `newer` managed to extract; fields it left unset keep
    /// their current value.
    pub fn merge(&mut self, newer: BookingDraft) {
        if newer.name.is_some() {
            self.name = newer.name;
        }
        if newer.mobile.is_some() {
            self.mobile = newer.mobile;
        }
        if newer.date.is_some() {
            self.date = newer.date;
        }
        if newer.time.is_some() {
            self.time = newer.time;
        }
        if newer.persons.is_some() {
            self.persons = newer.persons;
        }
        if !newer.comment.is_empty() {
            self.comment = newer.comment;
        }
    }

    pub fn has(&self, slot: Slot) -> bool {
        match slot {
            Slot::Persons => self.persons.is_some(),
            Slot::Date => self.date.is_some(),
            Slot::Time => self.time.is_some(),
            Slot::Name => self.name.is_some(),
            Slot::Mobile => self.mobile.is_some(),
        }
    }

    pub fn missing_slots(&self) -> Vec<Slot> {
        Slot::PRIORITY
            .into_iter()
            .filter(|slot| !self.has(*slot))
            .collect()
    }
}

/// Booking fields as supplied by a caller, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "de::optional_loose_u32")]
    pub persons: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub auto_table: Option<bool>,
    #[serde(default)]
    pub email_notifications: Option<u8>,
    #[serde(default)]
    pub sms_notifications: Option<u8>,
}

impl From<&BookingDraft> for BookingRequest {
    fn from(draft: &BookingDraft) -> Self {
        Self {
            date: draft.date.clone(),
            time: draft.time.clone(),
            persons: draft.persons,
            name: draft.name.clone(),
            mobile: draft.mobile.clone(),
            comment: Some(draft.comment.clone()).filter(|c| !c.is_empty()),
            ..Default::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_flag() -> u8 {
    1
}

/// The reservation provider's booking body. Also the shape checked by the
/// schema validation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    #[serde(rename = "externalID")]
    pub external_id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub persons: u32,
    pub name: String,
    #[validate(regex(
        path = *MOBILE_PATTERN,
        message = "must contain only digits, optionally prefixed with +"
    ))]
    pub mobile: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_true")]
    pub auto_table: bool,
    #[serde(default = "default_flag")]
    #[validate(range(max = 1, message = "must be 0 or 1"))]
    pub email_notifications: u8,
    #[serde(default = "default_flag")]
    #[validate(range(max = 1, message = "must be 0 or 1"))]
    pub sms_notifications: u8,
}

/// Outcome of a booking attempt accepted by the provider.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResult {
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub external_id: String,
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut draft = BookingDraft {
            persons: Some(4),
            date: Some("today".to_string()),
            ..Default::default()
        };
        draft.merge(BookingDraft {
            date: Some("tomorrow".to_string()),
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        });

        assert_eq!(draft.persons, Some(4));
        assert_eq!(draft.date.as_deref(), Some("tomorrow"));
        assert_eq!(draft.name.as_deref(), Some("Jane Doe"));
        assert_eq!(draft.mobile, None);
    }

    #[test]
    fn test_missing_slots_in_priority_order() {
        let draft = BookingDraft {
            date: Some("today".to_string()),
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        assert_eq!(
            draft.missing_slots(),
            vec![Slot::Persons, Slot::Time, Slot::Mobile]
        );
        assert!(BookingDraft::default().missing_slots().len() == 5);
    }

    #[test]
    fn test_request_accepts_string_persons() {
        let request: BookingRequest =
            serde_json::from_str(r#"{"date":"2025-06-20","persons":"2","autoTable":false}"#)
                .unwrap();
        assert_eq!(request.persons, Some(2));
        assert_eq!(request.auto_table, Some(false));
    }
}
