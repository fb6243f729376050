pub mod easytable;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use validator::Validate;

use crate::models::{AvailabilityResult, BookingPayload, BookingRequest, BookingResult};

pub use easytable::{EasyTableCredentials, EasyTableGateway};

static VALID_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("mobile pattern is valid"));
static VALID_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").expect("time pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Missing EasyTable API credentials")]
    MissingCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("reservation API returned status {status}")]
    Remote { status: u16, body: Value },

    #[error("reservation API unreachable: {0}")]
    Network(String),
}

impl GatewayError {
    /// HTTP status to report. Network failures have no response and report 0.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::MissingCredentials | GatewayError::Validation(_) => 400,
            GatewayError::Remote { status, .. } => *status,
            GatewayError::Network(_) => 0,
        }
    }

    /// The remote error body verbatim, or the local message.
    pub fn body(&self) -> Value {
        match self {
            GatewayError::Remote { body, .. } => body.clone(),
            other => json!(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ReservationGateway: Send + Sync {
    async fn check_availability(
        &self,
        date: &str,
        persons: u32,
        type_id: Option<u32>,
    ) -> Result<AvailabilityResult, GatewayError>;

    /// Sends an already validated payload as-is.
    async fn submit_payload(&self, payload: &BookingPayload) -> Result<BookingResult, GatewayError>;

    /// Fails with [`GatewayError::MissingCredentials`] when the gateway cannot
    /// make remote calls.
    fn check_credentials(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
        default_comment: &str,
    ) -> Result<BookingResult, GatewayError> {
        self.check_credentials()?;
        let payload = prepare_booking(request, default_comment)?;
        tracing::info!(
            external_id = %payload.external_id,
            date = %payload.date,
            persons = payload.persons,
            "submitting booking"
        );
        self.submit_payload(&payload).await
    }
}

/// Idempotency key, unique per booking attempt.
pub fn new_external_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "voice-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Checks a caller-supplied booking and builds the provider payload with a
/// fresh external ID and defaults for the optional fields.
pub fn prepare_booking(
    request: &BookingRequest,
    default_comment: &str,
) -> Result<BookingPayload, GatewayError> {
    let date = present(&request.date);
    let time = present(&request.time);
    let persons = request.persons.filter(|p| *p > 0);
    let name = present(&request.name);
    let mobile = present(&request.mobile);

    let (Some(date), Some(time), Some(persons), Some(name), Some(mobile)) =
        (date, time, persons, name, mobile)
    else {
        let missing: Vec<&str> = [
            ("date", date.is_none()),
            ("time", time.is_none()),
            ("persons", persons.is_none()),
            ("name", name.is_none()),
            ("mobile", mobile.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();
        return Err(GatewayError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    let mobile: String = mobile
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    if !VALID_MOBILE.is_match(&mobile) {
        return Err(GatewayError::Validation(format!(
            "Invalid mobile number: {mobile} (expected 8-15 digits, optionally prefixed with +)"
        )));
    }
    if !VALID_TIME.is_match(time) {
        return Err(GatewayError::Validation(format!(
            "Invalid time: {time} (expected HH:MM)"
        )));
    }

    let comment = request
        .comment
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| default_comment.to_string());

    let payload = BookingPayload {
        external_id: new_external_id(),
        date: date.to_string(),
        time: Some(time.to_string()),
        persons,
        name: name.to_string(),
        mobile,
        comment,
        auto_table: request.auto_table.unwrap_or(true),
        email_notifications: request.email_notifications.unwrap_or(1),
        sms_notifications: request.sms_notifications.unwrap_or(1),
    };
    payload
        .validate()
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> BookingRequest {
        BookingRequest {
            date: Some("2025-06-20".to_string()),
            time: Some("19:00".to_string()),
            persons: Some(4),
            name: Some("  Jane Doe ".to_string()),
            mobile: Some("+45 12-34 (56) 78".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_prepare_applies_defaults() {
        let payload = prepare_booking(&complete_request(), "Booked by phone").unwrap();
        assert_eq!(payload.name, "Jane Doe");
        assert_eq!(payload.mobile, "+4512345678");
        assert_eq!(payload.comment, "Booked by phone");
        assert!(payload.auto_table);
        assert_eq!(payload.email_notifications, 1);
        assert_eq!(payload.sms_notifications, 1);
        assert!(payload.external_id.starts_with("voice-"));
    }

    #[test]
    fn test_prepare_keeps_caller_options() {
        let request = BookingRequest {
            comment: Some("Window seat".to_string()),
            auto_table: Some(false),
            sms_notifications: Some(0),
            ..complete_request()
        };
        let payload = prepare_booking(&request, "unused").unwrap();
        assert_eq!(payload.comment, "Window seat");
        assert!(!payload.auto_table);
        assert_eq!(payload.sms_notifications, 0);
    }

    #[test]
    fn test_prepare_lists_missing_fields() {
        let request = BookingRequest {
            date: Some("2025-06-20".to_string()),
            name: Some("".to_string()),
            ..Default::default()
        };
        let err = prepare_booking(&request, "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: time, persons, name, mobile"
        );
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_prepare_rejects_bad_mobile_and_time() {
        let short = BookingRequest {
            mobile: Some("12345".to_string()),
            ..complete_request()
        };
        assert!(matches!(
            prepare_booking(&short, ""),
            Err(GatewayError::Validation(_))
        ));

        let spoken_time = BookingRequest {
            time: Some("7pm".to_string()),
            ..complete_request()
        };
        assert!(matches!(
            prepare_booking(&spoken_time, ""),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_bad_notification_flag() {
        let request = BookingRequest {
            email_notifications: Some(2),
            ..complete_request()
        };
        assert!(prepare_booking(&request, "").is_err());
    }

    #[test]
    fn test_external_ids_are_unique() {
        let first = prepare_booking(&complete_request(), "").unwrap();
        let second = prepare_booking(&complete_request(), "").unwrap();
        assert_ne!(first.external_id, second.external_id);
    }

    #[test]
    fn test_error_status_and_body() {
        let remote = GatewayError::Remote {
            status: 409,
            body: json!({"error": "slot taken"}),
        };
        assert_eq!(remote.status(), 409);
        assert_eq!(remote.body()["error"], "slot taken");

        let network = GatewayError::Network("connection refused".to_string());
        assert_eq!(network.status(), 0);
        assert_eq!(
            network.body(),
            json!("reservation API unreachable: connection refused")
        );
        assert_eq!(GatewayError::MissingCredentials.status(), 400);
    }
}
