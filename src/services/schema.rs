use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::models::BookingPayload;

const REQUIRED: [&str; 5] = ["externalID", "date", "persons", "name", "mobile"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON Schema for the reservation provider's booking body.
pub fn booking_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Booking",
        "type": "object",
        "properties": {
            "externalID": {
                "type": "string",
                "description": "Idempotency key, unique per booking attempt"
            },
            "date": {
                "type": "string",
                "description": "Reservation date, YYYY-MM-DD"
            },
            "time": {
                "type": "string",
                "description": "Reservation time, HH:MM (24-hour)"
            },
            "persons": {
                "type": "integer",
                "minimum": 1,
                "description": "Number of guests"
            },
            "name": {
                "type": "string",
                "description": "Guest full name"
            },
            "mobile": {
                "type": "string",
                "pattern": "^\\+?[0-9]+$",
                "description": "Guest phone number with country code, digits only"
            },
            "comment": {
                "type": "string",
                "default": ""
            },
            "autoTable": {
                "type": "boolean",
                "default": true
            },
            "emailNotifications": {
                "type": "integer",
                "enum": [0, 1],
                "default": 1
            },
            "smsNotifications": {
                "type": "integer",
                "enum": [0, 1],
                "default": 1
            }
        },
        "required": REQUIRED
    })
}

fn json_field(field: &str) -> String {
    match field {
        "external_id" => "externalID".to_string(),
        "auto_table" => "autoTable".to_string(),
        "email_notifications" => "emailNotifications".to_string(),
        "sms_notifications" => "smsNotifications".to_string(),
        other => other.to_string(),
    }
}

/// Checks `value` against the booking schema, returning the typed payload
/// with defaults applied.
pub fn validate_payload(value: &Value) -> Result<BookingPayload, Vec<SchemaViolation>> {
    let Some(object) = value.as_object() else {
        return Err(vec![SchemaViolation::new("payload", "must be an object")]);
    };

    let missing: Vec<SchemaViolation> = REQUIRED
        .iter()
        .filter(|field| object.get(**field).map_or(true, Value::is_null))
        .map(|field| SchemaViolation::new(*field, "is required"))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let payload: BookingPayload = serde_json::from_value(value.clone())
        .map_err(|e| vec![SchemaViolation::new("payload", e.to_string())])?;

    if let Err(errors) = payload.validate() {
        let mut violations: Vec<SchemaViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = json_field(&field.to_string());
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), |m| m.to_string());
                    SchemaViolation::new(field.clone(), message)
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(violations);
    }

    Ok(payload)
}
