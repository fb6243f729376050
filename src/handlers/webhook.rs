use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;

use crate::errors::AppError;
use crate::models::{
    AvailabilityQuery, BookingRequest, InboundWebhookRequest, InboundWebhookResponse,
    TurnOutcome, WebhookRequest, WebhookResponse,
};
use crate::services::conversation::DialogueContext;
use crate::services::routing;
use crate::state::AppState;

use super::tools;

const SIGNATURE_HEADER: &str = "x-retell-signature";

/// Checks a `sha256=<hex>` HMAC of `body` in constant time.
pub fn signature_matches(secret: &str, body: &[u8], header: &str) -> bool {
    let header = header.trim();
    let hex_digest = header.strip_prefix("sha256=").unwrap_or(header);
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Skipped when no API key is configured (dev mode).
fn verify_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
    if secret.is_empty() {
        return Ok(());
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if signature.is_empty() {
        tracing::warn!("missing Retell signature header");
        return Err(AppError::Unauthorized("Missing Retell signature".to_string()));
    }
    if !signature_matches(secret, body, signature) {
        tracing::warn!("invalid Retell signature");
        return Err(AppError::Unauthorized("Invalid Retell signature".to_string()));
    }
    Ok(())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
}

// POST /api/retell/webhook
pub async fn retell_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    verify_signature(&state.config.retell_api_key, &headers, &body)?;
    let request: WebhookRequest = parse(&body)?;

    tracing::info!(
        event = %request.event,
        call_id = request.call_id().unwrap_or("-"),
        turns = request.transcript.len(),
        "voice webhook"
    );

    let dialogue = DialogueContext::from_state(&state);
    let outcome = match request.event.as_str() {
        "call_started" => dialogue.greeting(),
        "call_ended" => dialogue.acknowledge_hangup(),
        "response_required" | "reminder_required" => dialogue.respond(&request.transcript).await,
        other => {
            tracing::debug!(event = other, "acknowledging unhandled event");
            TurnOutcome::acknowledge()
        }
    };

    tracing::info!(action = ?outcome.action, end_call = outcome.end_call, "voice reply");
    Ok(Json(WebhookResponse::new(request.response_id, outcome)))
}

/// Function-call arguments arrive nested under `args`, as a JSON string or
/// object under `arguments`, or flat beside `name`.
pub fn normalize_arguments(body: &Value) -> Result<Value, AppError> {
    if let Some(args) = body.get("args").filter(|args| args.is_object()) {
        return Ok(args.clone());
    }

    match body.get("arguments") {
        Some(Value::String(raw)) => {
            return serde_json::from_str(raw)
                .map_err(|e| AppError::BadRequest(format!("invalid function arguments: {e}")));
        }
        Some(args @ Value::Object(_)) => return Ok(args.clone()),
        _ => {}
    }

    let mut flat = body.as_object().cloned().unwrap_or_default();
    for key in ["name", "call", "args", "arguments"] {
        flat.remove(key);
    }
    Ok(Value::Object(flat))
}

fn arguments<T: DeserializeOwned>(args: Value) -> Result<T, AppError> {
    serde_json::from_value(args)
        .map_err(|e| AppError::BadRequest(format!("invalid function arguments: {e}")))
}

// POST /api/retell/function-call
pub async fn function_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    verify_signature(&state.config.retell_api_key, &headers, &body)?;
    let body: Value = parse(&body)?;

    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("Missing function name".to_string()))?;
    let args = normalize_arguments(&body)?;

    tracing::info!(function = name, "function call");

    let response = match name {
        "get_availability" => {
            let query: AvailabilityQuery = arguments(args)?;
            tools::availability_response(&state, query).await?
        }
        "create_booking" => {
            let request: BookingRequest = arguments(args)?;
            tools::booking_response(&state, request).await?
        }
        other => return Err(AppError::BadRequest(format!("Unknown function: {other}"))),
    };
    Ok(Json(response))
}

// POST /api/retell/inbound-webhook
pub async fn inbound_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InboundWebhookResponse>, AppError> {
    verify_signature(&state.config.retell_api_key, &headers, &body)?;
    let request: InboundWebhookRequest = parse(&body)?;

    if request.event != "call_inbound" {
        return Err(AppError::BadRequest(format!(
            "Unsupported inbound event: {}",
            request.event
        )));
    }

    Ok(Json(routing::route_inbound(
        &state.config,
        &request.call_inbound,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_signature_roundtrip() {
        let body = br#"{"event":"call_started"}"#;
        let header = sign("secret", body);
        assert!(signature_matches("secret", body, &header));
        assert!(!signature_matches("other", body, &header));
        assert!(!signature_matches("secret", b"{}", &header));
        assert!(!signature_matches("secret", body, "sha256=not-hex"));
    }

    #[test]
    fn test_signature_check_skipped_without_key() {
        assert!(verify_signature("", &HeaderMap::new(), b"{}").is_ok());
        assert!(matches!(
            verify_signature("secret", &HeaderMap::new(), b"{}"),
            Err(AppError::Unauthorized(msg)) if msg == "Missing Retell signature"
        ));
    }

    #[test]
    fn test_arguments_nested_under_args() {
        let body = json!({"name": "get_availability", "args": {"date": "2025-06-20", "persons": 2}});
        assert_eq!(
            normalize_arguments(&body).unwrap(),
            json!({"date": "2025-06-20", "persons": 2})
        );
    }

    #[test]
    fn test_arguments_as_json_string() {
        let body = json!({"name": "get_availability", "arguments": "{\"date\":\"2025-06-20\",\"persons\":\"2\"}"});
        assert_eq!(
            normalize_arguments(&body).unwrap(),
            json!({"date": "2025-06-20", "persons": "2"})
        );
        assert!(normalize_arguments(&json!({"arguments": "{not json"})).is_err());
    }

    #[test]
    fn test_arguments_flat() {
        let body = json!({"name": "create_booking", "call": {"call_id": "c1"}, "date": "2025-06-20", "persons": 2});
        assert_eq!(
            normalize_arguments(&body).unwrap(),
            json!({"date": "2025-06-20", "persons": 2})
        );
    }
}
