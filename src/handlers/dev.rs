use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::services::reservations::{EasyTableCredentials, EasyTableGateway, ReservationGateway};
use crate::services::schema;
use crate::state::AppState;

// GET /api/schema
pub async fn booking_schema() -> Json<Value> {
    Json(schema::booking_schema())
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub payload: Value,
}

// POST /api/validate
pub async fn validate(Json(request): Json<ValidateRequest>) -> Json<Value> {
    let errors = match schema::validate_payload(&request.payload) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    };
    Json(json!({
        "valid": errors.is_empty(),
        "errors": errors,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub place_token: String,
}

#[derive(Deserialize)]
pub struct TestBookingRequest {
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub credentials: Option<RequestCredentials>,
}

// POST /api/test-booking
pub async fn test_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TestBookingRequest>,
) -> Result<Response, AppError> {
    let payload = match schema::validate_payload(&request.payload) {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Payload validation failed",
                    "validationErrors": errors,
                })),
            )
                .into_response());
        }
    };

    let supplied = request
        .credentials
        .and_then(|c| EasyTableCredentials::from_parts(&c.api_key, &c.place_token));

    let result = match supplied {
        Some(credentials) => {
            tracing::info!("test booking with request-supplied credentials");
            EasyTableGateway::new(state.config.easytable_base_url.clone(), Some(credentials))
                .submit_payload(&payload)
                .await
        }
        None => {
            state.gateway.check_credentials().map_err(|_| {
                AppError::BadRequest(
                    "Missing API credentials. Provide them in the request or set environment variables."
                        .to_string(),
                )
            })?;
            state.gateway.submit_payload(&payload).await
        }
    }?;

    Ok(Json(json!({
        "success": true,
        "status": result.status,
        "data": result,
    }))
    .into_response())
}
