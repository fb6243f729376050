use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{GatewayError, ReservationGateway};
use crate::models::{AvailabilityResult, BookingPayload, BookingResult};

const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(10);
const BOOKING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct EasyTableCredentials {
    api_key: String,
    place_token: String,
}

impl EasyTableCredentials {
    /// `None` unless both parts are non-blank.
    pub fn from_parts(api_key: &str, place_token: &str) -> Option<Self> {
        let (api_key, place_token) = (api_key.trim(), place_token.trim());
        if api_key.is_empty() || place_token.is_empty() {
            return None;
        }
        Some(Self {
            api_key: api_key.to_string(),
            place_token: place_token.to_string(),
        })
    }
}

pub struct EasyTableGateway {
    base_url: String,
    credentials: Option<EasyTableCredentials>,
    client: reqwest::Client,
}

impl EasyTableGateway {
    pub fn new(base_url: String, credentials: Option<EasyTableCredentials>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn credentials(&self) -> Result<&EasyTableCredentials, GatewayError> {
        self.credentials
            .as_ref()
            .ok_or(GatewayError::MissingCredentials)
    }

    async fn read(response: reqwest::Response) -> Result<(u16, Value), GatewayError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        classify(status, body).map(|body| (status, body))
    }
}

/// Non-2xx statuses, and 2xx bodies carrying an `error`, are failures.
fn classify(status: u16, body: Value) -> Result<Value, GatewayError> {
    let reports_error = body.get("error").is_some_and(|e| !e.is_null());
    if (200..300).contains(&status) && !reports_error {
        Ok(body)
    } else {
        Err(GatewayError::Remote { status, body })
    }
}

fn booking_id(body: &Value) -> Option<String> {
    ["bookingID", "bookingId", "id", "booking_id"]
        .iter()
        .find_map(|key| match body.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[async_trait]
impl ReservationGateway for EasyTableGateway {
    async fn check_availability(
        &self,
        date: &str,
        persons: u32,
        type_id: Option<u32>,
    ) -> Result<AvailabilityResult, GatewayError> {
        let credentials = self.credentials()?;

        let mut query = vec![
            ("date", date.to_string()),
            ("persons", persons.to_string()),
        ];
        if let Some(type_id) = type_id {
            query.push(("typeID", type_id.to_string()));
        }

        tracing::info!(date, persons, ?type_id, "checking availability");

        let response = self
            .client
            .get(format!("{}/availability", self.base_url))
            .header("X-Api-Key", &credentials.api_key)
            .header("X-Place-Token", &credentials.place_token)
            .query(&query)
            .timeout(AVAILABILITY_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "availability request failed");
                GatewayError::Network(e.to_string())
            })?;

        let (status, body) = Self::read(response).await.inspect_err(|e| {
            tracing::warn!(status = e.status(), body = %e.body(), "availability rejected");
        })?;

        let result: AvailabilityResult = serde_json::from_value(body.clone())
            .map_err(|_| GatewayError::Remote { status, body })?;
        tracing::info!(
            day_status = result.day_status,
            online_booking = result.online_booking,
            times = result.availability_times.len(),
            "availability received"
        );
        Ok(result)
    }

    async fn submit_payload(&self, payload: &BookingPayload) -> Result<BookingResult, GatewayError> {
        let credentials = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/bookings", self.base_url))
            .header("X-Api-Key", &credentials.api_key)
            .header("X-Place-Token", &credentials.place_token)
            .json(payload)
            .timeout(BOOKING_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "booking request failed");
                GatewayError::Network(e.to_string())
            })?;

        let (status, body) = Self::read(response).await.inspect_err(|e| {
            tracing::warn!(status = e.status(), body = %e.body(), "booking rejected");
        })?;

        let booking_id = booking_id(&body);
        tracing::info!(status, ?booking_id, external_id = %payload.external_id, "booking created");

        Ok(BookingResult {
            success: true,
            status,
            booking_id,
            external_id: payload.external_id.clone(),
            data: body,
        })
    }

    fn check_credentials(&self) -> Result<(), GatewayError> {
        self.credentials().map(|_| ())
    }
}
