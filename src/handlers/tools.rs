use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{AvailabilityQuery, BookingRequest};
use crate::services::conversation::describe_availability;
use crate::services::formatting;
use crate::state::AppState;

pub async fn availability_response(
    state: &AppState,
    query: AvailabilityQuery,
) -> Result<Value, AppError> {
    let date = formatting::canonical_date(&query.date);
    let result = state
        .gateway
        .check_availability(&date, query.persons, query.type_id)
        .await?;

    Ok(json!({
        "success": true,
        "message": describe_availability(&result),
        "data": result,
    }))
}

pub async fn booking_response(
    state: &AppState,
    mut request: BookingRequest,
) -> Result<Value, AppError> {
    request.date = request.date.as_deref().map(formatting::canonical_date);
    request.time = request.time.as_deref().map(formatting::canonical_time);

    let result = state
        .gateway
        .create_booking(&request, &state.config.booking_comment)
        .await?;

    let message = format!(
        "Your table for {} on {} at {} is booked under the name {}.",
        request.persons.unwrap_or_default(),
        request.date.as_deref().unwrap_or_default(),
        request.time.as_deref().unwrap_or_default(),
        request.name.as_deref().map(str::trim).unwrap_or_default(),
    );

    Ok(json!({
        "success": true,
        "message": message,
        "data": result,
    }))
}

// POST /api/tools/get_availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    availability_response(&state, query).await.map(Json)
}

// POST /api/tools/create_booking
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    booking_response(&state, request).await.map(Json)
}
