use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::reservations::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Gateway(e) => serde_json::json!({
                "success": false,
                "status": e.status(),
                "error": e.body(),
                "message": self.to_string(),
            }),
            _ => serde_json::json!({ "success": false, "error": self.to_string() }),
        };

        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Gateway(e) => StatusCode::from_u16(e.status())
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
        };

        (status, axum::Json(body)).into_response()
    }
}
