use std::env;

use crate::services::routing::InboundRoute;

pub const DEFAULT_EASYTABLE_BASE_URL: &str = "https://api.easytable.com/v2";
pub const DEFAULT_BOOKING_COMMENT: &str = "Booking made via phone assistant";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub retell_api_key: String,
    pub easytable_api_key: String,
    pub easytable_place_token: String,
    pub easytable_base_url: String,
    pub retell_default_agent_id: String,
    pub retell_danish_agent_id: String,
    pub inbound_routes: Vec<InboundRoute>,
    pub restaurant_phone: Option<String>,
    pub booking_comment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            retell_api_key: String::new(),
            easytable_api_key: String::new(),
            easytable_place_token: String::new(),
            easytable_base_url: DEFAULT_EASYTABLE_BASE_URL.to_string(),
            retell_default_agent_id: String::new(),
            retell_danish_agent_id: String::new(),
            inbound_routes: Vec::new(),
            restaurant_phone: None,
            booking_comment: DEFAULT_BOOKING_COMMENT.to_string(),
        }
    }
}

fn var(name: &str) -> String {
    env::var(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn var_or(name: &str, default: &str) -> String {
    Some(var(name))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let inbound_routes = match env::var("INBOUND_ROUTES") {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring malformed INBOUND_ROUTES");
                Vec::new()
            }),
            _ => Vec::new(),
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(3000),
            retell_api_key: var("RETELL_API_KEY"),
            easytable_api_key: var("EASYTABLE_API_KEY"),
            easytable_place_token: var("EASYTABLE_PLACE_TOKEN"),
            easytable_base_url: var_or("EASYTABLE_BASE_URL", DEFAULT_EASYTABLE_BASE_URL),
            retell_default_agent_id: var("RETELL_DEFAULT_AGENT_ID"),
            retell_danish_agent_id: var("RETELL_DANISH_AGENT_ID"),
            inbound_routes,
            restaurant_phone: Some(var("RESTAURANT_PHONE")).filter(|v| !v.is_empty()),
            booking_comment: var_or("BOOKING_COMMENT", DEFAULT_BOOKING_COMMENT),
        }
    }
}
