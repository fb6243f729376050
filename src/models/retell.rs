use serde::{Deserialize, Serialize};

use super::conversation::{TranscriptTurn, TurnOutcome};
use super::de;

/// Turn event posted by the voice platform.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    #[serde(alias = "interaction_type")]
    pub event: String,
    #[serde(default)]
    pub response_id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "de::transcript")]
    pub transcript: Vec<TranscriptTurn>,
    #[serde(default)]
    pub call: Option<serde_json::Value>,
}

impl WebhookRequest {
    pub fn call_id(&self) -> Option<&str> {
        self.call.as_ref()?.get("call_id")?.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub response_id: serde_json::Value,
    pub content: String,
    pub content_complete: bool,
    pub end_call: bool,
}

impl WebhookResponse {
    pub fn new(response_id: Option<serde_json::Value>, outcome: TurnOutcome) -> Self {
        Self {
            response_id: response_id
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().into()),
            content: outcome.content,
            content_complete: true,
            end_call: outcome.end_call,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundWebhookRequest {
    pub event: String,
    pub call_inbound: InboundCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundCall {
    pub from_number: String,
    pub to_number: String,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundWebhookResponse {
    pub call_inbound: InboundOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_agent_id: Option<String>,
    pub dynamic_variables: DynamicVariables,
    pub metadata: InboundMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicVariables {
    pub caller_phone: String,
    pub restaurant_phone: String,
    pub restaurant_location: String,
    pub restaurant_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMetadata {
    pub inbound_source: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::Role;

    #[test]
    fn test_interaction_type_alias() {
        let json = r#"{"interaction_type":"response_required","response_id":3,"transcript":[{"role":"agent","content":"Hi"},{"role":"user","content":"For 2 people"}]}"#;
        let request: WebhookRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.event, "response_required");
        assert_eq!(request.transcript.len(), 2);
        assert_eq!(request.transcript[1].role, Role::User);
    }

    #[test]
    fn test_call_id_from_call_object() {
        let json = r#"{"event":"call_started","call":{"call_id":"call_42","agent_id":"a"}}"#;
        let request: WebhookRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.call_id(), Some("call_42"));

        let bare: WebhookRequest = serde_json::from_str(r#"{"event":"call_started"}"#).unwrap();
        assert_eq!(bare.call_id(), None);
    }

    #[test]
    fn test_string_transcript_is_one_user_turn() {
        let json = r#"{"event":"response_required","transcript":"For 2 people today"}"#;
        let request: WebhookRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.transcript.len(), 1);
        assert_eq!(request.transcript[0].role, Role::User);
    }

    #[test]
    fn test_response_echoes_id() {
        let response = WebhookResponse::new(Some(7.into()), TurnOutcome::acknowledge());
        assert_eq!(response.response_id, 7);
        assert!(response.content_complete);
        assert!(!response.end_call);
    }
}
