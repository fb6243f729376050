use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::retell::{DynamicVariables, InboundMetadata, InboundOverride};
use crate::models::{InboundCall, InboundWebhookResponse};

const DANISH_PREFIX: &str = "+45";
const DANISH_LOCATION: &str = "Restaurant København";
const DEFAULT_LOCATION: &str = "Restaurant";

/// One dialled number and the agent that should answer it.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundRoute {
    pub number: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
}

fn digits(number: &str) -> String {
    number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Chooses the agent and call variables for an inbound call.
pub fn route_inbound(config: &AppConfig, call: &InboundCall) -> InboundWebhookResponse {
    let dialled = digits(&call.to_number);

    let (agent_id, location, address) = if let Some(route) = config
        .inbound_routes
        .iter()
        .find(|route| digits(&route.number) == dialled)
    {
        (
            route.agent_id.clone(),
            route.location.clone(),
            route.address.clone().unwrap_or_default(),
        )
    } else if dialled.starts_with(DANISH_PREFIX) {
        (
            non_empty(&config.retell_danish_agent_id)
                .or_else(|| non_empty(&config.retell_default_agent_id)),
            DANISH_LOCATION.to_string(),
            String::new(),
        )
    } else {
        (
            non_empty(&config.retell_default_agent_id),
            DEFAULT_LOCATION.to_string(),
            String::new(),
        )
    };

    tracing::info!(
        to = %call.to_number,
        agent_id = ?agent_id,
        location = %location,
        "routing inbound call"
    );

    InboundWebhookResponse {
        call_inbound: InboundOverride {
            override_agent_id: agent_id,
            dynamic_variables: DynamicVariables {
                caller_phone: call.from_number.clone(),
                restaurant_phone: call.to_number.clone(),
                restaurant_location: location,
                restaurant_address: address,
            },
            metadata: InboundMetadata {
                inbound_source: "phone".to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            retell_default_agent_id: "agent-default".to_string(),
            retell_danish_agent_id: "agent-dk".to_string(),
            inbound_routes: vec![InboundRoute {
                number: "+1 (415) 555-0100".to_string(),
                agent_id: Some("agent-sf".to_string()),
                location: "Restaurant San Francisco".to_string(),
                address: Some("1 Market St".to_string()),
            }],
            ..AppConfig::default()
        }
    }

    fn call(to: &str) -> InboundCall {
        InboundCall {
            from_number: "+4598765432".to_string(),
            to_number: to.to_string(),
            agent_id: None,
        }
    }

    #[test]
    fn test_configured_route_wins() {
        let response = route_inbound(&config(), &call("+14155550100"));
        let routed = response.call_inbound;
        assert_eq!(routed.override_agent_id.as_deref(), Some("agent-sf"));
        assert_eq!(routed.dynamic_variables.restaurant_location, "Restaurant San Francisco");
        assert_eq!(routed.dynamic_variables.restaurant_address, "1 Market St");
        assert_eq!(routed.dynamic_variables.caller_phone, "+4598765432");
    }

    #[test]
    fn test_danish_numbers_use_danish_agent() {
        let routed = route_inbound(&config(), &call("+4533123456")).call_inbound;
        assert_eq!(routed.override_agent_id.as_deref(), Some("agent-dk"));
        assert_eq!(routed.dynamic_variables.restaurant_location, DANISH_LOCATION);
        assert_eq!(routed.metadata.inbound_source, "phone");
    }

    #[test]
    fn test_fallback_to_default_agent() {
        let routed = route_inbound(&config(), &call("+442071234567")).call_inbound;
        assert_eq!(routed.override_agent_id.as_deref(), Some("agent-default"));
        assert_eq!(routed.dynamic_variables.restaurant_location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_no_agents_configured_omits_override() {
        let routed = route_inbound(&AppConfig::default(), &call("+4533123456")).call_inbound;
        assert_eq!(routed.override_agent_id, None);
        let json = serde_json::to_value(&routed).unwrap();
        assert!(json.get("override_agent_id").is_none());
    }
}
