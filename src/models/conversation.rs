use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    User,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl TranscriptTurn {
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single booking field the assistant has to collect, in asking order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Persons,
    Date,
    Time,
    Name,
    Mobile,
}

impl Slot {
    pub const PRIORITY: [Slot; 5] = [Slot::Persons, Slot::Date, Slot::Time, Slot::Name, Slot::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Persons => "party size",
            Slot::Date => "date",
            Slot::Time => "time",
            Slot::Name => "name",
            Slot::Mobile => "phone number",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Slot::Persons => "How many people will be dining with us?",
            Slot::Date => "What date would you like to make the reservation for?",
            Slot::Time => "What time would you prefer for your reservation?",
            Slot::Name => "Could I get your name, please?",
            Slot::Mobile => "And could I get your phone number for the reservation?",
        }
    }

    /// Lowercase fragment unique to [`Slot::question`]; occurrences of it in a
    /// transcript count how often the question was asked.
    pub fn question_marker(&self) -> &'static str {
        match self {
            Slot::Persons => "how many people",
            Slot::Date => "what date would you like",
            Slot::Time => "what time would you prefer",
            Slot::Name => "could i get your name",
            Slot::Mobile => "could i get your phone number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    Greet,
    Ask { slot: Slot },
    CheckedAvailability,
    Booked { booking_id: Option<String> },
    BookingFailed,
    EndCall,
    Transfer,
    Acknowledge,
}

/// What the assistant says next, and whether the platform should hang up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub content: String,
    pub end_call: bool,
    pub action: AgentAction,
}

impl TurnOutcome {
    pub fn say(content: impl Into<String>, action: AgentAction) -> Self {
        Self {
            content: content.into(),
            end_call: false,
            action,
        }
    }

    pub fn hang_up(content: impl Into<String>, action: AgentAction) -> Self {
        Self {
            content: content.into(),
            end_call: true,
            action,
        }
    }

    pub fn acknowledge() -> Self {
        Self::say(String::new(), AgentAction::Acknowledge)
    }
}
