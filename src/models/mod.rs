pub mod availability;
pub mod booking;
pub mod conversation;
pub mod de;
pub mod retell;

pub use availability::{AvailabilityQuery, AvailabilityResult, AvailabilitySlot};
pub use booking::{BookingDraft, BookingPayload, BookingRequest, BookingResult};
pub use conversation::{AgentAction, Role, Slot, TranscriptTurn, TurnOutcome};
pub use retell::{
    InboundCall, InboundWebhookRequest, InboundWebhookResponse, WebhookRequest, WebhookResponse,
};
