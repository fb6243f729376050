//! Turn-by-turn dialogue engine for phone reservations.
//!
//! Nothing is kept between webhook calls: the booking draft and the ask
//! counters are rebuilt from the transcript the voice platform sends with
//! every turn.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{
    AgentAction, AvailabilityResult, BookingDraft, BookingRequest, Role, Slot, TranscriptTurn,
    TurnOutcome,
};
use crate::services::reservations::ReservationGateway;
use crate::services::{extraction, formatting};
use crate::state::AppState;

/// Caller turns allowed before the call is handed to staff.
pub const MAX_TURNS: usize = 20;
/// Goodbye words across the whole transcript that mark a stuck closing loop.
pub const GOODBYE_LOOP_THRESHOLD: usize = 4;
/// Times one question may be asked before collection is abandoned.
pub const MAX_QUESTION_REPEATS: usize = 3;

const CLOSING_LINE: &str = "Thank you for calling. Goodbye!";
const CLOSED_DAY: &str =
    "I'm sorry, the restaurant is closed on that date. Could you try a different date?";
const NO_ONLINE_BOOKING: &str = "Online booking is not available for that date. Please call the restaurant directly to make a reservation.";
const AVAILABILITY_FAILED: &str = "I'm having trouble checking availability right now. Could you try again or call us directly?";
const BOOKING_FAILED: &str = "I'm sorry, I wasn't able to complete that booking. That time may no longer be available. Would you like me to check other available times?";

static GOODBYE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:goodbye|bye|farvel)\b").expect("goodbye pattern is valid")
});
static CLOSING_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:goodbye|bye|farvel|that['’]s all|that is all|hang up)\b")
        .expect("closing pattern is valid")
});
static AVAILABILITY_INQUIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:available|availability|what times|which times|other times|ledig)")
        .expect("availability pattern is valid")
});

/// How often each slot question already appears in the transcript.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AskCounters {
    counts: HashMap<Slot, usize>,
}

impl AskCounters {
    pub fn from_transcript(transcript: &[TranscriptTurn]) -> Self {
        let text = transcript
            .iter()
            .map(|turn| turn.content.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        let counts = Slot::PRIORITY
            .into_iter()
            .map(|slot| (slot, text.matches(slot.question_marker()).count()))
            .collect();
        Self { counts }
    }

    pub fn get(&self, slot: Slot) -> usize {
        self.counts.get(&slot).copied().unwrap_or(0)
    }

    pub fn saturated(&self, slot: Slot) -> bool {
        self.get(slot) >= MAX_QUESTION_REPEATS
    }
}

pub struct DialogueContext<'a> {
    pub gateway: &'a dyn ReservationGateway,
    /// Number offered to the caller when the call is handed to staff.
    pub handoff_phone: Option<&'a str>,
    pub booking_comment: &'a str,
    pub today: NaiveDate,
}

impl<'a> DialogueContext<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            gateway: state.gateway.as_ref(),
            handoff_phone: state.config.restaurant_phone.as_deref(),
            booking_comment: &state.config.booking_comment,
            today: formatting::today(),
        }
    }

    pub fn greeting(&self) -> TurnOutcome {
        TurnOutcome::say(
            format!(
                "Hello, thank you for calling! Today is {}. {}",
                formatting::spoken_date(self.today),
                Slot::Persons.question()
            ),
            AgentAction::Greet,
        )
    }

    pub fn acknowledge_hangup(&self) -> TurnOutcome {
        TurnOutcome::hang_up(String::new(), AgentAction::EndCall)
    }

    /// Picks the next line for a call whose transcript so far is `transcript`.
    pub async fn respond(&self, transcript: &[TranscriptTurn]) -> TurnOutcome {
        let draft = extraction::current_draft(transcript);
        let missing = draft.missing_slots();
        let counters = AskCounters::from_transcript(transcript);
        let latest = transcript
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map_or("", |turn| turn.content.as_str());

        tracing::info!(
            turns = transcript.len(),
            missing = ?missing,
            "dialogue turn"
        );

        if let Some(outcome) = self.guard(transcript, latest, &missing, &counters) {
            return outcome;
        }

        if let (true, Some(date), Some(persons)) = (
            AVAILABILITY_INQUIRY.is_match(latest),
            draft.date.as_deref(),
            draft.persons,
        ) {
            return self.check_availability(date, persons).await;
        }

        // saturated slots were handed off by the guard, so the first gap is askable
        match missing.first() {
            Some(slot) => TurnOutcome::say(slot.question(), AgentAction::Ask { slot: *slot }),
            None => self.book(&draft).await,
        }
    }

    fn guard(
        &self,
        transcript: &[TranscriptTurn],
        latest: &str,
        missing: &[Slot],
        counters: &AskCounters,
    ) -> Option<TurnOutcome> {
        let user_turns = transcript
            .iter()
            .filter(|turn| turn.role == Role::User)
            .count();
        if user_turns > MAX_TURNS {
            tracing::warn!(user_turns, "turn ceiling reached, handing off");
            return Some(self.transfer());
        }

        let goodbyes: usize = transcript
            .iter()
            .map(|turn| GOODBYE_WORD.find_iter(&turn.content).count())
            .sum();
        if goodbyes >= GOODBYE_LOOP_THRESHOLD {
            tracing::warn!(goodbyes, "goodbye loop detected");
            return Some(TurnOutcome::hang_up(CLOSING_LINE, AgentAction::EndCall));
        }

        if CLOSING_PHRASE.is_match(latest) {
            return Some(TurnOutcome::hang_up(CLOSING_LINE, AgentAction::EndCall));
        }

        if let Some(slot) = missing.iter().find(|slot| counters.saturated(**slot)) {
            tracing::warn!(slot = slot.as_str(), "question repeated too often, handing off");
            return Some(self.transfer());
        }

        None
    }

    async fn check_availability(&self, date: &str, persons: u32) -> TurnOutcome {
        let date = formatting::canonical_date_on(date, self.today);
        let content = match self.gateway.check_availability(&date, persons, None).await {
            Ok(result) => describe_availability(&result),
            Err(e) => {
                tracing::warn!(error = %e, status = e.status(), "availability check failed");
                AVAILABILITY_FAILED.to_string()
            }
        };
        TurnOutcome::say(content, AgentAction::CheckedAvailability)
    }

    async fn book(&self, draft: &BookingDraft) -> TurnOutcome {
        let mut request = BookingRequest::from(draft);
        request.date = draft
            .date
            .as_deref()
            .map(|date| formatting::canonical_date_on(date, self.today));
        request.time = draft.time.as_deref().map(formatting::canonical_time);

        match self
            .gateway
            .create_booking(&request, self.booking_comment)
            .await
        {
            Ok(result) => TurnOutcome::hang_up(
                format!(
                    "Perfect! Your table for {} on {} at {} is booked under the name {}. We look forward to seeing you. Goodbye!",
                    request.persons.unwrap_or_default(),
                    request.date.as_deref().unwrap_or_default(),
                    request.time.as_deref().unwrap_or_default(),
                    request.name.as_deref().unwrap_or_default(),
                ),
                AgentAction::Booked {
                    booking_id: result.booking_id,
                },
            ),
            Err(e) => {
                tracing::warn!(error = %e, status = e.status(), body = %e.body(), "booking failed");
                TurnOutcome::say(BOOKING_FAILED, AgentAction::BookingFailed)
            }
        }
    }

    fn transfer(&self) -> TurnOutcome {
        let content = match self.handoff_phone {
            Some(phone) => format!(
                "I'm having trouble completing your reservation automatically. Please call the restaurant directly at {phone} and our staff will be happy to help. Goodbye!"
            ),
            None => "I'm having trouble completing your reservation automatically. Please call the restaurant directly and our staff will be happy to help. Goodbye!".to_string(),
        };
        TurnOutcome::hang_up(content, AgentAction::Transfer)
    }
}

/// Spoken summary of an availability answer.
pub fn describe_availability(result: &AvailabilityResult) -> String {
    if !result.day_status {
        return CLOSED_DAY.to_string();
    }
    if !result.online_booking {
        return NO_ONLINE_BOOKING.to_string();
    }

    let spoken = formatting::speak_times(result.open_times());
    if spoken.ends_with('?') {
        spoken
    } else {
        format!("{spoken} Which time would you like?")
    }
}
