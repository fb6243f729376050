//! Best-effort slot extraction from free-text transcripts.
//!
//! Each field has an ordered list of patterns. Patterns are tried in order and
//! only the first match of each is considered; the first match that passes the
//! field's acceptance check wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BookingDraft, Role, TranscriptTurn};
use crate::services::numbers;

/// Country code assumed for bare 8-digit numbers.
pub const DEFAULT_COUNTRY_PREFIX: &str = "+45";

const MIN_PERSONS: u32 = 1;
const MAX_PERSONS: u32 = 20;

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source).expect("built-in extraction pattern is valid"))
        .collect()
}

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"(?i)(?:name is|i'm|my name is|this is|i am|call me)\s+([a-zA-Z\s]{2,30})(?:\s|$|\.|,|!|\?)",
        r"^([A-Z][a-z]+\s+[A-Z][a-z]+)(?:\s|$|\.|,)",
        r"\b([A-Z][a-z]+\s+[A-Z][a-z]+)\b",
    ])
});

static NAME_STOPWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:phone|number|mobile|reservation|table|people|person|guest|today|tomorrow|time|at|for|and|my|is|the|yes|no|sure|okay|great|perfect)\b",
    )
    .expect("built-in stopword pattern is valid")
});

static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        // digits read out one at a time after normalisation: "45 1 2 3 4 5 6"
        r"(?i)(?:phone|number|mobile|mobilnummer|telefonnummer|call me at|reach me at)\s*(?:is|er|at)?\s*([0-9]+(?:\s+[0-9]){6,9}\w*)",
        r"(?i)(?:phone|number|mobile|mobilnummer|telefonnummer|call me at|reach me at)\s*(?:is|er|at)?\s*(\+?[0-9\s()-]{8,15})",
        r"\+45\s*([0-9\s-]{8,12})",
        r"\b([0-9]{3}[-\s.]?[0-9]{3}[-\s.]?[0-9]{4})\b",
        r"\b(\+?[0-9]{1,3}[\s-]?[0-9\s()-]{7,12})\b",
        r"\b([0-9]{8,15})\b",
    ])
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{4}-[0-9]{2}-[0-9]{2}\b").expect("built-in date pattern is valid")
});

static PERSONS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"(?i)(?:for|party of|table for|reservation for)\s*([0-9]+)\s*(?:people|persons|guests|ppl)?",
        r"(?i)([0-9]+)\s*(?:people|persons|guests|ppl)",
        r"(?i)\b([0-9]+)\s*(?:of us|in our party)",
        r"(?i)just\s*([0-9]+)",
        r"(?i)([0-9]+)\s*(?:person|guest)",
    ])
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"(?i)\b(today|tonight)\b",
        r"(?i)\b(tomorrow)\b",
        r"([0-9]{4}-[0-9]{2}-[0-9]{2})",
        r"([0-9]{1,2}/[0-9]{1,2}/[0-9]{4})",
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        r"(?i)\b(next\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
    ])
});

static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"(?i)(?:at|for|around)\s*([0-9]{1,2}:?[0-9]{0,2}\s*(?:am|pm))",
        r"(?i)\b([0-9]{1,2}:?[0-9]{0,2}\s*(?:am|pm))\b",
        r"(?i)(?:at|for|around)\s*([0-9]{1,2})\s*(?:o'clock|oclock)",
        r"\b([0-9]{1,2}:[0-9]{2})\b",
    ])
});

/// Returns the first capture accepted by `accept`, trying each pattern's first
/// match in order.
fn first_accepted<T>(
    patterns: &[Regex],
    text: &str,
    accept: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    patterns.iter().find_map(|pattern| {
        let captured = pattern.captures(text)?.get(1)?;
        accept(captured.as_str())
    })
}

pub fn extract(text: &str) -> BookingDraft {
    let draft = BookingDraft {
        name: extract_name(text),
        mobile: extract_mobile(text),
        date: first_accepted(&DATE_PATTERNS, text, |date| Some(date.to_string())),
        time: first_accepted(&TIME_PATTERNS, text, |time| Some(time.to_string())),
        persons: extract_persons(text),
        comment: String::new(),
    };
    tracing::debug!(?draft, "extracted booking slots");
    draft
}

/// Extracts from everything the caller has said so far. Agent turns are left
/// out so the assistant's own read-backs never fill a slot.
pub fn extract_from_transcript(transcript: &[TranscriptTurn]) -> BookingDraft {
    extract(&caller_text(transcript))
}

/// The booking after the latest caller turn. Slots come from everything the
/// caller has said, and any slot the latest turn states again replaces the
/// earlier value.
pub fn current_draft(transcript: &[TranscriptTurn]) -> BookingDraft {
    let mut draft = extract_from_transcript(transcript);
    if let Some(latest) = transcript.iter().rev().find(|turn| turn.role == Role::User) {
        draft.merge(extract(&latest.content));
    }
    draft
}

pub fn caller_text(transcript: &[TranscriptTurn]) -> String {
    transcript
        .iter()
        .filter(|turn| turn.role == Role::User)
        .map(|turn| turn.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_name(text: &str) -> Option<String> {
    first_accepted(&NAME_PATTERNS, text, |candidate| {
        let name = candidate.trim();
        let plausible = (2..=30).contains(&name.len()) && !NAME_STOPWORDS.is_match(name);
        plausible.then(|| name.to_string())
    })
}

fn extract_mobile(text: &str) -> Option<String> {
    // ISO dates would otherwise read as phone digits
    let without_dates = ISO_DATE.replace_all(text, " ");
    let normalized = numbers::normalize(&without_dates);
    first_accepted(&PHONE_PATTERNS, &normalized, clean_phone)
}

/// Strips formatting, assumes the default country for 8-digit numbers and
/// accepts 8 to 15 digits.
pub fn clean_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let phone = if cleaned.len() == 8 && !cleaned.starts_with('+') {
        format!("{DEFAULT_COUNTRY_PREFIX}{cleaned}")
    } else {
        cleaned
    };

    let digits = phone.strip_prefix('+').unwrap_or(&phone).len();
    (8..=15).contains(&digits).then_some(phone)
}

fn extract_persons(text: &str) -> Option<u32> {
    first_accepted(&PERSONS_PATTERNS, text, |count| {
        count
            .parse::<u32>()
            .ok()
            .filter(|n| (MIN_PERSONS..=MAX_PERSONS).contains(n))
    })
}
