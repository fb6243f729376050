//! Lenient deserializers for payloads produced by the voice platform, which
//! sends numbers as strings and `null` where a list is expected.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::conversation::{Role, TranscriptTurn};

pub fn loose_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    optional_loose_u32(deserializer)?.ok_or_else(|| D::Error::custom("expected a positive integer"))
}

pub fn optional_loose_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a positive integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a positive integer, got {s:?}"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a positive integer, got {other}"
        ))),
    }
}

/// Accepts `true`/`false` as well as `1`/`0`.
pub fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        Some(other) => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A transcript is normally a list of turns, but older agents send one
/// flattened string. The string form is treated as a single caller turn.
pub fn transcript<'de, D>(deserializer: D) -> Result<Vec<TranscriptTurn>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Turns(Vec<TranscriptTurn>),
        Text(String),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Shape::Turns(turns)) => turns,
        Some(Shape::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(Shape::Text(text)) => vec![TranscriptTurn {
            role: Role::User,
            content: text,
        }],
    })
}
