use serde::{Deserialize, Serialize};

use super::de;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AvailabilitySlot {
    pub fn at(time: &str) -> Self {
        Self {
            time: Some(time.to_string()),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub day_status: bool,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub online_booking: bool,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub availability_times: Vec<AvailabilitySlot>,
}

impl AvailabilityResult {
    /// Times in server order; empty whenever the venue is closed that day.
    pub fn open_times(&self) -> &[AvailabilitySlot] {
        if self.day_status {
            &self.availability_times
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    #[serde(deserialize_with = "de::loose_u32")]
    pub persons: u32,
    #[serde(
        default,
        rename = "typeID",
        alias = "type_id",
        deserialize_with = "de::optional_loose_u32"
    )]
    pub type_id: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_response() {
        let json = r#"{"dayStatus":true,"onlineBooking":1,"availabilityTimes":[{"time":"18:00","tables":3},{"time":"18:30"}]}"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        assert!(result.day_status);
        assert!(result.online_booking);
        assert_eq!(result.open_times().len(), 2);
        assert_eq!(result.availability_times[0].extra["tables"], 3);
    }

    #[test]
    fn test_closed_day_hides_times() {
        let json = r#"{"dayStatus":false,"onlineBooking":true,"availabilityTimes":[{"time":"18:00"}]}"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        assert!(result.open_times().is_empty());
    }

    #[test]
    fn test_null_times_are_empty() {
        let json = r#"{"dayStatus":true,"onlineBooking":true,"availabilityTimes":null}"#;
        let result: AvailabilityResult = serde_json::from_str(json).unwrap();
        assert!(result.availability_times.is_empty());
    }

    #[test]
    fn test_query_accepts_string_numbers() {
        let query: AvailabilityQuery =
            serde_json::from_str(r#"{"date":"2025/06/20","persons":"2","typeID":"7"}"#).unwrap();
        assert_eq!(query.persons, 2);
        assert_eq!(query.type_id, Some(7));
    }
}
