use serde::{Deserialize, Serialize};

/// The parts of an event the signup lifecycle depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip)]
    pub id: String,
    pub event_name: String,
    pub organizer_id: String,
    /// `None` means no enrollment limit. Stored as `-1`.
    #[serde(with = "max_entrants")]
    pub max_entrants: Option<u32>,
    #[serde(default)]
    pub geolocation_required: bool,
}

impl Event {
    pub fn new(id: &str, event_name: &str, organizer_id: &str, max_entrants: Option<u32>) -> Self {
        Event {
            id: id.to_string(),
            event_name: event_name.to_string(),
            organizer_id: organizer_id.to_string(),
            max_entrants,
            geolocation_required: false,
        }
    }
}

mod max_entrants {
    use serde::{Deserialize, Deserializer, Serializer};

    const UNLIMITED: i64 = -1;

    pub fn serialize<S>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(max) => serializer.serialize_i64(i64::from(*max)),
            None => serializer.serialize_i64(UNLIMITED),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            return Ok(None);
        }
        u32::try_from(raw)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("maxEntrants out of range: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unlimited_is_stored_as_minus_one() {
        let event = Event::new("e1", "Swim Lessons", "org-1", None);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["maxEntrants"], -1);

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(back.max_entrants, None);
    }

    #[test]
    fn test_bounded_capacity() {
        let raw = json!({
            "eventName": "Piano",
            "organizerId": "org-1",
            "maxEntrants": 20
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.max_entrants, Some(20));
        assert!(!event.geolocation_required);
    }
}
