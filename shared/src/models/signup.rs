use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::status::{SignupFlags, SignupStatus};

/// Where an entrant was when they joined the waitlist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entrant's relationship to one event, logically unique per `(user_id, event_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signup {
    /// Store-assigned handle. `None` until the signup has been created.
    pub document_id: Option<String>,
    pub user_id: String,
    pub event_id: String,
    pub status: SignupStatus,
    /// Set by the store when the signup is created.
    pub signup_timestamp: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
    /// Optimistic concurrency token, bumped by the store on every update.
    pub version: u64,
}

impl Signup {
    /// A fresh waitlist signup, not yet persisted.
    pub fn waitlisted(user_id: &str, event_id: &str, location: Option<GeoPoint>) -> Self {
        Signup {
            document_id: None,
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
            status: SignupStatus::Waitlisted,
            signup_timestamp: None,
            location,
            version: 0,
        }
    }

    // Status transitions. Each one is a plain assignment and returns the
    // previous status; persisting the change is the caller's job.

    pub fn to_chosen(&mut self) -> SignupStatus {
        std::mem::replace(&mut self.status, SignupStatus::Chosen)
    }

    pub fn to_enrolled(&mut self) -> SignupStatus {
        std::mem::replace(&mut self.status, SignupStatus::Enrolled)
    }

    pub fn to_declined(&mut self) -> SignupStatus {
        std::mem::replace(&mut self.status, SignupStatus::Cancelled)
    }

    pub fn to_cancelled_by_organizer(&mut self) -> SignupStatus {
        std::mem::replace(&mut self.status, SignupStatus::Cancelled)
    }
}

/// Storage-boundary document for a signup.
///
/// Keeps the wire shape of the legacy documents: four booleans instead of a
/// status, and the timestamp in epoch milliseconds. The document id lives in
/// the document path, not in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRecord {
    #[serde(skip)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub signup_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub flags: SignupFlags,
    #[serde(default)]
    pub version: u64,
}

impl From<&Signup> for SignupRecord {
    fn from(signup: &Signup) -> Self {
        SignupRecord {
            document_id: signup.document_id.clone(),
            user_id: signup.user_id.clone(),
            event_id: signup.event_id.clone(),
            signup_timestamp: signup
                .signup_timestamp
                .map(|t| t.timestamp_millis())
                .unwrap_or_default(),
            latitude: signup.location.map(|l| l.latitude),
            longitude: signup.location.map(|l| l.longitude),
            flags: SignupFlags::from(signup.status),
            version: signup.version,
        }
    }
}

impl From<SignupRecord> for Signup {
    fn from(record: SignupRecord) -> Self {
        let location = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };
        let signup_timestamp = if record.signup_timestamp > 0 {
            Utc.timestamp_millis_opt(record.signup_timestamp).single()
        } else {
            None
        };

        Signup {
            document_id: record.document_id,
            user_id: record.user_id,
            event_id: record.event_id,
            status: record.flags.status(),
            signup_timestamp,
            location,
            version: record.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transitions_replace_status() {
        let mut signup = Signup::waitlisted("u1", "e1", None);

        assert_eq!(signup.to_chosen(), SignupStatus::Waitlisted);
        assert_eq!(signup.status, SignupStatus::Chosen);

        assert_eq!(signup.to_enrolled(), SignupStatus::Chosen);
        assert_eq!(signup.status, SignupStatus::Enrolled);

        assert_eq!(signup.to_declined(), SignupStatus::Enrolled);
        assert_eq!(signup.status, SignupStatus::Cancelled);

        signup.to_chosen();
        assert_eq!(signup.to_cancelled_by_organizer(), SignupStatus::Chosen);
        assert_eq!(signup.status, SignupStatus::Cancelled);
    }

    #[test]
    fn test_record_wire_shape() {
        let mut signup = Signup::waitlisted(
            "u1",
            "e1",
            Some(GeoPoint {
                latitude: 53.5,
                longitude: -113.5,
            }),
        );
        signup.document_id = Some("doc-1".to_string());
        signup.signup_timestamp = Utc.timestamp_millis_opt(1_700_000_000_000).single();
        signup.to_chosen();

        let value = serde_json::to_value(SignupRecord::from(&signup)).unwrap();
        assert_eq!(
            value,
            json!({
                "userId": "u1",
                "eventId": "e1",
                "signupTimestamp": 1_700_000_000_000i64,
                "latitude": 53.5,
                "longitude": -113.5,
                "cancelled": false,
                "waitlisted": false,
                "chosen": true,
                "enrolled": false,
                "version": 0
            })
        );
    }

    #[test]
    fn test_legacy_document_with_several_flags_decodes_by_precedence() {
        let raw = json!({
            "userId": "u1",
            "eventId": "e1",
            "signupTimestamp": 1_700_000_000_000i64,
            "cancelled": true,
            "chosen": true,
            "enrolled": true
        });
        let record: SignupRecord = serde_json::from_value(raw).unwrap();
        let signup = Signup::from(record);

        assert_eq!(signup.status, SignupStatus::Cancelled);
        assert!(signup.location.is_none());
        assert_eq!(signup.version, 0);
        assert_eq!(
            signup.signup_timestamp.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn test_missing_timestamp_decodes_as_none() {
        let raw = json!({ "userId": "u1", "eventId": "e1", "waitlisted": true });
        let signup = Signup::from(serde_json::from_value::<SignupRecord>(raw).unwrap());
        assert!(signup.signup_timestamp.is_none());
        assert_eq!(signup.status, SignupStatus::Waitlisted);
    }
}
