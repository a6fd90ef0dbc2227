use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Tied to an event; prompts the recipient to accept or decline a spot.
    Invite,
    General,
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(skip)]
    pub document_id: Option<String>,
    pub user_id: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl Notification {
    pub fn invite(user_id: &str, title: &str, message: &str, event_id: &str) -> Self {
        Notification {
            document_id: None,
            user_id: Some(user_id.to_string()),
            title: title.to_string(),
            message: message.to_string(),
            event_id: Some(event_id.to_string()),
            kind: NotificationKind::Invite,
        }
    }

    pub fn general(user_id: &str, title: &str, message: &str) -> Self {
        Notification {
            document_id: None,
            user_id: Some(user_id.to_string()),
            title: title.to_string(),
            message: message.to_string(),
            event_id: None,
            kind: NotificationKind::General,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invite_serializes_type_field() {
        let n = Notification::invite("u1", "Title", "Body", "e1");
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(
            value,
            json!({
                "userId": "u1",
                "title": "Title",
                "message": "Body",
                "eventId": "e1",
                "type": "Invite"
            })
        );
    }

    #[test]
    fn test_general_has_no_event() {
        let n = Notification::general("u1", "Title", "Body");
        assert_eq!(n.kind, NotificationKind::General);
        assert!(n.event_id.is_none());
        let value = serde_json::to_value(&n).unwrap();
        assert!(value.get("eventId").is_none());
        assert_eq!(value["type"], "General");
    }
}
