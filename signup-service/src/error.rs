use eventapp_shared::models::SignupStatus;
use eventapp_shared::store::StoreError;
use thiserror::Error;

const RETRY_MESSAGE: &str = "Something went wrong, please try again.";

#[derive(Error, Debug)]
pub enum SignupError {
    // Validation, rejected before any write
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Draw count must be at least 1")]
    InvalidDrawCount,

    #[error("Draw count {requested} is larger than the {available} waitlisted entrants")]
    DrawCountTooLarge { requested: usize, available: usize },

    #[error("Draw count {requested} exceeds the {remaining} remaining enrollment spots")]
    ExceedsCapacity { requested: usize, remaining: usize },

    #[error("User {user_id} is already signed up for event {event_id}")]
    AlreadySignedUp { user_id: String, event_id: String },

    #[error("Event {0} requires a location to sign up")]
    LocationRequired(String),

    // Not found
    #[error("Signup not found for user_id={user_id}, event_id={event_id}")]
    SignupNotFound { user_id: String, event_id: String },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    // State
    #[error("Cannot {action} a signup that is {from}")]
    InvalidTransition {
        from: SignupStatus,
        action: &'static str,
    },

    #[error("Signup was modified concurrently: {0}")]
    Conflict(String),

    // Store / transport
    #[error("Store failure: {0}")]
    Store(StoreError),
}

pub type Result<T> = std::result::Result<T, SignupError>;

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        match err {
            conflict @ StoreError::Conflict { .. } => SignupError::Conflict(conflict.to_string()),
            StoreError::MissingField(field) => SignupError::MissingField(field),
            other => SignupError::Store(other),
        }
    }
}

impl SignupError {
    /// Maps a failed signup write, reporting a vanished document as a missing signup.
    pub fn from_signup_write(err: StoreError, user_id: &str, event_id: &str) -> Self {
        match err {
            StoreError::NotFound(_) => SignupError::SignupNotFound {
                user_id: user_id.to_string(),
                event_id: event_id.to_string(),
            },
            other => other.into(),
        }
    }

    pub fn signup_not_found(user_id: &str, event_id: &str) -> Self {
        SignupError::SignupNotFound {
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SignupError::Conflict(_) | SignupError::Store(_))
    }

    /// Message suitable for showing to the person who triggered the action.
    pub fn user_message(&self) -> String {
        match self {
            SignupError::InvalidNotification(_) => {
                "This notification is no longer valid.".to_string()
            }
            SignupError::MissingField(field) => format!("Missing {}.", field),
            SignupError::InvalidDrawCount => "Draw count is less than 1.".to_string(),
            SignupError::DrawCountTooLarge { available, .. } => format!(
                "Draw count is too large. Only {} entrants are on the waitlist.",
                available
            ),
            SignupError::ExceedsCapacity { remaining, .. } => format!(
                "Draw count is too large. Only {} spots remain.",
                remaining
            ),
            SignupError::AlreadySignedUp { .. } => {
                "You are already signed up for this event.".to_string()
            }
            SignupError::LocationRequired(_) => {
                "This event needs your location to sign up.".to_string()
            }
            SignupError::SignupNotFound { .. } => {
                "We couldn't find this signup. It may have been removed.".to_string()
            }
            SignupError::EventNotFound(_) => "This event no longer exists.".to_string(),
            SignupError::InvalidTransition { from, .. } => {
                format!("This invitation can't be answered: the signup is {}.", from)
            }
            SignupError::Conflict(_) | SignupError::Store(_) => RETRY_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: SignupError = StoreError::Conflict {
            document_id: "d".to_string(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, SignupError::Conflict(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_on_write_is_signup_not_found() {
        let err =
            SignupError::from_signup_write(StoreError::NotFound("d".to_string()), "u1", "e1");
        assert!(matches!(err, SignupError::SignupNotFound { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = SignupError::DrawCountTooLarge {
            requested: 5,
            available: 3,
        };
        assert!(err.user_message().contains("too large"));

        let store = SignupError::Store(StoreError::Backend("timeout".to_string()));
        assert_eq!(store.user_message(), RETRY_MESSAGE);
        assert!(store.is_retryable());
        assert!(!SignupError::InvalidDrawCount.is_retryable());
    }
}
