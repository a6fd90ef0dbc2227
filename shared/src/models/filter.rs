use serde::{Deserialize, Serialize};

use super::status::SignupStatus;

/// Which statuses to include when listing an event's signups.
///
/// `None` and `Some(false)` both leave a status out. A filter with nothing
/// switched on matches nothing; there is no "everything" filter by omission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupFilter {
    pub is_cancelled: Option<bool>,
    pub is_waitlisted: Option<bool>,
    pub is_chosen: Option<bool>,
    pub is_enrolled: Option<bool>,
}

impl SignupFilter {
    pub fn only(statuses: &[SignupStatus]) -> Self {
        let mut filter = SignupFilter::default();
        for status in statuses {
            match status {
                SignupStatus::Cancelled => filter.is_cancelled = Some(true),
                SignupStatus::Waitlisted => filter.is_waitlisted = Some(true),
                SignupStatus::Chosen => filter.is_chosen = Some(true),
                SignupStatus::Enrolled => filter.is_enrolled = Some(true),
                SignupStatus::Unknown => {}
            }
        }
        filter
    }

    /// Cancelled, waitlisted, chosen and enrolled.
    pub fn all() -> Self {
        SignupFilter {
            is_cancelled: Some(true),
            is_waitlisted: Some(true),
            is_chosen: Some(true),
            is_enrolled: Some(true),
        }
    }

    /// Statuses OR-ed together by the store query, in flag order.
    pub fn active_statuses(&self) -> Vec<SignupStatus> {
        [
            (self.is_cancelled, SignupStatus::Cancelled),
            (self.is_waitlisted, SignupStatus::Waitlisted),
            (self.is_chosen, SignupStatus::Chosen),
            (self.is_enrolled, SignupStatus::Enrolled),
        ]
        .into_iter()
        .filter(|(flag, _)| *flag == Some(true))
        .map(|(_, status)| status)
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active_statuses().is_empty()
    }
}
