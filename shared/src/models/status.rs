use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance status of a signup.
///
/// This is the single authoritative status field of the domain model. The
/// legacy per-status booleans only exist on the storage record
/// ([`SignupFlags`]) and are folded into a status with [`SignupFlags::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignupStatus {
    Cancelled,
    Waitlisted,
    /// Selected by a lottery draw, has not answered the invitation yet.
    Chosen,
    Enrolled,
    Unknown,
}

impl SignupStatus {
    /// Every status, including `Unknown`.
    pub const ALL: [SignupStatus; 5] = [
        SignupStatus::Cancelled,
        SignupStatus::Waitlisted,
        SignupStatus::Chosen,
        SignupStatus::Enrolled,
        SignupStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignupStatus::Cancelled => "Cancelled",
            SignupStatus::Waitlisted => "Waitlisted",
            SignupStatus::Chosen => "Chosen",
            SignupStatus::Enrolled => "Enrolled",
            SignupStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SignupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy boolean view of a signup's status, as persisted in the document store.
///
/// Writes are not atomic across flags, so a stored document can carry more
/// than one `true`. Status is always derived with a fixed precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupFlags {
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub waitlisted: bool,
    #[serde(default)]
    pub chosen: bool,
    #[serde(default)]
    pub enrolled: bool,
}

impl SignupFlags {
    /// Derives the attendance status.
    ///
    /// Precedence: cancelled, then waitlisted, then chosen, then enrolled.
    /// Do not reorder these checks.
    pub fn status(&self) -> SignupStatus {
        if self.cancelled {
            SignupStatus::Cancelled
        } else if self.waitlisted {
            SignupStatus::Waitlisted
        } else if self.chosen {
            SignupStatus::Chosen
        } else if self.enrolled {
            SignupStatus::Enrolled
        } else {
            SignupStatus::Unknown
        }
    }
}

impl From<SignupStatus> for SignupFlags {
    fn from(status: SignupStatus) -> Self {
        SignupFlags {
            cancelled: status == SignupStatus::Cancelled,
            waitlisted: status == SignupStatus::Waitlisted,
            chosen: status == SignupStatus::Chosen,
            enrolled: status == SignupStatus::Enrolled,
        }
    }
}
