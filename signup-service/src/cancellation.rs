use eventapp_shared::models::{Signup, SignupStatus};
use eventapp_shared::store::SignupStore;
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;

use crate::error::{Result, SignupError};
use crate::projection::UserSignupEntry;

#[derive(Debug)]
pub struct CancellationFailure {
    pub user_id: String,
    pub error: SignupError,
}

#[derive(Debug, Default)]
pub struct CancellationReport {
    pub cancelled: Vec<Signup>,
    pub failures: Vec<CancellationFailure>,
}

impl CancellationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Organizer-side cancellation of entrants.
#[derive(Clone)]
pub struct EntrantCanceller {
    signups: Arc<dyn SignupStore>,
}

impl EntrantCanceller {
    pub fn new(signups: Arc<dyn SignupStore>) -> Self {
        Self { signups }
    }

    /// Cancels one entrant's signup. Already cancelled signups are returned
    /// unchanged.
    pub async fn cancel_entrant(&self, user_id: &str, event_id: &str) -> Result<Signup> {
        let mut signup = self
            .signups
            .get_signup(user_id, event_id)
            .await?
            .ok_or_else(|| SignupError::signup_not_found(user_id, event_id))?;

        if signup.status == SignupStatus::Cancelled {
            debug!(
                "user_id={} already cancelled for event_id={}",
                user_id, event_id
            );
            return Ok(signup);
        }

        let previous = signup.to_cancelled_by_organizer();
        let cancelled = self
            .signups
            .update_signup(signup)
            .await
            .map_err(|e| SignupError::from_signup_write(e, user_id, event_id))?;
        info!(
            "Cancelled user_id={} for event_id={} (was {})",
            user_id, event_id, previous
        );
        Ok(cancelled)
    }

    /// Cancels every listed entrant. Each is attempted independently; the
    /// report lists who was cancelled and who was not.
    pub async fn cancel_entrants(
        &self,
        event_id: &str,
        entries: &[UserSignupEntry],
    ) -> CancellationReport {
        let results = join_all(entries.iter().map(|entry| async move {
            let user_id = entry.user_id().to_string();
            let result = self.cancel_entrant(&user_id, event_id).await;
            (user_id, result)
        }))
        .await;

        let mut report = CancellationReport::default();
        for (user_id, result) in results {
            match result {
                Ok(signup) => report.cancelled.push(signup),
                Err(e) => {
                    error!(
                        "Failed to cancel user_id={} for event_id={}: {}",
                        user_id, event_id, e
                    );
                    report.failures.push(CancellationFailure { user_id, error: e });
                }
            }
        }

        info!(
            "Bulk cancel for event_id={}: {} cancelled, {} failed",
            event_id,
            report.cancelled.len(),
            report.failures.len()
        );
        report
    }
}
