use eventapp_shared::models::{GeoPoint, Signup, SignupStatus};
use eventapp_shared::store::{EventStore, SignupStore};
use futures::future::join_all;
use log::{error, info, warn};
use std::sync::Arc;

use crate::error::{Result, SignupError};

/// Entrant-side waitlist membership, plus the purges that follow an event or
/// user being deleted.
#[derive(Clone)]
pub struct WaitlistManager {
    signups: Arc<dyn SignupStore>,
    events: Arc<dyn EventStore>,
}

impl WaitlistManager {
    pub fn new(signups: Arc<dyn SignupStore>, events: Arc<dyn EventStore>) -> Self {
        Self { signups, events }
    }

    /// Puts the user on the event's waitlist.
    ///
    /// One signup per `(user_id, event_id)`: a user who already has one,
    /// whatever its status, is rejected.
    pub async fn join_waitlist(
        &self,
        user_id: &str,
        event_id: &str,
        location: Option<GeoPoint>,
    ) -> Result<Signup> {
        if user_id.is_empty() {
            return Err(SignupError::MissingField("userId"));
        }
        if event_id.is_empty() {
            return Err(SignupError::MissingField("eventId"));
        }

        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| SignupError::EventNotFound(event_id.to_string()))?;
        if event.geolocation_required && location.is_none() {
            warn!(
                "user_id={} tried to join event_id={} without a location",
                user_id, event_id
            );
            return Err(SignupError::LocationRequired(event_id.to_string()));
        }

        if let Some(existing) = self.signups.get_signup(user_id, event_id).await? {
            warn!(
                "user_id={} already has a {} signup for event_id={}",
                user_id, existing.status, event_id
            );
            return Err(SignupError::AlreadySignedUp {
                user_id: user_id.to_string(),
                event_id: event_id.to_string(),
            });
        }

        let signup = self
            .signups
            .create_signup(Signup::waitlisted(user_id, event_id, location))
            .await?;
        info!("user_id={} joined waitlist for event_id={}", user_id, event_id);
        Ok(signup)
    }

    /// Removes the user's signup for the event.
    pub async fn leave_waitlist(&self, user_id: &str, event_id: &str) -> Result<()> {
        let signup = self
            .signups
            .get_signup(user_id, event_id)
            .await?
            .ok_or_else(|| SignupError::signup_not_found(user_id, event_id))?;
        let document_id = signup
            .document_id
            .as_deref()
            .ok_or(SignupError::MissingField("documentId"))?;

        self.signups.delete_signup(document_id).await?;
        info!(
            "user_id={} left event_id={} (was {})",
            user_id, event_id, signup.status
        );
        Ok(())
    }

    /// Every signup the user holds, across events.
    pub async fn signups_of_user(&self, user_id: &str) -> Result<Vec<Signup>> {
        Ok(self.signups.get_signups_by_user(user_id).await?)
    }

    /// Deletes every signup of a deleted event. Returns how many were removed.
    pub async fn purge_event_signups(&self, event_id: &str) -> Result<usize> {
        let signups = self
            .signups
            .get_signups_by_event(event_id, &SignupStatus::ALL)
            .await?;
        let removed = self.delete_all(&signups).await?;
        info!("Purged {} signups of event_id={}", removed, event_id);
        Ok(removed)
    }

    /// Deletes every signup of a deleted user. Returns how many were removed.
    pub async fn purge_user_signups(&self, user_id: &str) -> Result<usize> {
        let signups = self.signups.get_signups_by_user(user_id).await?;
        let removed = self.delete_all(&signups).await?;
        info!("Purged {} signups of user_id={}", removed, user_id);
        Ok(removed)
    }

    async fn delete_all(&self, signups: &[Signup]) -> Result<usize> {
        let ids: Vec<&str> = signups
            .iter()
            .filter_map(|s| s.document_id.as_deref())
            .collect();
        let results = join_all(ids.iter().map(|id| self.signups.delete_signup(id))).await;

        let mut removed = 0;
        let mut first_error = None;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    error!("Failed to delete signup document_id={}: {}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(removed),
        }
    }
}
