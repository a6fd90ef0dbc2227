use eventapp_shared::models::{Notification, Signup, SignupStatus};
use eventapp_shared::store::{NotificationStore, SignupStore};
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::error::{Result, SignupError};

/// Applies an entrant's answer to an invitation.
#[derive(Clone)]
pub struct InvitationResponder {
    signups: Arc<dyn SignupStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl InvitationResponder {
    pub fn new(signups: Arc<dyn SignupStore>, notifications: Arc<dyn NotificationStore>) -> Self {
        Self {
            signups,
            notifications,
        }
    }

    /// Moves a Chosen signup to Enrolled (`accepted`) or Cancelled, then
    /// removes the consumed invitation.
    ///
    /// Answering again with the same decision leaves the signup alone and
    /// only retries the notification removal.
    pub async fn respond_to_invitation(
        &self,
        notification: &Notification,
        accepted: bool,
    ) -> Result<Signup> {
        let (user_id, event_id) = invitation_target(notification)?;

        let mut signup = self
            .signups
            .get_signup(user_id, event_id)
            .await?
            .ok_or_else(|| {
                error!(
                    "respond_to_invitation: no signup for user_id={}, event_id={}",
                    user_id, event_id
                );
                SignupError::signup_not_found(user_id, event_id)
            })?;

        let (target, action) = if accepted {
            (SignupStatus::Enrolled, "accept")
        } else {
            (SignupStatus::Cancelled, "decline")
        };

        if signup.status == target {
            debug!(
                "user_id={} already {} for event_id={}, nothing to update",
                user_id, target, event_id
            );
        } else if signup.status != SignupStatus::Chosen {
            warn!(
                "Refusing to {} invitation for user_id={}, event_id={}: signup is {}",
                action, user_id, event_id, signup.status
            );
            return Err(SignupError::InvalidTransition {
                from: signup.status,
                action,
            });
        } else {
            if accepted {
                signup.to_enrolled();
            } else {
                signup.to_declined();
            }
            signup = self
                .signups
                .update_signup(signup)
                .await
                .map_err(|e| SignupError::from_signup_write(e, user_id, event_id))?;
            info!(
                "user_id={} {}ed invitation for event_id={}, now {}",
                user_id, action, event_id, signup.status
            );
        }

        self.consume(notification, user_id).await?;
        Ok(signup)
    }

    async fn consume(&self, notification: &Notification, user_id: &str) -> Result<()> {
        let Some(notification_id) = notification.document_id.as_deref() else {
            warn!(
                "Invitation for user_id={} has no id, nothing to remove",
                user_id
            );
            return Ok(());
        };
        self.notifications
            .delete_notification(user_id, notification_id)
            .await?;
        debug!(
            "Removed notification_id={} for user_id={}",
            notification_id, user_id
        );
        Ok(())
    }
}

fn invitation_target(notification: &Notification) -> Result<(&str, &str)> {
    let user_id = notification
        .user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SignupError::InvalidNotification("missing userId".to_string()))?;
    let event_id = notification
        .event_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SignupError::InvalidNotification("missing eventId".to_string()))?;
    Ok((user_id, event_id))
}
