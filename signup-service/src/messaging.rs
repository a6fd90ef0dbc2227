use eventapp_shared::models::Notification;
use eventapp_shared::store::{EventStore, NotificationStore};
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::{Result, SignupError};
use crate::projection::UserSignupEntry;

#[derive(Debug)]
pub struct MessageFailure {
    pub user_id: String,
    pub error: SignupError,
}

#[derive(Debug, Default)]
pub struct MessagingReport {
    pub sent: Vec<Notification>,
    /// Users left out because they opted out of notifications.
    pub skipped_opt_out: Vec<String>,
    pub failures: Vec<MessageFailure>,
}

impl MessagingReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn message_title(event_name: &str) -> String {
    format!("Notification for Event \"{}\"", event_name)
}

/// Free-form organizer messages to a selection of entrants.
#[derive(Clone)]
pub struct EntrantMessenger {
    notifications: Arc<dyn NotificationStore>,
    events: Arc<dyn EventStore>,
    config: ServiceConfig,
}

impl EntrantMessenger {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        events: Arc<dyn EventStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            notifications,
            events,
            config,
        }
    }

    /// Sends `message` to every listed entrant, one General notification each.
    pub async fn notify_entrants(
        &self,
        event_id: &str,
        entries: &[UserSignupEntry],
        message: &str,
    ) -> Result<MessagingReport> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| SignupError::EventNotFound(event_id.to_string()))?;
        let title = message_title(&event.event_name);

        let mut report = MessagingReport::default();
        let mut recipients = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.config.respect_notification_opt_out && entry.user.notification_opt_out {
                debug!("Skipping user_id={}: opted out", entry.user_id());
                report.skipped_opt_out.push(entry.user_id().to_string());
            } else {
                recipients.push(entry.user_id());
            }
        }

        let results = join_all(recipients.iter().map(|user_id| {
            let notification = Notification::general(user_id, &title, message);
            async move {
                let mut sent = notification.clone();
                let result = self.notifications.create_notification(notification).await;
                result.map(|id| {
                    sent.document_id = Some(id);
                    sent
                })
            }
        }))
        .await;

        for (user_id, result) in recipients.into_iter().zip(results) {
            match result {
                Ok(notification) => report.sent.push(notification),
                Err(e) => {
                    error!(
                        "Failed to message user_id={} for event_id={}: {}",
                        user_id, event_id, e
                    );
                    report.failures.push(MessageFailure {
                        user_id: user_id.to_string(),
                        error: e.into(),
                    });
                }
            }
        }

        info!(
            "Messaged entrants of event_id={}: {} sent, {} opted out, {} failed",
            event_id,
            report.sent.len(),
            report.skipped_opt_out.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
