use eventapp_shared::models::{Signup, SignupFilter, SignupStatus, User};
use eventapp_shared::store::{SignupStore, SignupSubscription, SignupWatch, UserStore};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;

/// A user paired with their attendance status for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSignupEntry {
    pub user: User,
    pub status: SignupStatus,
}

impl UserSignupEntry {
    pub fn new(user: User, status: SignupStatus) -> Self {
        Self { user, status }
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub fn attendance_status(&self) -> &'static str {
        self.status.as_str()
    }
}

/// Live, fully re-projected roster for one event and filter.
///
/// Dropping the feed unregisters the store query before `drop` returns and
/// stops the projection task.
pub struct EntryFeed {
    rx: watch::Receiver<Vec<UserSignupEntry>>,
    subscription: Option<SignupSubscription>,
    task: Option<JoinHandle<()>>,
}

impl EntryFeed {
    /// A feed that holds an empty roster and never changes.
    pub fn empty() -> Self {
        let (_tx, rx) = watch::channel(Vec::new());
        Self {
            rx,
            subscription: None,
            task: None,
        }
    }

    pub fn current(&self) -> Vec<UserSignupEntry> {
        self.rx.borrow().clone()
    }

    /// Waits for the next projection. Returns false once the feed can no
    /// longer change.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Marks the current projection as seen.
    pub fn mark_seen(&mut self) -> Vec<UserSignupEntry> {
        self.rx.borrow_and_update().clone()
    }

    pub fn is_live(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for EntryFeed {
    fn drop(&mut self) {
        drop(self.subscription.take());
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Turns signup queries into display entries.
#[derive(Clone)]
pub struct SignupProjector {
    signups: Arc<dyn SignupStore>,
    users: Arc<dyn UserStore>,
}

impl SignupProjector {
    pub fn new(signups: Arc<dyn SignupStore>, users: Arc<dyn UserStore>) -> Self {
        Self { signups, users }
    }

    /// Subscribes to the event's signups matching `filter`.
    ///
    /// A filter with no active status yields an empty feed without touching
    /// the store.
    pub async fn get_entries_for_event(
        &self,
        event_id: &str,
        filter: &SignupFilter,
    ) -> Result<EntryFeed> {
        let statuses = filter.active_statuses();
        if statuses.is_empty() {
            debug!(
                "get_entries_for_event: empty filter for event_id={}, no query issued",
                event_id
            );
            return Ok(EntryFeed::empty());
        }

        let SignupWatch {
            receiver: mut signups_rx,
            subscription,
        } = self.signups.watch_signups(event_id, &statuses).await?;
        let initial = signups_rx.borrow_and_update().clone();
        let entries = project(self.users.as_ref(), &initial).await?;
        let (tx, rx) = watch::channel(entries);

        let users = self.users.clone();
        let feed_event = event_id.to_string();
        let task = tokio::spawn(async move {
            while signups_rx.changed().await.is_ok() {
                let snapshot = signups_rx.borrow_and_update().clone();
                match project(users.as_ref(), &snapshot).await {
                    Ok(entries) => {
                        if tx.send(entries).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        // Keep showing the last good roster
                        error!(
                            "Failed to project signups for event_id={}: {}",
                            feed_event, e
                        );
                    }
                }
            }
            debug!("Entry feed for event_id={} finished", feed_event);
        });

        info!(
            "Subscribed to entries for event_id={}, statuses={:?}",
            event_id, statuses
        );
        Ok(EntryFeed {
            rx,
            subscription: Some(subscription),
            task: Some(task),
        })
    }

    /// One-shot version of [`SignupProjector::get_entries_for_event`].
    pub async fn list_entries_for_event(
        &self,
        event_id: &str,
        filter: &SignupFilter,
    ) -> Result<Vec<UserSignupEntry>> {
        let statuses = filter.active_statuses();
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let signups = self.signups.get_signups_by_event(event_id, &statuses).await?;
        project(self.users.as_ref(), &signups).await
    }
}

/// Resolves the users of `signups` in one batch and pairs each with its status.
///
/// Signups whose user cannot be resolved are dropped, not fatal.
pub async fn project(users: &dyn UserStore, signups: &[Signup]) -> Result<Vec<UserSignupEntry>> {
    if signups.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = signups.iter().map(|s| s.user_id.clone()).collect();
    let resolved: HashMap<String, User> = users
        .get_users(&ids)
        .await?
        .into_iter()
        .map(|u| (u.user_id.clone(), u))
        .collect();

    let entries = signups
        .iter()
        .filter_map(|signup| match resolved.get(&signup.user_id) {
            Some(user) => Some(UserSignupEntry::new(user.clone(), signup.status)),
            None => {
                warn!(
                    "Dropping signup for unknown user_id={} on event_id={}",
                    signup.user_id, signup.event_id
                );
                None
            }
        })
        .collect();
    Ok(entries)
}
