use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::{Event, Notification, Signup, SignupStatus, User};

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};

/// Registration of a live query in a store.
///
/// Dropping the guard unregisters the query before `drop` returns, so a
/// replacement subscription never overlaps the one it replaces.
pub struct SignupSubscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SignupSubscription {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for SignupSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Live result set of a signup query.
///
/// The store pushes a fresh snapshot into `receiver` after every change that
/// affects the query, for as long as `subscription` is held.
pub struct SignupWatch {
    pub receiver: watch::Receiver<Vec<Signup>>,
    pub subscription: SignupSubscription,
}

/// Persistence for signups, keyed by `(user_id, event_id)`.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Point lookup by the logical key.
    async fn get_signup(&self, user_id: &str, event_id: &str) -> Result<Option<Signup>>;

    /// Signups of an event whose status is any of `statuses`, in store order.
    async fn get_signups_by_event(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<Vec<Signup>>;

    async fn get_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>>;

    /// Same predicate as [`SignupStore::get_signups_by_event`], kept up to date.
    async fn watch_signups(&self, event_id: &str, statuses: &[SignupStatus])
        -> Result<SignupWatch>;

    /// Assigns the document id and signup timestamp.
    async fn create_signup(&self, signup: Signup) -> Result<Signup>;

    /// Compare-and-swap on `version`; a stale write fails with [`StoreError::Conflict`].
    async fn update_signup(&self, signup: Signup) -> Result<Signup>;

    /// Deleting an absent document is not an error.
    async fn delete_signup(&self, document_id: &str) -> Result<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Returns the assigned notification id.
    async fn create_notification(&self, notification: Notification) -> Result<String>;

    /// Deleting an absent notification is not an error.
    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<()>;

    async fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Batch lookup. Unknown ids are left out of the result.
    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>>;
}
