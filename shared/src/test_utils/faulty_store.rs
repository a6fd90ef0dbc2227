//! Store wrappers that fail on demand, for exercising partial-failure paths.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::models::{Notification, Signup, SignupStatus};
use crate::store::{NotificationStore, Result, SignupStore, SignupWatch, StoreError};

fn injected(op: &str, user_id: &str) -> StoreError {
    StoreError::Backend(format!("injected {} failure for user_id={}", op, user_id))
}

/// Fails updates (and optionally lookups) for selected users.
pub struct FaultySignupStore {
    inner: Arc<dyn SignupStore>,
    failing_updates: Mutex<HashSet<String>>,
    failing_lookups: Mutex<HashSet<String>>,
    update_error: Mutex<Option<StoreError>>,
}

impl FaultySignupStore {
    pub fn new(inner: Arc<dyn SignupStore>) -> Self {
        Self {
            inner,
            failing_updates: Mutex::new(HashSet::new()),
            failing_lookups: Mutex::new(HashSet::new()),
            update_error: Mutex::new(None),
        }
    }

    pub fn fail_updates_for(&self, user_id: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    pub fn fail_lookups_for(&self, user_id: &str) {
        self.failing_lookups
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    /// Error returned by failing updates instead of a backend error.
    pub fn with_update_error(&self, error: StoreError) {
        *self.update_error.lock().unwrap() = Some(error);
    }

    fn update_fails(&self, user_id: &str) -> Option<StoreError> {
        if !self.failing_updates.lock().unwrap().contains(user_id) {
            return None;
        }
        Some(
            self.update_error
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| injected("update", user_id)),
        )
    }
}

#[async_trait]
impl SignupStore for FaultySignupStore {
    async fn get_signup(&self, user_id: &str, event_id: &str) -> Result<Option<Signup>> {
        if self.failing_lookups.lock().unwrap().contains(user_id) {
            return Err(injected("lookup", user_id));
        }
        self.inner.get_signup(user_id, event_id).await
    }

    async fn get_signups_by_event(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<Vec<Signup>> {
        self.inner.get_signups_by_event(event_id, statuses).await
    }

    async fn get_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>> {
        self.inner.get_signups_by_user(user_id).await
    }

    async fn watch_signups(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<SignupWatch> {
        self.inner.watch_signups(event_id, statuses).await
    }

    async fn create_signup(&self, signup: Signup) -> Result<Signup> {
        self.inner.create_signup(signup).await
    }

    async fn update_signup(&self, signup: Signup) -> Result<Signup> {
        if let Some(err) = self.update_fails(&signup.user_id) {
            return Err(err);
        }
        self.inner.update_signup(signup).await
    }

    async fn delete_signup(&self, document_id: &str) -> Result<()> {
        self.inner.delete_signup(document_id).await
    }
}

/// Fails notification creation for selected users, or for everyone.
pub struct FaultyNotificationStore {
    inner: Arc<dyn NotificationStore>,
    failing_users: Mutex<HashSet<String>>,
    fail_all_creates: Mutex<bool>,
    fail_deletes: Mutex<bool>,
}

impl FaultyNotificationStore {
    pub fn new(inner: Arc<dyn NotificationStore>) -> Self {
        Self {
            inner,
            failing_users: Mutex::new(HashSet::new()),
            fail_all_creates: Mutex::new(false),
            fail_deletes: Mutex::new(false),
        }
    }

    pub fn fail_creates_for(&self, user_id: &str) {
        self.failing_users
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    pub fn fail_all_creates(&self) {
        *self.fail_all_creates.lock().unwrap() = true;
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }
}

#[async_trait]
impl NotificationStore for FaultyNotificationStore {
    async fn create_notification(&self, notification: Notification) -> Result<String> {
        let user_id = notification.user_id.clone().unwrap_or_default();
        if *self.fail_all_creates.lock().unwrap()
            || self.failing_users.lock().unwrap().contains(&user_id)
        {
            return Err(injected("notification create", &user_id));
        }
        self.inner.create_notification(notification).await
    }

    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(injected("notification delete", user_id));
        }
        self.inner
            .delete_notification(user_id, notification_id)
            .await
    }

    async fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.inner.get_notifications_for_user(user_id).await
    }
}
