//! In-process document store.
//!
//! Signups are kept as JSON documents in their storage-boundary shape
//! ([`SignupRecord`]) so that reads go through the same decode step a remote
//! document store would need. Live queries are backed by `tokio::sync::watch`
//! channels that are refreshed synchronously after every write.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;
use uuid::Uuid;

use super::{
    EventStore, NotificationStore, Result, SignupStore, SignupSubscription, SignupWatch,
    StoreError, UserStore,
};
use crate::models::{Event, Notification, NotificationKind, Signup, SignupRecord, SignupStatus, User};

fn poisoned(table: &str) -> StoreError {
    StoreError::Backend(format!("{} table lock poisoned", table))
}

struct StoredSignup {
    document_id: String,
    body: Value,
}

struct SignupWatcher {
    id: u64,
    event_id: String,
    statuses: Vec<SignupStatus>,
    tx: watch::Sender<Vec<Signup>>,
}

#[derive(Default)]
struct SignupTable {
    documents: Vec<StoredSignup>,
    watchers: Vec<SignupWatcher>,
    next_watcher_id: u64,
}

fn decode(doc: &StoredSignup) -> Option<Signup> {
    match serde_json::from_value::<SignupRecord>(doc.body.clone()) {
        Ok(mut record) => {
            record.document_id = Some(doc.document_id.clone());
            Some(Signup::from(record))
        }
        Err(e) => {
            warn!(
                "Skipping malformed signup document document_id={}: {}",
                doc.document_id, e
            );
            None
        }
    }
}

fn encode(signup: &Signup) -> Result<Value> {
    serde_json::to_value(SignupRecord::from(signup))
        .map_err(|e| StoreError::Backend(format!("Failed to encode signup: {}", e)))
}

fn select<F>(documents: &[StoredSignup], predicate: F) -> Vec<Signup>
where
    F: Fn(&Signup) -> bool,
{
    documents
        .iter()
        .filter_map(decode)
        .filter(|s| predicate(s))
        .collect()
}

fn matches_event(signup: &Signup, event_id: &str, statuses: &[SignupStatus]) -> bool {
    signup.event_id == event_id && statuses.contains(&signup.status)
}

impl SignupTable {
    fn position(&self, document_id: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.document_id == document_id)
    }

    /// Pushes fresh snapshots to the live queries of `event_id`.
    fn notify(&mut self, event_id: &str) {
        let before = self.watchers.len();
        self.watchers.retain(|w| !w.tx.is_closed());
        if self.watchers.len() != before {
            debug!(
                "Released {} closed signup watchers",
                before - self.watchers.len()
            );
        }

        for watcher in self.watchers.iter().filter(|w| w.event_id == event_id) {
            let snapshot = select(&self.documents, |s| {
                matches_event(s, &watcher.event_id, &watcher.statuses)
            });
            watcher.tx.send_if_modified(|current| {
                if *current != snapshot {
                    *current = snapshot;
                    true
                } else {
                    false
                }
            });
        }
    }
}

fn release_watcher(registry: &Weak<Mutex<SignupTable>>, id: u64) {
    let Some(shared) = registry.upgrade() else {
        return;
    };
    let Ok(mut table) = shared.lock() else {
        warn!("Could not release signup watcher id={}: lock poisoned", id);
        return;
    };
    table.watchers.retain(|w| w.id != id);
    debug!("Released signup watcher id={}", id);
}

/// In-memory [`SignupStore`].
#[derive(Default)]
pub struct MemorySignupStore {
    table: Arc<Mutex<SignupTable>>,
}

impl MemorySignupStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> Result<MutexGuard<'_, SignupTable>> {
        self.table.lock().map_err(|_| poisoned("signup"))
    }

    /// Stores a document body as-is, bypassing the domain encoding.
    ///
    /// Used to load documents written by older clients, which may carry
    /// several status flags at once.
    pub fn insert_raw(&self, document_id: &str, body: Value) -> Result<()> {
        let event_id = body
            .get("eventId")
            .and_then(Value::as_str)
            .ok_or(StoreError::MissingField("eventId"))?
            .to_string();

        let mut table = self.table()?;
        match table.position(document_id) {
            Some(index) => table.documents[index].body = body,
            None => table.documents.push(StoredSignup {
                document_id: document_id.to_string(),
                body,
            }),
        }
        table.notify(&event_id);
        Ok(())
    }

    /// Raw stored body of a document.
    pub fn raw_document(&self, document_id: &str) -> Result<Option<Value>> {
        let table = self.table()?;
        Ok(table
            .position(document_id)
            .map(|index| table.documents[index].body.clone()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.table()?.documents.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Live queries still registered.
    pub fn active_watchers(&self) -> Result<usize> {
        let mut table = self.table()?;
        table.watchers.retain(|w| !w.tx.is_closed());
        Ok(table.watchers.len())
    }
}

#[async_trait]
impl SignupStore for MemorySignupStore {
    async fn get_signup(&self, user_id: &str, event_id: &str) -> Result<Option<Signup>> {
        let table = self.table()?;
        Ok(select(&table.documents, |s| {
            s.user_id == user_id && s.event_id == event_id
        })
        .into_iter()
        .next())
    }

    async fn get_signups_by_event(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<Vec<Signup>> {
        let table = self.table()?;
        Ok(select(&table.documents, |s| {
            matches_event(s, event_id, statuses)
        }))
    }

    async fn get_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>> {
        let table = self.table()?;
        Ok(select(&table.documents, |s| s.user_id == user_id))
    }

    async fn watch_signups(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<SignupWatch> {
        let mut table = self.table()?;
        let initial = select(&table.documents, |s| matches_event(s, event_id, statuses));
        let (tx, receiver) = watch::channel(initial);
        let id = table.next_watcher_id;
        table.next_watcher_id += 1;
        table.watchers.push(SignupWatcher {
            id,
            event_id: event_id.to_string(),
            statuses: statuses.to_vec(),
            tx,
        });
        debug!(
            "Registered signup watcher id={} for event_id={}, statuses={:?}",
            id, event_id, statuses
        );

        let registry = Arc::downgrade(&self.table);
        Ok(SignupWatch {
            receiver,
            subscription: SignupSubscription::new(move || release_watcher(&registry, id)),
        })
    }

    async fn create_signup(&self, mut signup: Signup) -> Result<Signup> {
        if signup.user_id.is_empty() {
            return Err(StoreError::MissingField("userId"));
        }
        if signup.event_id.is_empty() {
            return Err(StoreError::MissingField("eventId"));
        }

        let document_id = Uuid::new_v4().to_string();
        signup.document_id = Some(document_id.clone());
        signup.signup_timestamp = Some(Utc::now());
        signup.version = 0;
        let body = encode(&signup)?;

        let mut table = self.table()?;
        table.documents.push(StoredSignup {
            document_id: document_id.clone(),
            body,
        });
        table.notify(&signup.event_id);

        debug!("create_signup: success - document_id={}", document_id);
        Ok(signup)
    }

    async fn update_signup(&self, mut signup: Signup) -> Result<Signup> {
        let document_id = signup
            .document_id
            .clone()
            .ok_or(StoreError::MissingField("documentId"))?;

        let mut table = self.table()?;
        let index = table
            .position(&document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.clone()))?;

        let stored_version = table.documents[index]
            .body
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if stored_version != signup.version {
            return Err(StoreError::Conflict {
                document_id,
                expected: signup.version,
                actual: stored_version,
            });
        }

        let previous_event = table.documents[index]
            .body
            .get("eventId")
            .and_then(Value::as_str)
            .map(str::to_string);

        signup.version += 1;
        table.documents[index].body = encode(&signup)?;

        if let Some(previous_event) = previous_event.filter(|e| *e != signup.event_id) {
            table.notify(&previous_event);
        }
        table.notify(&signup.event_id);

        debug!(
            "update_signup: success - document_id={}, version={}",
            document_id, signup.version
        );
        Ok(signup)
    }

    async fn delete_signup(&self, document_id: &str) -> Result<()> {
        let mut table = self.table()?;
        let Some(index) = table.position(document_id) else {
            debug!("delete_signup: document_id={} already absent", document_id);
            return Ok(());
        };

        let removed = table.documents.remove(index);
        if let Some(event_id) = removed.body.get("eventId").and_then(Value::as_str) {
            let event_id = event_id.to_string();
            table.notify(&event_id);
        }
        debug!("delete_signup: success - document_id={}", document_id);
        Ok(())
    }
}

/// In-memory [`NotificationStore`], one inbox per user.
#[derive(Default)]
pub struct MemoryNotificationStore {
    inboxes: Mutex<HashMap<String, Vec<Notification>>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inboxes(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Notification>>>> {
        self.inboxes.lock().map_err(|_| poisoned("notification"))
    }

    /// Notifications across all inboxes.
    pub fn total(&self) -> Result<usize> {
        Ok(self.inboxes()?.values().map(Vec::len).sum())
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create_notification(&self, mut notification: Notification) -> Result<String> {
        let user_id = notification
            .user_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(StoreError::MissingField("userId"))?;
        if notification.kind == NotificationKind::Invite && notification.event_id.is_none() {
            return Err(StoreError::MissingField("eventId"));
        }

        let id = Uuid::new_v4().to_string();
        notification.document_id = Some(id.clone());
        self.inboxes()?.entry(user_id).or_default().push(notification);
        Ok(id)
    }

    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<()> {
        let mut inboxes = self.inboxes()?;
        if let Some(inbox) = inboxes.get_mut(user_id) {
            inbox.retain(|n| n.document_id.as_deref() != Some(notification_id));
        }
        Ok(())
    }

    async fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        Ok(self
            .inboxes()?
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) -> Result<()> {
        self.users
            .lock()
            .map_err(|_| poisoned("user"))?
            .insert(user.user_id.clone(), user);
        Ok(())
    }

    pub fn remove_user(&self, user_id: &str) -> Result<()> {
        self.users.lock().map_err(|_| poisoned("user"))?.remove(user_id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .map_err(|_| poisoned("user"))?
            .get(user_id)
            .cloned())
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let users = self.users.lock().map_err(|_| poisoned("user"))?;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<HashMap<String, Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, event: Event) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| poisoned("event"))?
            .insert(event.id.clone(), event);
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        Ok(self
            .events
            .lock()
            .map_err(|_| poisoned("event"))?
            .get(event_id)
            .cloned())
    }
}
