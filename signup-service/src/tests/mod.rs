mod cancellation_test;
mod view_test;

use eventapp_shared::models::{Event, Signup, SignupStatus, User};
use eventapp_shared::store::memory::{
    MemoryEventStore, MemoryNotificationStore, MemorySignupStore, MemoryUserStore,
};
use eventapp_shared::store::SignupStore;
use eventapp_shared::test_utils::test_logging::init_test_logging;
use std::sync::Arc;
use std::time::Duration;

use crate::projection::{EntryFeed, UserSignupEntry};

pub const EVENT_ID: &str = "event-1";

/// In-memory stores shared by the components under test.
pub struct TestContext {
    pub signups: Arc<MemorySignupStore>,
    pub notifications: Arc<MemoryNotificationStore>,
    pub users: Arc<MemoryUserStore>,
    pub events: Arc<MemoryEventStore>,
}

impl TestContext {
    pub fn new() -> Self {
        init_test_logging();
        let ctx = Self {
            signups: Arc::new(MemorySignupStore::new()),
            notifications: Arc::new(MemoryNotificationStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            events: Arc::new(MemoryEventStore::new()),
        };
        ctx.add_event(Event::new(EVENT_ID, "Pottery Night", "organizer-1", None));
        ctx
    }

    pub fn add_event(&self, event: Event) {
        self.events.insert_event(event).unwrap();
    }

    pub fn add_user(&self, user_id: &str) -> User {
        let user = User::new(user_id, &format!("User {}", user_id));
        self.users.insert_user(user.clone()).unwrap();
        user
    }

    /// Creates a user plus a signup in the given status for [`EVENT_ID`].
    pub async fn seed(&self, user_id: &str, status: SignupStatus) -> Signup {
        self.add_user(user_id);
        self.seed_signup(user_id, EVENT_ID, status).await
    }

    pub async fn seed_signup(&self, user_id: &str, event_id: &str, status: SignupStatus) -> Signup {
        let created = self
            .signups
            .create_signup(Signup::waitlisted(user_id, event_id, None))
            .await
            .unwrap();
        if status == SignupStatus::Waitlisted {
            return created;
        }
        let mut signup = created;
        signup.status = status;
        self.signups.update_signup(signup).await.unwrap()
    }

    pub async fn status_of(&self, user_id: &str) -> Option<SignupStatus> {
        self.signups
            .get_signup(user_id, EVENT_ID)
            .await
            .unwrap()
            .map(|s| s.status)
    }

    pub async fn entry(&self, user_id: &str) -> UserSignupEntry {
        let status = self.status_of(user_id).await.unwrap_or(SignupStatus::Unknown);
        UserSignupEntry::new(User::new(user_id, &format!("User {}", user_id)), status)
    }
}

/// Waits until the feed's roster satisfies `predicate`, failing after a second.
pub async fn wait_for<F>(feed: &mut EntryFeed, predicate: F) -> Vec<UserSignupEntry>
where
    F: Fn(&[UserSignupEntry]) -> bool,
{
    let result = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let entries = feed.mark_seen();
            if predicate(&entries) {
                return entries;
            }
            if !feed.changed().await {
                panic!("feed closed before the expected roster arrived");
            }
        }
    })
    .await;
    result.expect("timed out waiting for the roster")
}

pub fn ids(entries: &[UserSignupEntry]) -> Vec<String> {
    let mut ids: Vec<String> = entries.iter().map(|e| e.user_id().to_string()).collect();
    ids.sort();
    ids
}
