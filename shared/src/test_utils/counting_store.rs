use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::{Signup, SignupStatus};
use crate::store::{Result, SignupStore, SignupWatch};

/// Wraps a [`SignupStore`] and counts the calls that reach it.
pub struct CountingSignupStore {
    inner: Arc<dyn SignupStore>,
    reads: AtomicUsize,
    queries: AtomicUsize,
    watches: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingSignupStore {
    pub fn new(inner: Arc<dyn SignupStore>) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            watches: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Point lookups.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// One-shot queries by event or user.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn watches(&self) -> usize {
        self.watches.load(Ordering::SeqCst)
    }

    /// Creates, updates and deletes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.reads() + self.queries() + self.watches() + self.writes()
    }
}

#[async_trait]
impl SignupStore for CountingSignupStore {
    async fn get_signup(&self, user_id: &str, event_id: &str) -> Result<Option<Signup>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_signup(user_id, event_id).await
    }

    async fn get_signups_by_event(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<Vec<Signup>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.get_signups_by_event(event_id, statuses).await
    }

    async fn get_signups_by_user(&self, user_id: &str) -> Result<Vec<Signup>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.get_signups_by_user(user_id).await
    }

    async fn watch_signups(
        &self,
        event_id: &str,
        statuses: &[SignupStatus],
    ) -> Result<SignupWatch> {
        self.watches.fetch_add(1, Ordering::SeqCst);
        self.inner.watch_signups(event_id, statuses).await
    }

    async fn create_signup(&self, signup: Signup) -> Result<Signup> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create_signup(signup).await
    }

    async fn update_signup(&self, signup: Signup) -> Result<Signup> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_signup(signup).await
    }

    async fn delete_signup(&self, document_id: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_signup(document_id).await
    }
}
