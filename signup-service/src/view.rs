use eventapp_shared::models::SignupFilter;
use log::warn;

use crate::error::Result;
use crate::projection::{EntryFeed, SignupProjector, UserSignupEntry};

/// Organizer roster screen state: one event, one filter, at most one live feed.
pub struct EntrantsView {
    projector: SignupProjector,
    event_id: Option<String>,
    filter: SignupFilter,
    feed: Option<EntryFeed>,
}

impl EntrantsView {
    pub fn new(projector: SignupProjector) -> Self {
        Self {
            projector,
            event_id: None,
            filter: SignupFilter::default(),
            feed: None,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn filter(&self) -> &SignupFilter {
        &self.filter
    }

    /// Switches to another event, keeping the current filter.
    pub async fn set_event(&mut self, event_id: &str) -> Result<()> {
        self.event_id = Some(event_id.to_string());
        let filter = self.filter;
        self.set_filter(filter).await
    }

    /// Replaces the filter. The previous subscription is released before the
    /// next one is opened.
    pub async fn set_filter(&mut self, filter: SignupFilter) -> Result<()> {
        self.filter = filter;
        self.feed = None;

        let Some(event_id) = self.event_id.as_deref() else {
            warn!("EntrantsView: no event selected, roster left empty");
            return Ok(());
        };
        self.feed = Some(
            self.projector
                .get_entries_for_event(event_id, &self.filter)
                .await?,
        );
        Ok(())
    }

    pub async fn clear_filter(&mut self) -> Result<()> {
        self.set_filter(SignupFilter::default()).await
    }

    pub fn entries(&self) -> Vec<UserSignupEntry> {
        self.feed
            .as_ref()
            .map(EntryFeed::current)
            .unwrap_or_default()
    }

    pub fn feed_mut(&mut self) -> Option<&mut EntryFeed> {
        self.feed.as_mut()
    }

    /// Releases the live subscription, e.g. when the screen goes away.
    pub fn close(&mut self) {
        self.feed = None;
    }
}
