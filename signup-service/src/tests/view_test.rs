use eventapp_shared::models::{SignupFilter, SignupStatus};
use eventapp_shared::test_utils::counting_store::CountingSignupStore;
use std::sync::Arc;

use super::{ids, wait_for, TestContext, EVENT_ID};
use crate::projection::SignupProjector;
use crate::view::EntrantsView;

fn view(ctx: &TestContext) -> EntrantsView {
    EntrantsView::new(SignupProjector::new(ctx.signups.clone(), ctx.users.clone()))
}

#[tokio::test]
async fn test_filter_without_event_leaves_roster_empty() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Waitlisted).await;
    let mut view = view(&ctx);

    view.set_filter(SignupFilter::all()).await.unwrap();
    assert!(view.entries().is_empty());
    assert!(view.feed_mut().is_none());
    assert_eq!(ctx.signups.active_watchers().unwrap(), 0);
}

#[tokio::test]
async fn test_switching_filters_keeps_one_subscription() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Waitlisted).await;
    ctx.seed("b", SignupStatus::Chosen).await;
    let mut view = view(&ctx);

    view.set_filter(SignupFilter::only(&[SignupStatus::Waitlisted]))
        .await
        .unwrap();
    view.set_event(EVENT_ID).await.unwrap();
    assert_eq!(view.event_id(), Some(EVENT_ID));
    assert_eq!(ids(&view.entries()), vec!["a"]);

    view.set_filter(SignupFilter::only(&[SignupStatus::Chosen]))
        .await
        .unwrap();
    assert_eq!(ids(&view.entries()), vec!["b"]);
    assert_eq!(ctx.signups.active_watchers().unwrap(), 1);

    view.set_filter(SignupFilter::all()).await.unwrap();
    assert_eq!(ids(&view.entries()), vec!["a", "b"]);
    assert_eq!(ctx.signups.active_watchers().unwrap(), 1);
}

#[tokio::test]
async fn test_clear_filter_empties_roster_without_query() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Waitlisted).await;
    let counting = Arc::new(CountingSignupStore::new(ctx.signups.clone()));
    let mut view = EntrantsView::new(SignupProjector::new(counting.clone(), ctx.users.clone()));

    view.set_event(EVENT_ID).await.unwrap();
    assert_eq!(counting.watches(), 0);

    view.set_filter(SignupFilter::all()).await.unwrap();
    assert_eq!(counting.watches(), 1);

    view.clear_filter().await.unwrap();
    assert!(view.entries().is_empty());
    assert!(view.filter().is_empty());
    assert_eq!(counting.watches(), 1);
    assert_eq!(ctx.signups.active_watchers().unwrap(), 0);
}

#[tokio::test]
async fn test_view_follows_live_changes() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Waitlisted).await;
    let mut view = view(&ctx);
    view.set_event(EVENT_ID).await.unwrap();
    view.set_filter(SignupFilter::only(&[SignupStatus::Waitlisted]))
        .await
        .unwrap();

    ctx.seed("b", SignupStatus::Waitlisted).await;
    let feed = view.feed_mut().unwrap();
    let entries = wait_for(feed, |e| e.len() == 2).await;
    assert_eq!(ids(&entries), vec!["a", "b"]);
    assert_eq!(ids(&view.entries()), vec!["a", "b"]);
}

#[tokio::test]
async fn test_close_releases_subscription() {
    let ctx = TestContext::new();
    let mut view = view(&ctx);
    view.set_event(EVENT_ID).await.unwrap();
    view.set_filter(SignupFilter::all()).await.unwrap();
    assert_eq!(ctx.signups.active_watchers().unwrap(), 1);

    view.close();
    assert_eq!(ctx.signups.active_watchers().unwrap(), 0);
    assert!(view.entries().is_empty());
}
