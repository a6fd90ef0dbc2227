use eventapp_shared::models::{SignupFilter, SignupStatus, User};
use eventapp_shared::test_utils::faulty_store::FaultySignupStore;
use std::sync::Arc;

use super::{TestContext, EVENT_ID};
use crate::cancellation::EntrantCanceller;
use crate::error::SignupError;
use crate::projection::{SignupProjector, UserSignupEntry};

fn canceller(ctx: &TestContext) -> EntrantCanceller {
    EntrantCanceller::new(ctx.signups.clone())
}

#[tokio::test]
async fn test_cancel_single_entrant() {
    let ctx = TestContext::new();
    ctx.seed("u1", SignupStatus::Chosen).await;

    let signup = canceller(&ctx).cancel_entrant("u1", EVENT_ID).await.unwrap();
    assert_eq!(signup.status, SignupStatus::Cancelled);
    assert_eq!(ctx.status_of("u1").await, Some(SignupStatus::Cancelled));
}

#[tokio::test]
async fn test_cancelling_twice_writes_once() {
    let ctx = TestContext::new();
    ctx.seed("u1", SignupStatus::Waitlisted).await;
    let canceller = canceller(&ctx);

    let first = canceller.cancel_entrant("u1", EVENT_ID).await.unwrap();
    let second = canceller.cancel_entrant("u1", EVENT_ID).await.unwrap();
    assert_eq!(first.version, second.version);
}

#[tokio::test]
async fn test_cancel_missing_signup() {
    let ctx = TestContext::new();
    let err = canceller(&ctx)
        .cancel_entrant("nobody", EVENT_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, SignupError::SignupNotFound { .. }));
}

#[tokio::test]
async fn test_bulk_cancel_is_best_effort() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Chosen).await;
    let entries = vec![
        ctx.entry("a").await,
        UserSignupEntry::new(User::new("b", "User b"), SignupStatus::Chosen),
    ];

    let report = canceller(&ctx).cancel_entrants(EVENT_ID, &entries).await;
    assert!(!report.is_complete());
    assert_eq!(report.cancelled.len(), 1);
    assert_eq!(report.cancelled[0].user_id, "a");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].user_id, "b");
    assert!(matches!(
        report.failures[0].error,
        SignupError::SignupNotFound { .. }
    ));
    assert_eq!(ctx.status_of("a").await, Some(SignupStatus::Cancelled));
}

#[tokio::test]
async fn test_bulk_cancel_survives_store_failures() {
    let ctx = TestContext::new();
    for user in ["a", "b", "c"] {
        ctx.seed(user, SignupStatus::Waitlisted).await;
    }
    let faulty = Arc::new(FaultySignupStore::new(ctx.signups.clone()));
    faulty.fail_updates_for("b");
    faulty.fail_lookups_for("c");
    let canceller = EntrantCanceller::new(faulty);

    let entries = vec![
        ctx.entry("a").await,
        ctx.entry("b").await,
        ctx.entry("c").await,
    ];
    let report = canceller.cancel_entrants(EVENT_ID, &entries).await;
    assert_eq!(report.cancelled.len(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.error.is_retryable()));

    assert_eq!(ctx.status_of("a").await, Some(SignupStatus::Cancelled));
    assert_eq!(ctx.status_of("b").await, Some(SignupStatus::Waitlisted));
    assert_eq!(ctx.status_of("c").await, Some(SignupStatus::Waitlisted));
}

#[tokio::test]
async fn test_cancel_selected_roster() {
    let ctx = TestContext::new();
    ctx.seed("a", SignupStatus::Chosen).await;
    ctx.seed("b", SignupStatus::Chosen).await;
    ctx.seed("c", SignupStatus::Enrolled).await;

    let projector = SignupProjector::new(ctx.signups.clone(), ctx.users.clone());
    let chosen = SignupFilter::only(&[SignupStatus::Chosen]);
    let roster = projector
        .list_entries_for_event(EVENT_ID, &chosen)
        .await
        .unwrap();

    let report = canceller(&ctx).cancel_entrants(EVENT_ID, &roster).await;
    assert!(report.is_complete());
    assert_eq!(report.cancelled.len(), 2);
    assert!(projector
        .list_entries_for_event(EVENT_ID, &chosen)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(ctx.status_of("c").await, Some(SignupStatus::Enrolled));
}
