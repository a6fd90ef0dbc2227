use eventapp_shared::models::{Event, Notification, NotificationKind, Signup, SignupStatus};
use eventapp_shared::store::{EventStore, NotificationStore, SignupStore};
use futures::future::join_all;
use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::{Result, SignupError};

/// Which half of an invitation failed for one drawn entrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStage {
    /// The signup could not be moved to Chosen; no invitation was sent.
    PersistChosen,
    /// The signup is Chosen but its invitation was not created. Recover with
    /// [`LotteryDrawer::resend_invitation`].
    SendInvitation,
}

#[derive(Debug)]
pub struct DrawFailure {
    pub user_id: String,
    pub stage: DrawStage,
    pub error: SignupError,
}

#[derive(Debug, Default)]
pub struct LotteryOutcome {
    /// Signups persisted as Chosen, whether or not their invitation went out.
    pub chosen: Vec<Signup>,
    pub invitations: Vec<Notification>,
    pub failures: Vec<DrawFailure>,
}

impl LotteryOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

enum DrawResult {
    Invited(Signup, Notification),
    NotInvited(Signup, SignupError),
    NotChosen(String, SignupError),
}

/// Picks `count` distinct entries uniformly at random.
pub fn select_entrants<R: Rng + ?Sized>(pool: &[Signup], count: usize, rng: &mut R) -> Vec<Signup> {
    pool.choose_multiple(rng, count).cloned().collect()
}

/// Capacity left once enrolled entrants are counted. `None` when unbounded.
pub async fn remaining_capacity(signups: &dyn SignupStore, event: &Event) -> Result<Option<usize>> {
    let Some(max_entrants) = event.max_entrants else {
        return Ok(None);
    };
    let enrolled = signups
        .get_signups_by_event(&event.id, &[SignupStatus::Enrolled])
        .await?
        .len();
    Ok(Some((max_entrants as usize).saturating_sub(enrolled)))
}

/// Runs lottery draws over an event's waitlist and sends the invitations.
#[derive(Clone)]
pub struct LotteryDrawer {
    signups: Arc<dyn SignupStore>,
    notifications: Arc<dyn NotificationStore>,
    events: Arc<dyn EventStore>,
    config: ServiceConfig,
}

impl LotteryDrawer {
    pub fn new(
        signups: Arc<dyn SignupStore>,
        notifications: Arc<dyn NotificationStore>,
        events: Arc<dyn EventStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            signups,
            notifications,
            events,
            config,
        }
    }

    async fn load_event(&self, event_id: &str) -> Result<Event> {
        self.events
            .get_event(event_id)
            .await?
            .ok_or_else(|| SignupError::EventNotFound(event_id.to_string()))
    }

    /// Signups eligible for a draw.
    pub async fn draw_pool(&self, event_id: &str) -> Result<Vec<Signup>> {
        let statuses: &[SignupStatus] = if self.config.exclude_cancelled_from_draw {
            &[SignupStatus::Waitlisted]
        } else {
            &[SignupStatus::Waitlisted, SignupStatus::Cancelled]
        };
        Ok(self.signups.get_signups_by_event(event_id, statuses).await?)
    }

    pub async fn remaining_capacity(&self, event_id: &str) -> Result<Option<usize>> {
        let event = self.load_event(event_id).await?;
        remaining_capacity(self.signups.as_ref(), &event).await
    }

    /// Draws `draw_count` entrants at random from the waitlist, moves them to
    /// Chosen and sends each an invitation.
    ///
    /// The count is never clamped: asking for more than the pool or the
    /// remaining capacity fails before anything is written. Once the draw is
    /// made, each entrant is processed independently and a failure for one
    /// does not undo the others.
    pub async fn draw_lottery(&self, event_id: &str, draw_count: usize) -> Result<LotteryOutcome> {
        if draw_count == 0 {
            return Err(SignupError::InvalidDrawCount);
        }

        let event = self.load_event(event_id).await?;
        let pool = self.draw_pool(event_id).await?;
        if draw_count > pool.len() {
            warn!(
                "Rejecting draw of {} for event_id={}: only {} eligible",
                draw_count,
                event_id,
                pool.len()
            );
            return Err(SignupError::DrawCountTooLarge {
                requested: draw_count,
                available: pool.len(),
            });
        }
        if let Some(remaining) = remaining_capacity(self.signups.as_ref(), &event).await? {
            if draw_count > remaining {
                warn!(
                    "Rejecting draw of {} for event_id={}: {} spots remain",
                    draw_count, event_id, remaining
                );
                return Err(SignupError::ExceedsCapacity {
                    requested: draw_count,
                    remaining,
                });
            }
        }

        let selected = select_entrants(&pool, draw_count, &mut rand::thread_rng());
        info!(
            "Drew {} of {} entrants for event_id={}",
            selected.len(),
            pool.len(),
            event_id
        );

        let results = join_all(
            selected
                .into_iter()
                .map(|signup| self.choose_and_invite(&event, signup)),
        )
        .await;

        let mut outcome = LotteryOutcome::default();
        for result in results {
            match result {
                DrawResult::Invited(signup, notification) => {
                    outcome.chosen.push(signup);
                    outcome.invitations.push(notification);
                }
                DrawResult::NotInvited(signup, error) => {
                    outcome.failures.push(DrawFailure {
                        user_id: signup.user_id.clone(),
                        stage: DrawStage::SendInvitation,
                        error,
                    });
                    outcome.chosen.push(signup);
                }
                DrawResult::NotChosen(user_id, error) => outcome.failures.push(DrawFailure {
                    user_id,
                    stage: DrawStage::PersistChosen,
                    error,
                }),
            }
        }

        info!(
            "Lottery for event_id={} finished: {} chosen, {} invited, {} failures",
            event_id,
            outcome.chosen.len(),
            outcome.invitations.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn choose_and_invite(&self, event: &Event, mut signup: Signup) -> DrawResult {
        let user_id = signup.user_id.clone();
        let previous = signup.to_chosen();
        let chosen = match self.signups.update_signup(signup).await {
            Ok(chosen) => chosen,
            Err(e) => {
                error!(
                    "Failed to mark user_id={} as chosen for event_id={}: {}",
                    user_id, event.id, e
                );
                let err = SignupError::from_signup_write(e, &user_id, &event.id);
                return DrawResult::NotChosen(user_id, err);
            }
        };
        debug!(
            "user_id={} moved from {} to Chosen for event_id={}",
            user_id, previous, event.id
        );

        match self.send_invitation(event, &user_id).await {
            Ok(notification) => DrawResult::Invited(chosen, notification),
            Err(e) => {
                // The Chosen status stays; the invitation can be resent.
                error!(
                    "user_id={} is Chosen for event_id={} but the invitation failed: {}",
                    user_id, event.id, e
                );
                DrawResult::NotInvited(chosen, e)
            }
        }
    }

    async fn send_invitation(&self, event: &Event, user_id: &str) -> Result<Notification> {
        let mut notification = Notification::invite(
            user_id,
            &self.config.invite_title,
            &self.config.invite_message(&event.event_name),
            &event.id,
        );
        let id = self
            .notifications
            .create_notification(notification.clone())
            .await?;
        notification.document_id = Some(id);
        Ok(notification)
    }

    /// Makes sure a Chosen entrant holds an invitation for the event.
    ///
    /// An invitation still waiting in the inbox is returned as-is; otherwise
    /// a new one is sent.
    pub async fn resend_invitation(&self, user_id: &str, event_id: &str) -> Result<Notification> {
        let signup = self
            .signups
            .get_signup(user_id, event_id)
            .await?
            .ok_or_else(|| SignupError::signup_not_found(user_id, event_id))?;
        if signup.status != SignupStatus::Chosen {
            return Err(SignupError::InvalidTransition {
                from: signup.status,
                action: "resend an invitation for",
            });
        }

        let pending = self
            .notifications
            .get_notifications_for_user(user_id)
            .await?
            .into_iter()
            .find(|n| n.kind == NotificationKind::Invite && n.event_id.as_deref() == Some(event_id));
        if let Some(notification) = pending {
            debug!(
                "user_id={} already holds an invitation for event_id={}, not resending",
                user_id, event_id
            );
            return Ok(notification);
        }

        let event = self.load_event(event_id).await?;
        let notification = self.send_invitation(&event, user_id).await?;
        info!(
            "Resent invitation to user_id={} for event_id={}",
            user_id, event_id
        );
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Signup> {
        (0..n)
            .map(|i| Signup::waitlisted(&format!("u{}", i), "e1", None))
            .collect()
    }

    #[test]
    fn test_select_is_without_replacement() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_entrants(&pool(10), 6, &mut rng);
        let ids: HashSet<_> = picked.iter().map(|s| s.user_id.clone()).collect();
        assert_eq!(picked.len(), 6);
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_select_whole_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_entrants(&pool(3), 3, &mut rng).len(), 3);
    }

    #[test]
    fn test_every_entrant_can_be_drawn() {
        let entrants = pool(5);
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            for s in select_entrants(&entrants, 1, &mut rng) {
                seen.insert(s.user_id);
            }
        }
        assert_eq!(seen.len(), 5);
    }
}
