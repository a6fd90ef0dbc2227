//! Signup lifecycle for events with a capped enrollment: waitlists, lottery
//! draws, invitation responses and organizer cancellations.
//!
//! Every component takes its store collaborators at construction time; see
//! [`eventapp_shared::store`] for the traits and the in-memory implementations.

pub mod cancellation;
pub mod config;
pub mod error;
pub mod lottery;
pub mod messaging;
pub mod projection;
pub mod responses;
pub mod view;
pub mod waitlist;

pub use cancellation::{CancellationReport, EntrantCanceller};
pub use config::ServiceConfig;
pub use error::{Result, SignupError};
pub use lottery::{DrawFailure, DrawStage, LotteryDrawer, LotteryOutcome};
pub use messaging::{EntrantMessenger, MessagingReport};
pub use projection::{EntryFeed, SignupProjector, UserSignupEntry};
pub use responses::InvitationResponder;
pub use view::EntrantsView;
pub use waitlist::WaitlistManager;

#[cfg(test)]
mod tests;
