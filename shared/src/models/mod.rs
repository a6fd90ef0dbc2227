pub mod event;
pub mod filter;
pub mod notification;
pub mod signup;
pub mod status;
pub mod user;

pub use event::Event;
pub use filter::SignupFilter;
pub use notification::{Notification, NotificationKind};
pub use signup::{GeoPoint, Signup, SignupRecord};
pub use status::{SignupFlags, SignupStatus};
pub use user::User;
