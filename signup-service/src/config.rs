use log::warn;
use std::env;

const DEFAULT_INVITE_TITLE: &str = "You've been selected!";
const DEFAULT_INVITE_MESSAGE: &str =
    "You were drawn in the lottery for \"{event}\". Accept or decline your spot.";

/// Tunables for the signup services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Leave cancelled entrants out of lottery draws. When false, a cancelled
    /// entrant can be drawn again and becomes Chosen.
    pub exclude_cancelled_from_draw: bool,
    pub invite_title: String,
    /// `{event}` is replaced with the event name.
    pub invite_message_template: String,
    /// Skip organizer messages to users who opted out of notifications.
    pub respect_notification_opt_out: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            exclude_cancelled_from_draw: true,
            invite_title: DEFAULT_INVITE_TITLE.to_string(),
            invite_message_template: DEFAULT_INVITE_MESSAGE.to_string(),
            respect_notification_opt_out: true,
        }
    }
}

impl ServiceConfig {
    /// Reads overrides from the environment, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            exclude_cancelled_from_draw: env_flag(
                "EXCLUDE_CANCELLED_FROM_DRAW",
                defaults.exclude_cancelled_from_draw,
            ),
            invite_title: env::var("INVITE_TITLE").unwrap_or(defaults.invite_title),
            invite_message_template: env::var("INVITE_MESSAGE_TEMPLATE")
                .unwrap_or(defaults.invite_message_template),
            respect_notification_opt_out: env_flag(
                "RESPECT_NOTIFICATION_OPT_OUT",
                defaults.respect_notification_opt_out,
            ),
        }
    }

    pub fn invite_message(&self, event_name: &str) -> String {
        self.invite_message_template.replace("{event}", event_name)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            warn!(
                "Ignoring unparseable {}={:?}, using default {}",
                name, raw, default
            );
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
