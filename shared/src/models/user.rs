use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    /// The user asked not to receive organizer messages.
    #[serde(default)]
    pub notification_opt_out: bool,
}

impl User {
    pub fn new(user_id: &str, name: &str) -> Self {
        User {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: String::new(),
            phone_number: String::new(),
            notification_opt_out: false,
        }
    }
}
