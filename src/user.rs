use std::fmt;

use serde_json::Value;

/// The author of a tweet. The payload contract only guarantees
/// `screen_name` and `name`; everything else is best-effort.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub screen_name: String,
    pub name: String,
    pub id: Option<String>,
    pub verified: bool,
    pub profile_image_url: Option<String>,
}

impl User {
    /// Decode a nested `user` object. `None` when either required field is
    /// missing, which fails the whole tweet upstream.
    pub fn from_json(data: &Value) -> Option<User> {
        let screen_name = data.get("screen_name")?.as_str()?.to_string();
        let name = data.get("name")?.as_str()?.to_string();
        Some(User {
            screen_name,
            name,
            id: data.get("id_str").and_then(Value::as_str).map(str::to_string),
            verified: data.get("verified").and_then(Value::as_bool).unwrap_or(false),
            profile_image_url: data
                .get("profile_image_url_https")
                .or_else(|| data.get("profile_image_url"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} ({})", self.screen_name, self.name)
    }
}
