use serde::Deserialize;
use serde_json::Value;

/// Key paths into a v1.1-style status payload.
pub mod keys {
    pub const USER: &str = "user";
    pub const TEXT: &str = "text";
    pub const CREATED: &str = "created_at";
    pub const ID: &str = "id_str";
    pub const MEDIA: &str = "entities.media";
    pub const HASHTAGS: &str = "entities.hashtags";
    pub const URLS: &str = "entities.urls";
    pub const USER_MENTIONS: &str = "entities.user_mentions";
}

/// Walk a dotted key path (`"entities.hashtags"`) through nested objects.
/// Returns `None` as soon as a segment is missing or the current node is not
/// an object.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = value;
    for key in path.split('.') {
        node = node.get(key)?;
    }
    Some(node)
}

/// Typed view of one raw entity descriptor. Only the reported index pair
/// matters to the locator; the rest of the descriptor stays in the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub indices: Vec<i64>,
}

impl RawEntity {
    pub fn from_json(value: &Value) -> Option<RawEntity> {
        serde_json::from_value(value.clone()).ok()
    }

    /// The reported `[start, end]` pair: first and last element of
    /// `indices`. A single-element array yields an empty span, which the
    /// locator rejects downstream.
    pub fn reported_span(&self) -> Option<(i64, i64)> {
        Some((*self.indices.first()?, *self.indices.last()?))
    }
}
