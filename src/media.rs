use std::fmt;

use serde_json::Value;

/// One media attachment. Opaque to the entity indexer; carried for the
/// rendering side, which needs the image URL and its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub url: String,
    pub aspect_ratio: f64,
}

impl MediaItem {
    /// Decode one `entities.media` entry. A malformed entry yields `None`
    /// and is skipped, never fatal to the tweet.
    pub fn from_json(data: &Value) -> Option<MediaItem> {
        let url = data
            .get("media_url_https")
            .or_else(|| data.get("media_url"))?
            .as_str()?
            .to_string();
        let sizes = data.get("sizes")?;
        let size = sizes.get("small").or_else(|| sizes.get("large"))?;
        let width = size.get("w")?.as_f64()?;
        let height = size.get("h")?.as_f64()?;
        if height <= 0.0 {
            return None;
        }
        Some(MediaItem {
            url,
            aspect_ratio: width / height,
        })
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (aspect ratio {:.2})", self.url, self.aspect_ratio)
    }
}
