use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::debug;

use crate::entities::IndexedKeyword;
use crate::media::MediaItem;
use crate::payload::{keys, lookup};
use crate::user::User;

/// The fixed format the API reports `created_at` in, e.g.
/// `"Wed Aug 27 13:08:45 +0000 2008"`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One decoded tweet: the text plus everything the rendering side needs to
/// style it. A value record, built once from a payload and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub text: String,
    pub user: User,
    pub created: DateTime<FixedOffset>,
    pub id: Option<String>,
    pub media: Vec<MediaItem>,
    pub hashtags: Vec<IndexedKeyword>,
    pub urls: Vec<IndexedKeyword>,
    pub user_mentions: Vec<IndexedKeyword>,
}

impl Tweet {
    /// Decode one status payload.
    ///
    /// `user`, `text`, and `created_at` are required; if any is missing or
    /// malformed the whole decode returns `None` and no partial tweet ever
    /// escapes. A bad media or entity entry only shortens its list.
    pub fn from_json(data: &Value) -> Option<Tweet> {
        let user = User::from_json(lookup(data, keys::USER)?)?;
        let text = lookup(data, keys::TEXT)?.as_str()?.to_string();
        let created = parse_created_at(lookup(data, keys::CREATED)?.as_str()?)?;
        let id = lookup(data, keys::ID)
            .and_then(Value::as_str)
            .map(str::to_string);

        let media = entity_array(data, keys::MEDIA)
            .iter()
            .filter_map(MediaItem::from_json)
            .collect();
        let hashtags = indexed_keywords(data, keys::HASHTAGS, &text, "#");
        let urls = indexed_keywords(data, keys::URLS, &text, "h");
        let user_mentions = indexed_keywords(data, keys::USER_MENTIONS, &text, "@");

        Some(Tweet {
            text,
            user,
            created,
            id,
            media,
            hashtags,
            urls,
            user_mentions,
        })
    }
}

/// Decode a timeline payload: an array of statuses, in order, with
/// undecodable entries skipped.
pub fn decode_timeline(data: &Value) -> Vec<Tweet> {
    data.as_array()
        .map(|items| items.iter().filter_map(Tweet::from_json).collect())
        .unwrap_or_default()
}

fn parse_created_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_str(raw, CREATED_AT_FORMAT) {
        Ok(created) => Some(created),
        Err(err) => {
            debug!(%raw, %err, "unparseable created_at");
            None
        }
    }
}

fn entity_array<'a>(data: &'a Value, path: &str) -> &'a [Value] {
    lookup(data, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn indexed_keywords(data: &Value, path: &str, text: &str, prefix: &str) -> Vec<IndexedKeyword> {
    entity_array(data, path)
        .iter()
        .filter_map(|item| IndexedKeyword::from_json(item, text, Some(prefix)))
        .collect()
}

impl fmt::Display for Tweet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}\n{}\nhashtags: [{}]\nurls: [{}]\nuser_mentions: [{}]",
            self.user,
            self.created,
            self.text,
            keyword_list(&self.hashtags),
            keyword_list(&self.urls),
            keyword_list(&self.user_mentions),
        )?;
        if let Some(id) = &self.id {
            write!(f, "\nid: {id}")?;
        }
        Ok(())
    }
}

fn keyword_list(keywords: &[IndexedKeyword]) -> String {
    keywords
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::char_slice;
    use serde_json::json;

    const TEXT: &str = "Hello #world from @alice see http://x.co";

    fn status() -> Value {
        json!({
            "user": {"screen_name": "alice", "name": "Alice A"},
            "text": TEXT,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "id_str": "1001",
            "entities": {
                "hashtags": [{"text": "world", "indices": [6, 12]}],
                "urls": [{"url": "http://x.co", "indices": [29, 40]}],
                "user_mentions": [{"screen_name": "alice", "indices": [18, 24]}]
            }
        })
    }

    #[test]
    fn test_decode_full_status() {
        let tweet = Tweet::from_json(&status()).unwrap();
        assert_eq!(tweet.text, TEXT);
        assert_eq!(tweet.user.screen_name, "alice");
        assert_eq!(tweet.id.as_deref(), Some("1001"));
        assert_eq!(tweet.hashtags.len(), 1);
        assert_eq!(tweet.hashtags[0].keyword, "#world");
        assert_eq!(tweet.urls.len(), 1);
        assert!(tweet.urls[0].keyword.starts_with('h'));
        assert_eq!(tweet.user_mentions.len(), 1);
        assert_eq!(tweet.user_mentions[0].keyword, "@alice");
    }

    #[test]
    fn test_decoded_ranges_slice_back_to_keywords() {
        let tweet = Tweet::from_json(&status()).unwrap();
        let all = [&tweet.hashtags, &tweet.urls, &tweet.user_mentions];
        for keyword in all.iter().flat_map(|list| list.iter()) {
            assert!(!keyword.text_range.is_empty());
            assert_eq!(
                keyword.keyword,
                char_slice(&tweet.text, keyword.text_range.clone()).unwrap()
            );
            assert!(keyword.search_range.is_found());
        }
        // The three entities occupy disjoint stretches of the text.
        let mut ranges: Vec<_> = all
            .iter()
            .flat_map(|list| list.iter().map(|k| k.text_range.clone()))
            .collect();
        ranges.sort_by_key(|r| r.start);
        for pair in ranges.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_decode_missing_user_fails() {
        let mut data = status();
        data.as_object_mut().unwrap().remove("user");
        assert!(Tweet::from_json(&data).is_none());
    }

    #[test]
    fn test_decode_missing_text_fails() {
        let mut data = status();
        data.as_object_mut().unwrap().remove("text");
        assert!(Tweet::from_json(&data).is_none());
    }

    #[test]
    fn test_decode_malformed_created_at_fails() {
        let mut data = status();
        data["created_at"] = json!("2008-08-27T13:08:45Z");
        assert!(Tweet::from_json(&data).is_none());
    }

    #[test]
    fn test_decode_without_id() {
        let mut data = status();
        data.as_object_mut().unwrap().remove("id_str");
        let tweet = Tweet::from_json(&data).unwrap();
        assert_eq!(tweet.id, None);
    }

    #[test]
    fn test_decode_without_entities() {
        let data = json!({
            "user": {"screen_name": "bob", "name": "Bob"},
            "text": "no entities at all",
            "created_at": "Wed Aug 27 13:08:45 +0000 2008"
        });
        let tweet = Tweet::from_json(&data).unwrap();
        assert!(tweet.hashtags.is_empty());
        assert!(tweet.urls.is_empty());
        assert!(tweet.user_mentions.is_empty());
        assert!(tweet.media.is_empty());
    }

    #[test]
    fn test_decode_out_of_bounds_hashtag_dropped() {
        let data = json!({
            "user": {"screen_name": "bob", "name": "Bob"},
            "text": "twenty characters ok",
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "entities": {"hashtags": [{"text": "nope", "indices": [100, 105]}]}
        });
        let tweet = Tweet::from_json(&data).unwrap();
        assert!(tweet.hashtags.is_empty());
    }

    #[test]
    fn test_decode_bad_entity_does_not_poison_good_ones() {
        let mut data = status();
        data["entities"]["hashtags"] = json!([
            {"text": "nope", "indices": [38, 2]},
            {"text": "world", "indices": [6, 12]},
            {"text": "nope"}
        ]);
        let tweet = Tweet::from_json(&data).unwrap();
        assert_eq!(tweet.hashtags.len(), 1);
        assert_eq!(tweet.hashtags[0].keyword, "#world");
    }

    #[test]
    fn test_decode_media_entries() {
        let mut data = status();
        data["entities"]["media"] = json!([
            {"media_url_https": "https://pbs.example/a.jpg", "sizes": {"small": {"w": 2, "h": 1}}},
            {"sizes": {"small": {"w": 2, "h": 1}}}
        ]);
        let tweet = Tweet::from_json(&data).unwrap();
        assert_eq!(tweet.media.len(), 1);
        assert_eq!(tweet.media[0].url, "https://pbs.example/a.jpg");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let data = status();
        assert_eq!(Tweet::from_json(&data), Tweet::from_json(&data));
    }

    #[test]
    fn test_decode_timeline_skips_bad_entries() {
        let timeline = json!([
            status(),
            {"text": "no user or date"},
            status()
        ]);
        let tweets = decode_timeline(&timeline);
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0], tweets[1]);
    }

    #[test]
    fn test_decode_timeline_non_array() {
        assert!(decode_timeline(&json!({"statuses": []})).is_empty());
    }

    #[test]
    fn test_display_lists_entities() {
        let tweet = Tweet::from_json(&status()).unwrap();
        let rendered = tweet.to_string();
        assert!(rendered.starts_with("@alice (Alice A) - "));
        assert!(rendered.contains(TEXT));
        assert!(rendered.contains("hashtags: [#world (6, 11)]"));
        assert!(rendered.contains("user_mentions: [@alice"));
        assert!(rendered.ends_with("id: 1001"));
    }
}
