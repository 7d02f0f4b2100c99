//! Model layer for clients that render tweets.
//!
//! Takes the loosely-typed JSON a status endpoint returns and produces a
//! [`Tweet`]: the text, its author, its timestamp, and every hashtag, URL,
//! and user mention located inside the text. Entity locations come back in
//! two coordinate systems: code-point offsets for slicing the text, and
//! UTF-16 unit offsets for the rendering side. The API computes its
//! reported offsets against its own reconstruction of the text, which
//! drifts by a position or two around emoji and accented characters, so
//! [`entities`] reconciles the offsets instead of trusting them.
//!
//! Fetching payloads and rendering them are the caller's problem; this crate
//! is a pure, synchronous transformation with no shared state.

pub mod entities;
pub mod media;
pub mod payload;
pub mod tweet;
pub mod user;

pub use entities::{IndexedKeyword, SearchRange};
pub use media::MediaItem;
pub use tweet::{decode_timeline, Tweet};
pub use user::User;
