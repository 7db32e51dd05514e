//! Opaque pagination cursors
//!
//! A cursor is the base64 encoding of a colon-delimited payload whose first
//! field is a version tag:
//!
//! - simple: `<simple-tag>:<id>`
//! - composite: `<composite-tag>:<epochMillis>:<id>`
//!
//! The byte layout is part of the public contract. Tokens issued by earlier
//! releases must keep decoding, so the tags below never change. The like
//! listing once handed out the like id itself as a plain decimal string, and
//! those tokens are still accepted by its composite decoder.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};

use super::error::{PaginationError, PaginationResult};

/// Cursor tags for the restaurant listing.
pub const MESHI_CURSOR: CursorCodec = CursorCodec::new("meshi", "meshi2");

/// Cursor tags for a user's like listing.
pub const LIKE_CURSOR: CursorCodec = CursorCodec::new("like", "like2").accepting_bare_ids();

/// Position carried by a decoded cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCursor {
    /// Id of the record the cursor points at
    pub id: i32,
    /// Ordering value of that record in epoch milliseconds (composite cursors only)
    pub ordering_value_ms: Option<i64>,
}

/// Encoder/decoder for one family of cursors, identified by its two version tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    simple_tag: &'static str,
    composite_tag: &'static str,
    bare_ids: bool,
}

impl CursorCodec {
    pub const fn new(simple_tag: &'static str, composite_tag: &'static str) -> Self {
        Self {
            simple_tag,
            composite_tag,
            bare_ids: false,
        }
    }

    /// Also accept an unencoded decimal id in [`Self::decode_composite`].
    pub const fn accepting_bare_ids(self) -> Self {
        Self {
            bare_ids: true,
            ..self
        }
    }

    /// Encode an id-only cursor.
    pub fn encode_simple(&self, id: i32) -> String {
        BASE64.encode(format!("{}:{}", self.simple_tag, id))
    }

    /// Decode an id-only cursor.
    pub fn decode_simple(&self, token: &str) -> PaginationResult<i32> {
        let payload = decode_payload(token)?;
        match payload.split(':').collect::<Vec<_>>().as_slice() {
            [tag, id] if *tag == self.simple_tag => parse_field(id, "id"),
            _ => Err(PaginationError::invalid_cursor("unexpected cursor shape")),
        }
    }

    /// Encode a cursor for a record ordered by `ordering_value` with `id` as tie-break.
    pub fn encode_composite(&self, ordering_value: DateTime<Utc>, id: i32) -> String {
        BASE64.encode(format!(
            "{}:{}:{}",
            self.composite_tag,
            ordering_value.timestamp_millis(),
            id
        ))
    }

    /// Decode a composite cursor, also accepting simple cursors issued before
    /// the listing switched to composite ordering.
    pub fn decode_composite(&self, token: &str) -> PaginationResult<DecodedCursor> {
        if self.bare_ids && !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(DecodedCursor {
                id: parse_field(token, "id")?,
                ordering_value_ms: None,
            });
        }

        let payload = decode_payload(token)?;
        match payload.split(':').collect::<Vec<_>>().as_slice() {
            [tag, ms, id] if *tag == self.composite_tag => Ok(DecodedCursor {
                id: parse_field(id, "id")?,
                ordering_value_ms: Some(parse_field(ms, "timestamp")?),
            }),
            [tag, id] if *tag == self.simple_tag => Ok(DecodedCursor {
                id: parse_field(id, "id")?,
                ordering_value_ms: None,
            }),
            _ => Err(PaginationError::invalid_cursor("unexpected cursor shape")),
        }
    }
}

fn decode_payload(token: &str) -> PaginationResult<String> {
    let bytes = BASE64
        .decode(token)
        .map_err(|_| PaginationError::invalid_cursor("cursor is not valid base64"))?;
    String::from_utf8(bytes)
        .map_err(|_| PaginationError::invalid_cursor("cursor is not valid UTF-8"))
}

fn parse_field<T: std::str::FromStr>(raw: &str, name: &str) -> PaginationResult<T> {
    raw.parse()
        .map_err(|_| PaginationError::invalid_cursor(format!("cursor {name} is not numeric")))
}
