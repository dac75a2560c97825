//! Opaque pagination cursors and global node identifiers.
//!
//! A cursor is the base64 encoding of a fixed marker followed by the
//! location's internal identifier. Callers must treat it as opaque; only
//! [`decode`] gives it meaning.

use crate::{error::Result, Error, LocationId};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker prepended to the identifier before encoding.
pub const CURSOR_PREFIX: &str = "arrayconnection:";

/// Type name used in global node identifiers.
pub const NODE_TYPE: &str = "Location";

/// An opaque pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from a caller. No validation happens here.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode this cursor back into an identifier.
    pub fn decode(&self) -> Result<LocationId> {
        decode(&self.0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can be addressed by a pagination cursor.
pub trait Cursored {
    /// Internal identifier the cursor encodes.
    fn cursor_id(&self) -> LocationId;

    fn cursor(&self) -> Cursor {
        encode(self.cursor_id())
    }
}

/// Encode an internal identifier as a cursor.
pub fn encode(id: LocationId) -> Cursor {
    Cursor(STANDARD.encode(format!("{CURSOR_PREFIX}{id}")))
}

/// Decode a cursor token into the internal identifier it carries.
pub fn decode(token: &str) -> Result<LocationId> {
    let malformed = || Error::MalformedCursor(token.to_string());

    let bytes = STANDARD.decode(token).map_err(|_| malformed())?;
    let text = String::from_utf8(bytes).map_err(|_| malformed())?;
    text.strip_prefix(CURSOR_PREFIX)
        .and_then(|id| id.parse::<LocationId>().ok())
        .ok_or_else(malformed)
}

/// Encode a relay-style global identifier (`Location:<id>`).
pub fn encode_global_id(id: LocationId) -> String {
    STANDARD.encode(format!("{NODE_TYPE}:{id}"))
}

/// Decode a global identifier produced by [`encode_global_id`].
pub fn decode_global_id(global_id: &str) -> Result<LocationId> {
    let malformed = || Error::MalformedCursor(global_id.to_string());

    let bytes = STANDARD.decode(global_id).map_err(|_| malformed())?;
    let text = String::from_utf8(bytes).map_err(|_| malformed())?;
    match text.split_once(':') {
        Some((NODE_TYPE, id)) => id.parse().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode(42), encode(42));
        assert_ne!(encode(42), encode(43));
    }

    #[test]
    fn known_encoding() {
        // base64("arrayconnection:1")
        assert_eq!(encode(1).as_str(), "YXJyYXljb25uZWN0aW9uOjE=");
    }

    #[test]
    fn decode_roundtrip() {
        assert_eq!(decode(encode(123).as_str()).unwrap(), 123);
        assert_eq!(encode(9).decode().unwrap(), 9);
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(decode("!!!"), Err(Error::MalformedCursor(_))));
    }

    #[test]
    fn decode_rejects_missing_prefix() {
        let token = STANDARD.encode("other:5");
        assert!(matches!(decode(&token), Err(Error::MalformedCursor(_))));
    }

    #[test]
    fn decode_rejects_non_numeric_id() {
        let token = STANDARD.encode(format!("{CURSOR_PREFIX}abc"));
        assert!(matches!(decode(&token), Err(Error::MalformedCursor(_))));
    }

    #[test]
    fn decode_rejects_empty() {
        assert!(matches!(decode(""), Err(Error::MalformedCursor(_))));
    }

    #[test]
    fn cursor_serializes_as_plain_string() {
        let json = serde_json::to_string(&encode(1)).unwrap();
        assert_eq!(json, "\"YXJyYXljb25uZWN0aW9uOjE=\"");
    }

    #[test]
    fn global_id_roundtrip() {
        let id = encode_global_id(77);
        assert_eq!(decode_global_id(&id).unwrap(), 77);
    }

    #[test]
    fn global_id_rejects_other_types() {
        let id = STANDARD.encode("Vehicle:77");
        assert!(decode_global_id(&id).is_err());
    }

    proptest! {
        #[test]
        fn prop_cursor_roundtrip(id in any::<i64>()) {
            prop_assert_eq!(decode(encode(id).as_str()).unwrap(), id);
        }

        #[test]
        fn prop_cursor_injective(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            prop_assert_ne!(encode(a), encode(b));
        }
    }
}
