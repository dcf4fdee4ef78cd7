//! Opaque user-id encoding for emailed links.
//!
//! The id travels as URL-safe, unpadded base64 of its 16 raw bytes.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use uuid::Uuid;

pub fn encode_uid(user_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(user_id.as_bytes())
}

/// Returns `None` for anything that is not the encoding of a UUID.
pub fn decode_uid(encoded: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    Uuid::from_slice(&bytes).ok()
}
