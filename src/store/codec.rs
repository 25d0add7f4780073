//! Opaque per-cookie blob encoding.
//!
//! A record is serialized to JSON and rendered as upper-case hex, two
//! characters per byte. Decoding is lenient at the hex layer (bad digits
//! become zero nibbles) and strict at the JSON layer: anything that does not
//! deserialize is treated as a missing entry.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cookie::CookieRecord;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: String,
    expiry: Option<SystemTime>,
    secure: bool,
    http_only: bool,
}

impl StoredCookie {
    fn from_record(record: &CookieRecord) -> Self {
        Self {
            name: record.name.clone(),
            value: record.value().to_string(),
            domain: record.domain.clone(),
            path: record.path.clone(),
            expiry: record.expiry,
            secure: record.secure,
            http_only: record.http_only,
        }
    }

    fn into_record(self) -> CookieRecord {
        let mut record = CookieRecord::new(self.name, self.value).with_path(self.path);
        record.domain = self.domain;
        record.expiry = self.expiry;
        record.secure = self.secure;
        record.http_only = self.http_only;
        record
    }
}

/// Encodes a record as an upper-case hex blob.
///
/// Returns `None` when serialization fails (for example an expiry before the
/// unix epoch); the caller persists nothing for that write.
#[must_use]
pub fn encode_cookie(record: &CookieRecord) -> Option<String> {
    match serde_json::to_vec(&StoredCookie::from_record(record)) {
        Ok(bytes) => Some(hex::encode_upper(bytes)),
        Err(error) => {
            warn!(name = %record.name, %error, "failed to encode cookie");
            None
        }
    }
}

/// Decodes a blob produced by [`encode_cookie`].
///
/// Returns `None` when the blob does not deserialize.
#[must_use]
pub fn decode_cookie(encoded: &str) -> Option<CookieRecord> {
    let bytes = hex_decode_lenient(encoded);
    match serde_json::from_slice::<StoredCookie>(&bytes) {
        Ok(stored) => Some(stored.into_record()),
        Err(error) => {
            warn!(%error, blob_len = encoded.len(), "failed to decode persisted cookie");
            None
        }
    }
}

/// Strict decode first; on bad digits or odd length, two characters per
/// byte with bad digits as zero nibbles and an odd trailing character ignored.
fn hex_decode_lenient(encoded: &str) -> Vec<u8> {
    if let Ok(bytes) = hex::decode(encoded) {
        return bytes;
    }
    encoded
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| (hex_nibble(pair[0]) << 4) | hex_nibble(pair[1]))
        .collect()
}

fn hex_nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}
