//! Decoders for raw call-log and contact exports.
//!
//! Both exports are JSON arrays, optionally gzip-compressed. Elements that
//! cannot be read as a record are skipped one at a time; only a payload
//! that is not a JSON array at all is an error.

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Read;
use tracing::{debug, warn};

use crate::analyzers::types::RawCallEntry;
use crate::contacts::RawContact;
use crate::error::Result;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decodes a call-log export into raw entries.
///
/// # Errors
///
/// Returns an error if the payload is not a (possibly gzipped) JSON array.
pub fn parse_call_log(bytes: &[u8]) -> Result<Vec<RawCallEntry>> {
    decode_array(bytes, "call")
}

/// Decodes an address-book export into raw contacts.
///
/// # Errors
///
/// Returns an error if the payload is not a (possibly gzipped) JSON array.
pub fn parse_contacts(bytes: &[u8]) -> Result<Vec<RawContact>> {
    decode_array(bytes, "contact")
}

fn decode_array<T: DeserializeOwned>(bytes: &[u8], kind: &str) -> Result<Vec<T>> {
    let payload = decompress(bytes)?;
    let values: Vec<Value> = serde_json::from_slice(&payload)?;

    let total = values.len();
    let mut records = Vec::with_capacity(total);

    for (position, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!(kind, position, error = %e, "Skipping unreadable record"),
        }
    }

    debug!(kind, total, decoded = records.len(), "Decoded export");
    Ok(records)
}

fn decompress(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut decoded = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(Cow::Owned(decoded))
}
