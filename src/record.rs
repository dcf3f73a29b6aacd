//! Runtime support for records declared with [`keyed_record!`](crate::keyed_record).

use tracing::{debug, warn};

use crate::error::{CodecError, StoreError};
use crate::storage::Storage;

/// A stored value that could not be decoded and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFallback {
    pub key: &'static str,
    pub reason: String,
}

/// Reads and decodes one field.
///
/// A missing key yields `default()`. A value that fails to decode also yields
/// `default()` and is reported in `fallbacks`. Only storage failures are
/// returned as errors.
pub fn read_field<T>(
    storage: &dyn Storage,
    key: &'static str,
    decode: impl FnOnce(&str) -> Result<T, CodecError>,
    default: impl FnOnce() -> T,
    fallbacks: &mut Vec<FieldFallback>,
) -> Result<T, StoreError> {
    let raw = storage.read(key).map_err(|source| StoreError::Storage {
        location: storage.get_path(key),
        source,
    })?;

    let Some(raw) = raw else {
        debug!(key, "no stored value, using default");
        return Ok(default());
    };

    match decode(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(key, error = %e, "malformed stored value, using default");
            fallbacks.push(FieldFallback {
                key,
                reason: e.to_string(),
            });
            Ok(default())
        }
    }
}

/// Writes one already-encoded field.
pub fn write_field(
    storage: &dyn Storage,
    key: &'static str,
    encoded: Result<String, CodecError>,
) -> Result<(), StoreError> {
    let data = encoded.map_err(|source| StoreError::Encode { key, source })?;
    storage
        .write(key, &data)
        .map_err(|source| StoreError::Storage {
            location: storage.get_path(key),
            source,
        })
}
