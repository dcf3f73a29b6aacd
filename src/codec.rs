//! Per-field encodings used by [`keyed_record!`](crate::keyed_record).
//!
//! Each module exposes `encode` and `decode`; the macro picks one by name.

/// Stored verbatim.
pub mod text {
    use crate::error::CodecError;

    pub fn encode(value: &str) -> Result<String, CodecError> {
        Ok(value.to_string())
    }

    pub fn decode(raw: &str) -> Result<String, CodecError> {
        Ok(raw.to_string())
    }
}

/// Stored as a JSON document.
pub mod json {
    use crate::error::CodecError;
    use serde::{de::DeserializeOwned, Serialize};

    pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }

    pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keeps_brackets_and_quotes() {
        let message = "Help! \"now\" at [location]".to_string();
        assert_eq!(text::encode(&message).unwrap(), message);
        assert_eq!(text::decode(&message).unwrap(), message);
    }

    #[test]
    fn json_booleans_match_browser_format() {
        assert_eq!(json::encode(&false).unwrap(), "false");
        assert!(json::decode::<bool>("true").unwrap());
        assert!(json::decode::<bool>("yes").is_err());
    }
}
