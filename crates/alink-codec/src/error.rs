//! Error types for the codecs.
//!
//! Decoding degrades instead of failing: these errors are recorded per entry
//! in a [`DecodeFailure`](crate::collection::DecodeFailure) and logged, never
//! returned from a whole-collection decode.

use alink_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// A stored collection is neither a sequence nor an object.
    #[error("malformed collection at {path}: expected array or object, found {found}")]
    MalformedCollection { path: String, found: &'static str },

    /// A stored entry has no usable link.
    #[error("malformed entry {key}: {reason}")]
    MalformedEntry { key: String, reason: String },

    #[error("invalid link: {0}")]
    Link(#[from] TypeError),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// JSON type name, for diagnostics.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
