//! Text operation library
//!
//! Pure, stateless string transforms, split into capability groups. Every
//! group module exports `operations()`, an explicit manifest of the
//! operations it makes available to the registry; anything not listed there
//! (tokenizer helpers, static word tables) stays private to the crate.
//!
//! All operations share one shape: `fn(&str, &ArgMap) -> Result<String,
//! OpError>`. The argument map carries the operation's named parameters as
//! JSON values; each operation deserializes it into a typed record with
//! `deny_unknown_fields`, so an unknown or mistyped argument is rejected
//! before the text is touched.

pub mod encoder;
pub mod flattener;
pub mod normalizer;
pub mod segmenter;
pub mod transformer;

mod contractions;
mod stopwords;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Named arguments for one operation, as decoded from a request
pub type ArgMap = Map<String, Value>;

/// The uniform callable shape every registered operation has
pub type OpFn = fn(&str, &ArgMap) -> Result<String, OpError>;

/// Errors signaled by individual operations
#[derive(Debug, Clone, PartialEq)]
pub enum OpError {
    /// The argument record did not match the operation's schema
    InvalidArguments(String),
    /// A mode-style argument had a value outside the supported set
    InvalidChoice {
        param: &'static str,
        value: String,
        valid: &'static [&'static str],
    },
    /// Text could not be encoded under the requested strategy
    EncodingFailed(String),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpError::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            OpError::InvalidChoice {
                param,
                value,
                valid,
            } => write!(
                f,
                "Invalid {}: '{}'. Valid options are {}.",
                param,
                value,
                valid.join(", ")
            ),
            OpError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for OpError {}

/// Deserialize an argument map into an operation's typed argument record
pub(crate) fn parse_args<T: DeserializeOwned>(args: &ArgMap) -> Result<T, OpError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| OpError::InvalidArguments(e.to_string()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ArgMap;
    use serde_json::Value;

    /// Build an `ArgMap` from a `serde_json::json!` object literal
    pub fn args(value: Value) -> ArgMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("argument literal must be a JSON object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_error_display() {
        let err = OpError::InvalidChoice {
            param: "mode",
            value: "sideways".to_string(),
            valid: &["up", "down"],
        };
        assert_eq!(
            format!("{}", err),
            "Invalid mode: 'sideways'. Valid options are up, down."
        );

        let err = OpError::InvalidArguments("unknown field `foo`".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid arguments: unknown field `foo`"
        );

        let err = OpError::EncodingFailed("not ascii".to_string());
        assert_eq!(format!("{}", err), "Encoding failed: not ascii");
    }
}
