//! Encoding operations

use crate::ops::{parse_args, ArgMap, OpError};
use crate::registry::Operation;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

const ENCODINGS: &[&str] = &["utf-8", "ascii"];
const ERROR_STRATEGIES: &[&str] = &["strict", "ignore", "replace"];

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EncodeTextArgs {
    encoding: String,
    errors: String,
}

impl Default for EncodeTextArgs {
    fn default() -> Self {
        EncodeTextArgs {
            encoding: "utf-8".to_string(),
            errors: "strict".to_string(),
        }
    }
}

/// Encode the text with the selected encoding and return it base64-encoded.
///
/// `errors` controls what happens to characters the encoding cannot
/// represent: "strict" fails, "ignore" drops them, "replace" substitutes '?'.
pub fn encode_text(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: EncodeTextArgs = parse_args(args)?;

    if !ENCODINGS.contains(&args.encoding.as_str()) {
        return Err(OpError::InvalidChoice {
            param: "encoding",
            value: args.encoding,
            valid: ENCODINGS,
        });
    }
    if !ERROR_STRATEGIES.contains(&args.errors.as_str()) {
        return Err(OpError::InvalidChoice {
            param: "errors",
            value: args.errors,
            valid: ERROR_STRATEGIES,
        });
    }

    let bytes = match args.encoding.as_str() {
        "utf-8" => text.as_bytes().to_vec(),
        _ => {
            // ascii
            let mut out = Vec::with_capacity(text.len());
            for ch in text.chars() {
                if ch.is_ascii() {
                    out.push(ch as u8);
                } else {
                    match args.errors.as_str() {
                        "strict" => {
                            return Err(OpError::EncodingFailed(format!(
                                "character '{}' is not representable in ascii",
                                ch
                            )))
                        }
                        "ignore" => {}
                        _ => out.push(b'?'),
                    }
                }
            }
            out
        }
    };

    Ok(STANDARD.encode(bytes))
}

pub fn operations() -> Vec<Operation> {
    vec![Operation::new(
        "encode_text",
        "Encode the text and return the base64 representation.",
        encode_text,
    )]
}
