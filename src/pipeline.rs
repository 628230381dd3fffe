//! Pipeline execution engine
//!
//! Threads a single text value through an ordered list of named operations,
//! resolving each name against the registry and applying per-operation
//! arguments. The first failure halts the run and the caller sees only that
//! failure, never partial progress. Arguments are keyed by operation name:
//! if the same name appears twice in one pipeline, both occurrences receive
//! the same argument record.

use crate::ops::{ArgMap, OpError};
use crate::registry::OperationRegistry;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Per-operation argument records, keyed by operation name
pub type ArgsByName = HashMap<String, ArgMap>;

/// The preset cleanup sequence applied by [`PipelineRunner::run_default`].
///
/// Callers rely on this exact order; changing it is a behavior change.
pub const DEFAULT_OPERATIONS: [&str; 6] = [
    "expand_contractions",
    "change_case",
    "handle_line_feeds",
    "remove_whitespace",
    "remove_special_characters",
    "remove_punctuation",
];

/// Arguments for the preset sequence: lowercase during the case step
pub fn default_preset_args() -> ArgsByName {
    let mut case_args = ArgMap::new();
    case_args.insert("case".to_string(), Value::String("lower".to_string()));

    let mut by_name = ArgsByName::new();
    by_name.insert("change_case".to_string(), case_args);
    by_name
}

/// Errors during pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A requested operation name matched nothing in the registry
    UnknownOperation { name: String, step: usize },
    /// A resolved operation rejected its input or arguments
    OperationFailed {
        name: String,
        step: usize,
        source: OpError,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnknownOperation { name, step } => {
                write!(f, "Unknown operation '{}' at step {}", name, step)
            }
            PipelineError::OperationFailed { name, step, source } => {
                write!(f, "Operation '{}' failed at step {}: {}", name, step, source)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::UnknownOperation { .. } => None,
            PipelineError::OperationFailed { source, .. } => Some(source),
        }
    }
}

/// Executes ordered operation sequences against a text value
pub struct PipelineRunner {
    registry: OperationRegistry,
}

impl PipelineRunner {
    /// Create a runner over the built-in capability groups
    pub fn new() -> Self {
        PipelineRunner {
            registry: OperationRegistry::with_defaults(),
        }
    }

    /// Create a runner over a custom registry
    pub fn with_registry(registry: OperationRegistry) -> Self {
        PipelineRunner { registry }
    }

    /// The registry this runner resolves against
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Run the named operations in order against `text`.
    ///
    /// Each step receives the previous step's output as its input, plus the
    /// argument record registered under its name (absent means defaults).
    /// An unknown name or a failing operation halts the run at that step;
    /// nothing after it executes and no partial result is returned.
    pub fn run<S: AsRef<str>>(
        &self,
        text: &str,
        operations: &[S],
        args: &ArgsByName,
    ) -> Result<String, PipelineError> {
        let empty = ArgMap::new();
        let mut result = text.to_string();

        for (step, name) in operations.iter().enumerate() {
            let name = name.as_ref();
            let operation =
                self.registry
                    .resolve(name)
                    .ok_or_else(|| PipelineError::UnknownOperation {
                        name: name.to_string(),
                        step,
                    })?;
            let op_args = args.get(name).unwrap_or(&empty);
            result = operation
                .invoke(&result, op_args)
                .map_err(|source| PipelineError::OperationFailed {
                    name: name.to_string(),
                    step,
                    source,
                })?;
        }

        Ok(result)
    }

    /// Run the preset cleanup sequence ([`DEFAULT_OPERATIONS`]) against
    /// `text`
    pub fn run_default(&self, text: &str) -> Result<String, PipelineError> {
        self.run(text, &DEFAULT_OPERATIONS, &default_preset_args())
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-level precondition violations, checked before the engine runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    EmptyText,
    NoOperations,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::EmptyText => write!(f, "No text provided"),
            RequestError::NoOperations => write!(f, "No operations provided"),
        }
    }
}

impl std::error::Error for RequestError {}

/// A decoded pipeline request: input text, ordered operation names, and
/// optional per-operation arguments
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRequest {
    pub text: String,
    pub operations: Vec<String>,
    #[serde(default)]
    pub args: ArgsByName,
}

impl PipelineRequest {
    /// Reject empty text and empty operation lists before any operation is
    /// invoked
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.text.is_empty() {
            return Err(RequestError::EmptyText);
        }
        if self.operations.is_empty() {
            return Err(RequestError::NoOperations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_single_operation() {
        let runner = PipelineRunner::new();
        let result = runner.run("Hello World", &["change_case"], &ArgsByName::new());
        assert_eq!(result.unwrap(), "hello world");
    }

    #[test]
    fn test_run_threads_text_through_steps() {
        let runner = PipelineRunner::new();
        let mut args = ArgsByName::new();
        args.insert(
            "change_case".to_string(),
            match json!({"case": "upper"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        );

        let result = runner
            .run("hello, world 42", &["remove_numbers", "change_case"], &args)
            .unwrap();
        assert_eq!(result, "HELLO, WORLD ");
    }

    #[test]
    fn test_run_unknown_operation_halts_with_step_index() {
        let runner = PipelineRunner::new();
        let result = runner.run(
            "abc",
            &["remove_numbers", "no_such_op", "change_case"],
            &ArgsByName::new(),
        );
        assert_eq!(
            result.unwrap_err(),
            PipelineError::UnknownOperation {
                name: "no_such_op".to_string(),
                step: 1,
            }
        );
    }

    #[test]
    fn test_run_operation_error_carries_name_step_and_cause() {
        let runner = PipelineRunner::new();
        let mut args = ArgsByName::new();
        args.insert(
            "change_case".to_string(),
            match json!({"case": "sideways"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        );

        let result = runner.run("abc", &["remove_numbers", "change_case"], &args);
        match result.unwrap_err() {
            PipelineError::OperationFailed { name, step, source } => {
                assert_eq!(name, "change_case");
                assert_eq!(step, 1);
                assert!(matches!(source, OpError::InvalidChoice { param: "case", .. }));
            }
            other => panic!("Expected OperationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_is_deterministic() {
        let runner = PipelineRunner::new();
        let ops = ["expand_contractions", "change_case", "remove_punctuation"];
        let first = runner.run("It's DONE!", &ops, &ArgsByName::new());
        let second = runner.run("It's DONE!", &ops, &ArgsByName::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_accepts_empty_intermediate_text() {
        let runner = PipelineRunner::new();
        let result = runner
            .run("123", &["remove_numbers", "change_case"], &ArgsByName::new())
            .unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_run_default_preset_sequence() {
        assert_eq!(
            DEFAULT_OPERATIONS,
            [
                "expand_contractions",
                "change_case",
                "handle_line_feeds",
                "remove_whitespace",
                "remove_special_characters",
                "remove_punctuation",
            ]
        );

        let args = default_preset_args();
        assert_eq!(args.len(), 1);
        assert_eq!(
            args.get("change_case").and_then(|a| a.get("case")),
            Some(&Value::String("lower".to_string()))
        );
    }

    #[test]
    fn test_run_default() {
        let runner = PipelineRunner::new();
        let result = runner.run_default("Hello, World! It's a lovely DAY!").unwrap();
        assert_eq!(result, "hello world it is a lovely day");
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::UnknownOperation {
            name: "frobnicate".to_string(),
            step: 2,
        };
        assert_eq!(format!("{}", err), "Unknown operation 'frobnicate' at step 2");

        let err = PipelineError::OperationFailed {
            name: "change_case".to_string(),
            step: 0,
            source: OpError::InvalidArguments("bad".to_string()),
        };
        assert_eq!(
            format!("{}", err),
            "Operation 'change_case' failed at step 0: Invalid arguments: bad"
        );
    }

    #[test]
    fn test_request_validation() {
        let request = PipelineRequest {
            text: String::new(),
            operations: vec!["change_case".to_string()],
            args: ArgsByName::new(),
        };
        assert_eq!(request.validate(), Err(RequestError::EmptyText));

        let request = PipelineRequest {
            text: "hello".to_string(),
            operations: Vec::new(),
            args: ArgsByName::new(),
        };
        assert_eq!(request.validate(), Err(RequestError::NoOperations));

        let request = PipelineRequest {
            text: "hello".to_string(),
            operations: vec!["change_case".to_string()],
            args: ArgsByName::new(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_wire_shape() {
        let request: PipelineRequest = serde_json::from_value(json!({
            "text": "Hello",
            "operations": ["change_case"],
            "args": {"change_case": {"case": "upper"}}
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        let runner = PipelineRunner::new();
        let result = runner
            .run(&request.text, &request.operations, &request.args)
            .unwrap();
        assert_eq!(result, "HELLO");
    }
}
