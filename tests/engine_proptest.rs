//! Property-based tests for the pipeline engine
//!
//! These tests ensure that the engine handles arbitrary inputs and arbitrary
//! sequences of registered operations without panicking, and that execution
//! stays deterministic.

use proptest::prelude::*;
use proptest::sample::select;
use textpress::pipeline::ArgsByName;
use textpress::{OperationRegistry, PipelineError, PipelineRunner};

fn registered_names() -> Vec<String> {
    OperationRegistry::with_defaults().list_names()
}

/// Operations with a required argument are exercised separately; every other
/// registered operation must run on defaults.
fn default_runnable_names() -> Vec<String> {
    registered_names()
        .into_iter()
        .filter(|name| name != "replace_words")
        .collect()
}

proptest! {
    #[test]
    fn pipeline_never_panics_on_arbitrary_text(
        text in "\\PC{0,200}",
        ops in proptest::collection::vec(select(default_runnable_names()), 0..5),
    ) {
        let runner = PipelineRunner::new();
        // Any outcome is fine as long as it is a value, not a panic
        let _ = runner.run(&text, &ops, &ArgsByName::new());
    }

    #[test]
    fn pipeline_is_deterministic(
        text in "\\PC{0,200}",
        ops in proptest::collection::vec(select(default_runnable_names()), 1..5),
    ) {
        let runner = PipelineRunner::new();
        let first = runner.run(&text, &ops, &ArgsByName::new());
        let second = runner.run(&text, &ops, &ArgsByName::new());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn default_pipeline_never_panics(text in "\\PC{0,200}") {
        let runner = PipelineRunner::new();
        let result = runner.run_default(&text);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn unknown_name_fails_at_its_own_step(
        prefix in proptest::collection::vec(select(default_runnable_names()), 0..3),
    ) {
        let runner = PipelineRunner::new();
        let mut ops = prefix.clone();
        ops.push("definitely_not_registered".to_string());

        let result = runner.run("some text", &ops, &ArgsByName::new());
        prop_assert_eq!(
            result.unwrap_err(),
            PipelineError::UnknownOperation {
                name: "definitely_not_registered".to_string(),
                step: prefix.len(),
            }
        );
    }

    #[test]
    fn resolve_is_stable_across_lookups(name in select(registered_names())) {
        let registry = OperationRegistry::with_defaults();
        let first = registry.resolve(&name).map(|op| op.name());
        let second = registry.resolve(&name).map(|op| op.name());
        prop_assert_eq!(first, second);
        prop_assert!(first.is_some());
    }
}
