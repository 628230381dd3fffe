//! Name-based lookup of text operations across capability groups
//!
//! Each capability group exports an explicit manifest of its operations;
//! the registry aggregates those manifests into a single name-indexed view.
//! Lookup scans groups in registration order and the first match wins, so
//! if two groups ever define the same name the result depends only on group
//! order, never on any priority heuristic.

use crate::ops::{self, ArgMap, OpError, OpFn};
use std::collections::BTreeSet;

/// A single named text transform with an argument-validating entry point
#[derive(Debug, Clone)]
pub struct Operation {
    name: &'static str,
    description: &'static str,
    apply: OpFn,
}

impl Operation {
    pub fn new(name: &'static str, description: &'static str, apply: OpFn) -> Self {
        Operation {
            name,
            description,
            apply,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Apply the operation to `text` with the given named arguments.
    ///
    /// An empty map means "defaults for everything". The operation validates
    /// the argument record before transforming, so a malformed record fails
    /// without touching the text.
    pub fn invoke(&self, text: &str, args: &ArgMap) -> Result<String, OpError> {
        (self.apply)(text, args)
    }
}

/// A named collection of operations (e.g. "flattener", "normalizer")
#[derive(Debug, Clone)]
pub struct CapabilityGroup {
    name: &'static str,
    operations: Vec<Operation>,
}

impl CapabilityGroup {
    pub fn new(name: &'static str, operations: Vec<Operation>) -> Self {
        CapabilityGroup { name, operations }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Find an operation in this group by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// Registry of operations, aggregated from capability groups
///
/// Built once from static manifests and immutable afterwards; concurrent
/// callers only rely on that immutability.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    groups: Vec<CapabilityGroup>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        OperationRegistry { groups: Vec::new() }
    }

    /// Append a capability group.
    ///
    /// Group order is lookup order: a group registered earlier shadows any
    /// same-named operation in a group registered later.
    pub fn register_group(&mut self, group: CapabilityGroup) {
        self.groups.push(group);
    }

    /// Resolve an operation by exact name, scanning groups in fixed order
    pub fn resolve(&self, name: &str) -> Option<&Operation> {
        self.groups.iter().find_map(|group| group.get(name))
    }

    /// Check if an operation exists
    pub fn has(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// List all operation names (sorted, duplicates across groups collapsed)
    pub fn list_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .groups
            .iter()
            .flat_map(|group| group.operations.iter().map(|op| op.name))
            .collect();
        names.into_iter().map(String::from).collect()
    }

    /// The capability groups in lookup order
    pub fn groups(&self) -> &[CapabilityGroup] {
        &self.groups
    }

    /// Create a registry with the built-in capability groups.
    ///
    /// The group order here is part of the contract: it decides which
    /// implementation wins on a name collision.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_group(CapabilityGroup::new("encoder", ops::encoder::operations()));
        registry.register_group(CapabilityGroup::new(
            "flattener",
            ops::flattener::operations(),
        ));
        registry.register_group(CapabilityGroup::new(
            "normalizer",
            ops::normalizer::operations(),
        ));
        registry.register_group(CapabilityGroup::new(
            "segmenter",
            ops::segmenter::operations(),
        ));
        registry.register_group(CapabilityGroup::new(
            "transformer",
            ops::transformer::operations(),
        ));

        registry
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_op(text: &str, _args: &ArgMap) -> Result<String, OpError> {
        Ok(text.to_uppercase())
    }

    fn lower_op(text: &str, _args: &ArgMap) -> Result<String, OpError> {
        Ok(text.to_lowercase())
    }

    #[test]
    fn test_registry_creation() {
        let registry = OperationRegistry::new();
        assert!(registry.groups().is_empty());
        assert!(registry.list_names().is_empty());
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = OperationRegistry::with_defaults();

        let group_names: Vec<_> = registry.groups().iter().map(|g| g.name()).collect();
        assert_eq!(
            group_names,
            vec![
                "encoder",
                "flattener",
                "normalizer",
                "segmenter",
                "transformer"
            ]
        );

        assert!(registry.has("encode_text"));
        assert!(registry.has("remove_whitespace"));
        assert!(registry.has("expand_contractions"));
        assert!(registry.has("tokenize_words"));
        assert!(registry.has("change_case"));
        assert!(!registry.has("no_such_op"));
    }

    #[test]
    fn test_resolve_exact_match_is_case_sensitive() {
        let registry = OperationRegistry::with_defaults();
        assert!(registry.resolve("change_case").is_some());
        assert!(registry.resolve("Change_Case").is_none());
        assert!(registry.resolve("change_case ").is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = OperationRegistry::with_defaults();
        let first = registry.resolve("change_case").unwrap();
        let second = registry.resolve("change_case").unwrap();
        assert_eq!(first.name(), second.name());
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_duplicate_name_resolves_to_first_group() {
        let mut registry = OperationRegistry::new();
        registry.register_group(CapabilityGroup::new(
            "first",
            vec![Operation::new("shout", "Uppercase the text.", upper_op)],
        ));
        registry.register_group(CapabilityGroup::new(
            "second",
            vec![Operation::new("shout", "Lowercase the text.", lower_op)],
        ));

        let op = registry.resolve("shout").unwrap();
        let result = op.invoke("MiXeD", &ArgMap::new()).unwrap();
        assert_eq!(result, "MIXED");
    }

    #[test]
    fn test_list_names_collapses_duplicates() {
        let mut registry = OperationRegistry::new();
        registry.register_group(CapabilityGroup::new(
            "first",
            vec![Operation::new("shout", "Uppercase the text.", upper_op)],
        ));
        registry.register_group(CapabilityGroup::new(
            "second",
            vec![
                Operation::new("shout", "Lowercase the text.", lower_op),
                Operation::new("hush", "Lowercase the text.", lower_op),
            ],
        ));

        assert_eq!(registry.list_names(), vec!["hush", "shout"]);
    }

    #[test]
    fn test_list_names_is_sorted_and_deterministic() {
        let registry = OperationRegistry::with_defaults();
        let names = registry.list_names();

        assert!(!names.is_empty());
        for i in 1..names.len() {
            assert!(names[i - 1] < names[i]);
        }
        assert_eq!(names, OperationRegistry::with_defaults().list_names());
    }

    #[test]
    fn test_default_trait() {
        let registry = OperationRegistry::default();
        assert!(registry.has("change_case"));
    }

    #[test]
    fn test_group_get() {
        let registry = OperationRegistry::with_defaults();
        let transformer = registry
            .groups()
            .iter()
            .find(|g| g.name() == "transformer")
            .unwrap();

        assert!(transformer.get("change_case").is_some());
        assert!(transformer.get("remove_whitespace").is_none());
    }
}
