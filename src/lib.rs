//! # textpress
//!
//! Text cleaning and normalization pipelines.
//!
//! The crate is organized around three pieces:
//!
//! - [`ops`] — a flat library of pure, stateless text transforms, grouped into
//!   capability groups (encoder, flattener, normalizer, segmenter,
//!   transformer). Each group exports an explicit manifest of its public
//!   operations; helpers stay private and are never exposed by name.
//! - [`registry`] — the name-indexed view over all capability groups.
//!   Lookup scans groups in a fixed order and the first match wins.
//! - [`pipeline`] — the execution engine. It resolves an ordered list of
//!   operation names, threads a single text value through them with
//!   per-operation arguments, and halts on the first failure.
//!
//! ```rust,ignore
//! use textpress::pipeline::PipelineRunner;
//!
//! let runner = PipelineRunner::new();
//!
//! // The preset cleanup sequence
//! let cleaned = runner.run_default("Hello, World! It's a lovely DAY!").unwrap();
//!
//! // A custom sequence with per-operation arguments
//! let ops = ["expand_contractions", "change_case"];
//! let result = runner.run("It's fine", &ops, &Default::default()).unwrap();
//! ```

pub mod ops;
pub mod pipeline;
pub mod registry;

pub use ops::OpError;
pub use pipeline::{
    ArgsByName, PipelineError, PipelineRequest, PipelineRunner, RequestError, DEFAULT_OPERATIONS,
};
pub use registry::{CapabilityGroup, Operation, OperationRegistry};
