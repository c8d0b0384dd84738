//! # jsl-schema — Instance Validation
//!
//! The compile → evaluate collaborator behind `jsl validate`. Schemas are
//! compiled with the `jsonschema` crate; custom metaschemas and `$ref`
//! targets are served from the same [`jsl_lint::LocalResolver`] the
//! linter uses.
//!
//! ## Crate Policy
//!
//! - Never performs network access.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod validate;

pub use validate::{
    SchemaCompiler, SchemaValidationError, Template, TraceKind, TraceStep, ValidationViolations,
    Violation,
};
