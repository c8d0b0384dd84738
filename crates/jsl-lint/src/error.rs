//! # Error Types
//!
//! Failures that abort a `check` or `apply` call for one document.
//!
//! Shape mismatches inside a schema (a `type` that is not a string, an
//! `enum` that is not an array) are deliberately absent: rules treat them
//! as a non-match and the walk continues.

use jsl_core::CoreError;
use thiserror::Error;

/// A schema needed for dialect or vocabulary detection could not be obtained.
///
/// Raised before the node that needed it is touched, so a failed `apply`
/// never leaves that node half-rewritten.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The resolver does not know the URI.
    #[error("could not resolve schema '{uri}'")]
    NotFound {
        /// The URI that was looked up.
        uri: String,
    },

    /// The resolver knows the URI but failed to produce it.
    #[error("failed to fetch schema '{uri}': {reason}")]
    Fetch {
        /// The URI that was looked up.
        uri: String,
        /// Why fetching failed.
        reason: String,
    },

    /// A metaschema chain never reaches an official dialect.
    #[error("could not determine the base dialect of '{uri}': {reason}")]
    UnknownDialect {
        /// The metaschema URI being resolved.
        uri: String,
        /// Why the chain could not be followed.
        reason: String,
    },
}

/// Top-level error type for the rule engine.
#[derive(Error, Debug)]
pub enum LintError {
    /// Dialect or vocabulary detection needed a schema that could not be resolved.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// `apply` hit its pass cap while rules were still firing. The document
    /// holds whatever the last completed pass produced and must not be
    /// written back.
    #[error(
        "rule set did not converge after {passes} passes (still firing: {})",
        .rules.join(", ")
    )]
    NonConvergent {
        /// Number of passes performed.
        passes: usize,
        /// Ids of the rules that fired during the final pass.
        rules: Vec<String>,
    },

    /// Two rules registered in one bundle share an id.
    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    /// A category name did not match any known category.
    #[error("unknown lint category: {0:?}")]
    UnknownCategory(String),

    /// Error from the core document layer.
    #[error(transparent)]
    Core(#[from] CoreError),
}
