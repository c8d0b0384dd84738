//! # jsl-lint — JSON Schema Rule Engine
//!
//! Detects stylistic anti-patterns, redundancies and syntax sugar in JSON
//! Schema documents, reports them as located diagnostics, and rewrites the
//! document to an equivalent canonical form.
//!
//! ## Pipeline
//!
//! 1. The **walker** ([`walk`]) enumerates every sub-schema location in
//!    pre-order and annotates it with the dialect and vocabularies in force
//!    there ([`Scope`]), re-computing them at nested resource boundaries.
//!
//! 2. Each **rule** ([`Rule`]) tests a location with a pure `condition` and
//!    rewrites it with `transform`. The built-in catalogue lives in
//!    [`rules`], grouped by [`Category`].
//!
//! 3. A **bundle** ([`Bundle`]) holds the enabled rules in a fixed order and
//!    runs them: [`Bundle::check`] reports, [`Bundle::apply`] rewrites to a
//!    fixpoint under a pass cap.
//!
//! ## Example
//!
//! ```
//! use jsl_lint::{Bundle, Category, DefaultWalker, Diagnostic, EmptyResolver};
//! use serde_json::json;
//!
//! let bundle = Bundle::builder().category(Category::SyntaxSugar).build()?;
//! let mut schema = json!({
//!     "$schema": "https://json-schema.org/draft/2020-12/schema",
//!     "type": "boolean"
//! });
//!
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! assert!(!bundle.check(&schema, &DefaultWalker, &EmptyResolver, &mut diagnostics)?);
//! assert_eq!(diagnostics[0].rule, "type_boolean_as_enum");
//!
//! bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver)?;
//! assert_eq!(schema["enum"], json!([false, true]));
//! # Ok::<(), jsl_lint::LintError>(())
//! ```
//!
//! ## Crate Policy
//!
//! - No global rule registry: bundles are assembled explicitly.
//! - Rules and bundles are immutable once built and `Send + Sync`.
//! - No `unsafe` code, no `.unwrap()` outside tests.

pub mod bundle;
pub mod diagnostic;
pub mod dialect;
pub mod error;
pub mod resolver;
pub mod rule;
pub mod rules;
pub mod vocabulary;
pub mod walker;

pub use bundle::{ApplyOutcome, Bundle, BundleBuilder, DEFAULT_MAX_PASSES};
pub use diagnostic::{CountingReporter, Diagnostic, Reporter};
pub use dialect::{metaschema_scope, official_dialect, OfficialDialect, Scope};
pub use error::{LintError, ResolutionError};
pub use resolver::{EmptyResolver, LocalResolver, SchemaResolver};
pub use rule::{Category, Rule, Transformer};
pub use vocabulary::VocabularySet;
pub use walker::{walk, DefaultWalker, Frame, SchemaWalker, SubschemaKind, Walk};
