//! # jsl-core — Foundational Types for the Schema Linter
//!
//! Leaf crate of the workspace. Every other `jsl-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **[`Pointer`]** — an RFC 6901 JSON Pointer as an owned token list.
//!    Used as the traversal cursor of the walker and as the location
//!    attached to every diagnostic.
//!
//! 2. **Document loading** ([`document`]) — reads schemas and instances from
//!    `.json`, `.yaml`/`.yml` and `.jsonl` files into `serde_json::Value`
//!    trees, remembering the source format so callers can refuse to rewrite
//!    formats they cannot round-trip.
//!
//! 3. **File discovery** ([`discovery`]) — expands files and directories
//!    into the sorted, de-duplicated list of documents to process.
//!
//! 4. **Schema-aware printing** ([`format`]) — pretty prints a schema with
//!    identifying keywords first (`$schema`, `$id`, ...) so rewritten files
//!    stay readable and diffs stay stable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsl-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod discovery;
pub mod document;
pub mod error;
pub mod format;
pub mod pointer;

pub use discovery::{discover, DEFAULT_EXTENSIONS};
pub use document::{load_document, load_instances, Document, DocumentFormat};
pub use error::CoreError;
pub use format::{keyword_rank, prettify};
pub use pointer::{Pointer, Token};
