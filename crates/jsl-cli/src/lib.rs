//! # jsl-cli — Command-Line Interface
//!
//! Provides the `jsl` binary.
//!
//! ## Subcommands
//!
//! - `jsl lint` — Report (and with `--fix`, rewrite) schema anti-patterns.
//! - `jsl validate` — Validate instances against a schema.
//!
//! ```bash
//! jsl lint schemas/
//! jsl lint --fix --category syntax_sugar schemas/person.json
//! jsl validate schemas/person.json people.jsonl
//! ```
//!
//! Both subcommands read optional defaults from a `--config` file; see
//! [`config`].

pub mod config;
pub mod lint;
pub mod validate;
