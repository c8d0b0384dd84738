//! # Lint Subcommand
//!
//! Checks schema documents against the enabled rule categories and, with
//! `--fix`, rewrites them in place first.
//!
//! ## Fix Mode
//!
//! Each document is rewritten to a fixpoint, written back only when a rule
//! fired, and then checked again so the report reflects the final state.
//! Only JSON documents can be rewritten: a fix request that would touch a
//! YAML document is refused before any file is modified. A document whose
//! rewrite does not converge is reported and left untouched on disk.
//!
//! ## Exit Codes
//!
//! 0 when every document is clean, 1 when any diagnostic remains, 2 when a
//! document could not be processed.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use jsl_core::{discover, load_document, prettify, DocumentFormat};
use jsl_lint::{Bundle, DefaultWalker, Diagnostic, LocalResolver};

use crate::config::LintConfig;

/// Arguments for the `jsl lint` subcommand.
#[derive(Args, Debug, Default)]
pub struct LintArgs {
    /// Files or directories to lint. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Rewrite documents in place to remove the reported patterns.
    #[arg(short, long)]
    pub fix: bool,

    /// Print a machine-readable JSON report.
    #[arg(long)]
    pub json: bool,

    /// Extension of schema files found in directories. Repeatable.
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Skip a file or directory. Repeatable.
    #[arg(short = 'i', long = "ignore", value_name = "PATH")]
    pub ignore: Vec<PathBuf>,

    /// Load schemas under this path for metaschema resolution. Repeatable.
    #[arg(short = 'r', long = "resolve", value_name = "PATH")]
    pub resolve: Vec<PathBuf>,

    /// Enable a rule category. Repeatable; replaces the default set.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Dialect assumed for schemas without `$schema`.
    #[arg(long, value_name = "URI")]
    pub default_dialect: Option<String>,
}

impl LintArgs {
    /// Overlay the command-line flags on `config`.
    pub fn merge(&self, config: &LintConfig) -> LintConfig {
        let mut merged = config.clone();
        if !self.categories.is_empty() {
            merged.categories = self.categories.clone();
        }
        if !self.extensions.is_empty() {
            merged.extensions = self.extensions.clone();
        }
        merged.ignore.extend(self.ignore.iter().cloned());
        merged.resolve.extend(self.resolve.iter().cloned());
        if self.default_dialect.is_some() {
            merged.default_dialect = self.default_dialect.clone();
        }
        merged
    }
}

/// One entry of the JSON report.
#[derive(Debug, Serialize)]
struct ReportEntry {
    path: String,
    id: String,
    message: String,
    #[serde(rename = "schemaLocation")]
    schema_location: String,
}

/// The JSON report.
#[derive(Debug, Serialize)]
struct Report {
    valid: bool,
    errors: Vec<ReportEntry>,
    #[serde(rename = "fixApplied")]
    fix_applied: bool,
}

/// Build the resolver for `--resolve` paths.
pub(crate) fn build_resolver(paths: &[PathBuf]) -> Result<LocalResolver> {
    if paths.is_empty() {
        return Ok(LocalResolver::new());
    }
    let resolver =
        LocalResolver::from_paths(paths).context("failed to load schemas for resolution")?;
    tracing::info!(schemas = resolver.len(), "loaded schemas for resolution");
    Ok(resolver)
}

fn build_bundle(config: &LintConfig) -> Result<Bundle> {
    let mut builder = Bundle::builder()
        .categories(config.parsed_categories()?)
        .max_passes(config.max_passes);
    if let Some(dialect) = &config.default_dialect {
        builder = builder.default_dialect(dialect.clone());
    }
    Ok(builder.build()?)
}

/// Execute the lint subcommand, printing to stdout.
///
/// Returns exit code: 0 when clean, 1 on diagnostics, 2 on operational error.
pub fn run_lint(args: &LintArgs, config: &LintConfig) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_lint_to(args, config, &mut out)
}

/// Execute the lint subcommand, printing to `out`.
pub fn run_lint_to(args: &LintArgs, config: &LintConfig, out: &mut dyn Write) -> Result<u8> {
    let config = args.merge(config);
    let bundle = build_bundle(&config)?;
    let resolver = build_resolver(&config.resolve)?;

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = discover(&paths, &config.extensions, &config.ignore);
    tracing::info!(files = files.len(), rules = bundle.len(), "linting");

    if args.fix {
        if let Some(file) = files
            .iter()
            .find(|f| !DocumentFormat::from_path(f).is_rewritable())
        {
            bail!(
                "cannot fix {}: only JSON documents can be rewritten",
                file.display()
            );
        }
    }

    let mut operational_failure = false;
    let mut fix_applied = false;
    let mut findings: Vec<(PathBuf, Diagnostic)> = Vec::new();

    for file in &files {
        tracing::debug!(path = %file.display(), "linting document");
        let mut document = match load_document(file) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(path = %file.display(), error = %e, "failed to load document");
                operational_failure = true;
                continue;
            }
        };

        if args.fix {
            match bundle.apply(&mut document.value, &DefaultWalker, &resolver) {
                Ok(outcome) if outcome.changed() => {
                    let text = prettify(&document.value)?;
                    std::fs::write(file, text)
                        .with_context(|| format!("failed to write {}", file.display()))?;
                    tracing::info!(
                        path = %file.display(),
                        passes = outcome.passes,
                        transforms = outcome.transforms,
                        "fixed document"
                    );
                    fix_applied = true;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(path = %file.display(), error = %e, "failed to fix document");
                    operational_failure = true;
                    continue;
                }
            }
        }

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        if let Err(e) = bundle.check(&document.value, &DefaultWalker, &resolver, &mut diagnostics) {
            tracing::error!(path = %file.display(), error = %e, "failed to lint document");
            operational_failure = true;
            continue;
        }
        if diagnostics.is_empty() {
            tracing::debug!(path = %file.display(), "pass");
        }
        findings.extend(diagnostics.into_iter().map(|d| (file.clone(), d)));
    }

    if args.json {
        write_json(out, &findings, fix_applied)?;
    } else {
        write_text(out, &findings)?;
    }

    Ok(if operational_failure {
        2
    } else if findings.is_empty() {
        0
    } else {
        1
    })
}

fn write_text(out: &mut dyn Write, findings: &[(PathBuf, Diagnostic)]) -> Result<()> {
    for (path, diagnostic) in findings {
        writeln!(out, "{}", path.display())?;
        writeln!(
            out,
            "    {} {} ({})",
            serde_json::to_string(&diagnostic.pointer)?,
            diagnostic.message,
            diagnostic.rule
        )?;
    }
    Ok(())
}

fn write_json(
    out: &mut dyn Write,
    findings: &[(PathBuf, Diagnostic)],
    fix_applied: bool,
) -> Result<()> {
    let report = Report {
        valid: findings.is_empty(),
        errors: findings
            .iter()
            .map(|(path, diagnostic)| ReportEntry {
                path: path.display().to_string(),
                id: diagnostic.rule.clone(),
                message: diagnostic.message.clone(),
                schema_location: diagnostic.pointer.to_string(),
            })
            .collect(),
        fix_applied,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_flags_override_config() {
        let config = LintConfig {
            categories: vec!["simplify".to_string()],
            ignore: vec![PathBuf::from("vendor")],
            ..LintConfig::default()
        };
        let args = LintArgs {
            categories: vec!["syntax_sugar".to_string()],
            ignore: vec![PathBuf::from("build")],
            default_dialect: Some("http://json-schema.org/draft-07/schema#".to_string()),
            ..LintArgs::default()
        };
        let merged = args.merge(&config);
        assert_eq!(merged.categories, vec!["syntax_sugar"]);
        assert_eq!(merged.ignore, vec![PathBuf::from("vendor"), PathBuf::from("build")]);
        assert_eq!(merged.extensions, config.extensions);
        assert!(merged.default_dialect.is_some());
    }

    #[test]
    fn test_merge_without_flags_keeps_config() {
        let config = LintConfig::default();
        assert_eq!(LintArgs::default().merge(&config), config);
    }
}
