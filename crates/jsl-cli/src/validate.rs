//! # Validate Subcommand
//!
//! Validates instance documents against a schema. Instances may be JSON,
//! YAML or JSON Lines; each line of a `.jsonl` file is a separate instance.
//!
//! `--path` selects a subschema of the schema document by JSON Pointer. The
//! selected subschema inherits the root `$schema` when it declares none.
//!
//! Evaluation of a `.jsonl` file stops at its first invalid entry. An empty
//! `.jsonl` file is valid and logged as a warning.
//!
//! ## Modes
//!
//! - `--benchmark` times each evaluation and prints `took: <N>us` for every
//!   valid instance. Failures are reported without violation details.
//! - `--trace` prints the evaluation trace of every instance: annotations
//!   when it passes, errors when it fails.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use jsl_core::{load_document, load_instances, Pointer};
use jsl_schema::{SchemaCompiler, Template, TraceStep, Violation};

use crate::config::LintConfig;
use crate::lint::build_resolver;

/// Arguments for the `jsl validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Schema document.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Instance documents.
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,

    /// Load schemas under this path for reference resolution. Repeatable.
    #[arg(short = 'r', long = "resolve", value_name = "PATH")]
    pub resolve: Vec<PathBuf>,

    /// JSON Pointer to the subschema to validate against.
    #[arg(short = 'p', long = "path", value_name = "POINTER")]
    pub pointer: Option<String>,

    /// Print a machine-readable JSON report.
    #[arg(long)]
    pub json: bool,

    /// Time each evaluation.
    #[arg(short = 'b', long, conflicts_with = "trace")]
    pub benchmark: bool,

    /// Print the evaluation trace of each instance.
    #[arg(short = 't', long)]
    pub trace: bool,
}

/// Result of one instance.
#[derive(Debug, Serialize)]
struct InstanceReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    valid: bool,
    errors: Vec<ViolationReport>,
    #[serde(rename = "tookUs", skip_serializing_if = "Option::is_none")]
    took_us: Option<u128>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    trace: Vec<TraceReport>,
}

#[derive(Debug, Serialize)]
struct TraceReport {
    kind: &'static str,
    #[serde(rename = "keywordLocation")]
    keyword_location: String,
    #[serde(rename = "instanceLocation")]
    instance_location: String,
    detail: String,
}

impl From<&TraceStep> for TraceReport {
    fn from(step: &TraceStep) -> Self {
        Self {
            kind: step.kind.as_str(),
            keyword_location: step.keyword_location.clone(),
            instance_location: step.instance_location.clone(),
            detail: step.detail.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ViolationReport {
    #[serde(rename = "instanceLocation")]
    instance_location: String,
    #[serde(rename = "evaluatePath")]
    evaluate_path: String,
    message: String,
}

impl From<&Violation> for ViolationReport {
    fn from(violation: &Violation) -> Self {
        Self {
            instance_location: violation.instance_path.clone(),
            evaluate_path: violation.schema_path.clone(),
            message: violation.message.clone(),
        }
    }
}

/// Select the schema to compile from `document`, applying `pointer`.
fn select_schema(document: &Value, pointer: Option<&str>) -> Result<Value> {
    let Some(text) = pointer else {
        return Ok(document.clone());
    };
    let pointer = Pointer::parse(text).with_context(|| format!("invalid pointer {text:?}"))?;
    let Some(target) = pointer.get(document) else {
        bail!("the pointer {text:?} does not resolve in the schema");
    };
    if !target.is_object() && !target.is_boolean() {
        bail!("the value at {text:?} is not a schema");
    }
    let mut schema = target.clone();
    if let (Value::Object(map), Some(dialect)) = (&mut schema, document.get("$schema")) {
        map.entry("$schema").or_insert_with(|| dialect.clone());
    }
    Ok(schema)
}

fn compile(args: &ValidateArgs, config: &LintConfig) -> Result<Template> {
    let document = load_document(&args.schema)?;
    let schema = select_schema(&document.value, args.pointer.as_deref())?;

    let mut resolve = config.resolve.clone();
    resolve.extend(args.resolve.iter().cloned());
    let mut compiler = SchemaCompiler::new(build_resolver(&resolve)?);
    if let Some(dialect) = &config.default_dialect {
        compiler = compiler.with_default_dialect(dialect.clone());
    }
    compiler
        .compile(&schema)
        .with_context(|| format!("failed to compile {}", args.schema.display()))
}

/// Execute the validate subcommand, printing to stdout.
///
/// Returns exit code: 0 when every instance is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &LintConfig) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_validate_to(args, config, &mut out)
}

/// Execute the validate subcommand, printing to `out`.
pub fn run_validate_to(
    args: &ValidateArgs,
    config: &LintConfig,
    out: &mut dyn Write,
) -> Result<u8> {
    let template = compile(args, config)?;
    tracing::info!(schema = %template.name(), dialect = %template.dialect(), "validating");

    let mut reports = Vec::new();
    for path in &args.instances {
        let instances = load_instances(path)?;
        let json_lines = is_json_lines(path);
        if json_lines && instances.is_empty() {
            tracing::warn!(path = %path.display(), "the JSONL file is empty");
        }
        for (index, instance) in instances.iter().enumerate() {
            let mut report = evaluate(args, &template, instance)?;
            report.path = path.display().to_string();
            report.index = json_lines.then_some(index);
            tracing::debug!(
                path = %path.display(),
                index,
                valid = report.valid,
                "evaluated instance"
            );
            let failed = !report.valid;
            reports.push(report);
            if json_lines && failed {
                break;
            }
        }
    }

    if args.json {
        let valid = reports.iter().all(|r| r.valid);
        let report = serde_json::json!({ "valid": valid, "instances": reports });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_text(out, &reports)?;
    }

    Ok(if reports.iter().all(|r| r.valid) { 0 } else { 1 })
}

/// Evaluate one instance in the mode selected by `args`.
fn evaluate(args: &ValidateArgs, template: &Template, instance: &Value) -> Result<InstanceReport> {
    let mut report = InstanceReport {
        path: String::new(),
        index: None,
        valid: true,
        errors: Vec::new(),
        took_us: None,
        trace: Vec::new(),
    };
    if args.benchmark {
        let start = Instant::now();
        report.valid = template.evaluate(instance, None);
        let elapsed = start.elapsed().as_micros();
        if report.valid {
            report.took_us = Some(elapsed);
        }
    } else if args.trace {
        report.valid = template.evaluate(instance, None);
        report.trace = template.trace(instance)?.iter().map(Into::into).collect();
    } else {
        let violations = template.violations(instance);
        report.valid = violations.is_empty();
        report.errors = violations.violations().iter().map(Into::into).collect();
    }
    Ok(report)
}

fn is_json_lines(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

fn write_text(out: &mut dyn Write, reports: &[InstanceReport]) -> Result<()> {
    for report in reports {
        for step in &report.trace {
            writeln!(
                out,
                "{} {:?} at {:?}: {}",
                step.kind, step.keyword_location, step.instance_location, step.detail
            )?;
        }
        if let Some(took) = report.took_us {
            writeln!(out, "took: {took}us")?;
        }
        if report.valid {
            continue;
        }
        match report.index {
            Some(index) => writeln!(out, "fail: {} (entry #{})", report.path, index + 1)?,
            None => writeln!(out, "fail: {}", report.path)?,
        }
        if report.errors.is_empty() && report.trace.is_empty() {
            writeln!(out, "error: Schema validation failure")?;
        }
        for error in &report.errors {
            writeln!(out, "error: {}", error.message)?;
            writeln!(out, "  at instance location {:?}", error.instance_location)?;
            writeln!(out, "  at evaluate path {:?}", error.evaluate_path)?;
        }
    }
    Ok(())
}
