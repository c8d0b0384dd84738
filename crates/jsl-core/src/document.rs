//! # Document Loading
//!
//! Reads schema and instance files into `serde_json::Value` trees.
//!
//! The format is chosen from the file extension: `.yaml`/`.yml` are parsed
//! as YAML and converted to the equivalent JSON tree, `.jsonl` is read as
//! one JSON value per non-blank line, anything else is parsed as JSON.
//!
//! The source format is kept alongside the value. Only JSON documents can
//! be written back losslessly, so rewriting callers must check
//! [`DocumentFormat::is_rewritable`] first.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::CoreError;

/// Serialization format a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Plain JSON.
    Json,
    /// YAML, converted to its JSON equivalent on load.
    Yaml,
    /// JSON Lines: one JSON value per line.
    JsonLines,
}

impl DocumentFormat {
    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("jsonl") => Self::JsonLines,
            _ => Self::Json,
        }
    }

    /// Whether a rewritten document can be saved in this format without
    /// losing information from the original source.
    pub fn is_rewritable(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns the lowercase format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::JsonLines => "jsonl",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema document loaded from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// Where the document was read from.
    pub path: PathBuf,
    /// The source serialization.
    pub format: DocumentFormat,
    /// The parsed value.
    pub value: Value,
}

fn load_error(path: &Path, reason: String) -> CoreError {
    CoreError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    }
}

/// Load a single JSON or YAML document.
///
/// # Errors
///
/// Returns `CoreError::DocumentLoad` if the file cannot be read, is not
/// valid JSON/YAML, or is a `.jsonl` file (which holds many documents).
pub fn load_document(path: &Path) -> Result<Document, CoreError> {
    let format = DocumentFormat::from_path(path);
    let content = std::fs::read_to_string(path)
        .map_err(|e| load_error(path, format!("cannot read file: {e}")))?;

    let value = match format {
        DocumentFormat::Json => serde_json::from_str(&content)
            .map_err(|e| load_error(path, format!("invalid JSON: {e}")))?,
        DocumentFormat::Yaml => parse_yaml(&content).map_err(|reason| load_error(path, reason))?,
        DocumentFormat::JsonLines => {
            return Err(load_error(
                path,
                "JSON Lines files hold instances, not a single document".to_string(),
            ))
        }
    };

    Ok(Document {
        path: path.to_path_buf(),
        format,
        value,
    })
}

/// Load every instance held by a file: one for JSON/YAML, one per non-blank
/// line for `.jsonl`.
///
/// # Errors
///
/// Returns `CoreError::DocumentLoad` naming the offending line for JSON
/// Lines input, or the whole file otherwise.
pub fn load_instances(path: &Path) -> Result<Vec<Value>, CoreError> {
    if DocumentFormat::from_path(path) != DocumentFormat::JsonLines {
        return load_document(path).map(|doc| vec![doc.value]);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| load_error(path, format!("cannot read file: {e}")))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| load_error(path, format!("invalid JSON on line {}: {e}", number + 1)))
        })
        .collect()
}

/// Parse YAML text into a JSON value tree.
pub fn parse_yaml(content: &str) -> Result<Value, String> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
    yaml_to_json_value(&yaml).map_err(|e| format!("YAML-to-JSON conversion failed: {e}"))
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Schemas only use the JSON-compatible subset of YAML. Tags are dropped
/// and their inner value kept; scalar map keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
