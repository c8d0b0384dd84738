//! # Configuration File
//!
//! Optional settings loaded with `--config`, in YAML or JSON:
//!
//! ```yaml
//! categories: [modernize, anti_pattern, simplify, redundant]
//! extensions: [.json, .schema.yaml]
//! ignore: [vendor]
//! resolve: [schemas/meta]
//! default_dialect: https://json-schema.org/draft/2020-12/schema
//! max_passes: 1000
//! ```
//!
//! Every field is optional. Unknown fields are rejected. Relative paths
//! are resolved against the directory holding the configuration file.
//! Command-line flags take precedence over file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use jsl_core::DEFAULT_EXTENSIONS;
use jsl_lint::{Category, DEFAULT_MAX_PASSES};

/// Settings shared by the `lint` and `validate` subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Enabled rule categories.
    pub categories: Vec<String>,
    /// Extensions of schema files found in directories.
    pub extensions: Vec<String>,
    /// Paths to skip during discovery.
    pub ignore: Vec<PathBuf>,
    /// Files or directories of schemas available for resolution.
    pub resolve: Vec<PathBuf>,
    /// Dialect assumed for schemas without `$schema`.
    pub default_dialect: Option<String>,
    /// Upper bound on fix passes per document.
    pub max_passes: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            categories: Category::defaults()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore: Vec::new(),
            resolve: Vec::new(),
            default_dialect: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl LintConfig {
    /// Parse the configured category names.
    ///
    /// # Errors
    ///
    /// Fails on an unknown category name.
    pub fn parsed_categories(&self) -> Result<Vec<Category>> {
        self.categories
            .iter()
            .map(|name| name.parse::<Category>().map_err(anyhow::Error::from))
            .collect()
    }
}

fn resolve_relative(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load a configuration file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid YAML/JSON, or contains
/// unknown fields.
pub fn load_config(path: &Path) -> Result<LintConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config: LintConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.ignore = config
        .ignore
        .iter()
        .map(|p| resolve_relative(p, base))
        .collect();
    config.resolve = config
        .resolve
        .iter()
        .map(|p| resolve_relative(p, base))
        .collect();

    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
