//! # Schema Resolution
//!
//! The [`SchemaResolver`] trait is how the engine obtains schemas it does
//! not hold: custom metaschemas named by `$schema`. Official metaschemas
//! are never resolved.
//!
//! [`LocalResolver`] serves schemas loaded from disk, indexed by their
//! `$id` (or `id` for draft-04 and earlier).

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use jsl_core::{discover, load_document, DEFAULT_EXTENSIONS};

use crate::dialect::normalize_uri;
use crate::error::ResolutionError;

/// Source of schemas by URI.
pub trait SchemaResolver: Send + Sync {
    /// Look up the schema identified by `uri`.
    ///
    /// Returns `Ok(None)` when the URI is unknown.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Fetch` when the schema is known but could
    /// not be produced.
    fn resolve(&self, uri: &str) -> Result<Option<Value>, ResolutionError>;
}

/// A resolver that knows no schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResolver;

impl SchemaResolver for EmptyResolver {
    fn resolve(&self, _uri: &str) -> Result<Option<Value>, ResolutionError> {
        Ok(None)
    }
}

/// In-memory resolver over a fixed set of schemas.
#[derive(Debug, Clone, Default)]
pub struct LocalResolver {
    schemas_by_uri: HashMap<String, Value>,
}

impl LocalResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `uri`.
    pub fn insert(&mut self, uri: impl AsRef<str>, schema: Value) {
        self.schemas_by_uri
            .insert(normalize_uri(uri.as_ref()).to_string(), schema);
    }

    /// Register `schema` under its own identifier.
    ///
    /// Returns the identifier, or `None` when the schema declares none and
    /// was therefore not registered.
    pub fn add(&mut self, schema: Value) -> Option<String> {
        let id = ["$id", "id"]
            .iter()
            .find_map(|keyword| schema.get(*keyword).and_then(Value::as_str))
            .map(str::to_string)?;
        self.insert(&id, schema);
        Some(id)
    }

    /// Load every schema document under `paths`.
    ///
    /// Documents without an identifier are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Fetch` when a discovered file cannot be
    /// loaded.
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, ResolutionError> {
        let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        let mut resolver = Self::new();
        for path in discover(paths, &extensions, &[]) {
            let document = load_document(&path).map_err(|e| ResolutionError::Fetch {
                uri: path.display().to_string(),
                reason: e.to_string(),
            })?;
            match resolver.add(document.value) {
                Some(id) => tracing::debug!(path = %path.display(), id = %id, "registered schema"),
                None => tracing::warn!(
                    path = %path.display(),
                    "schema has no identifier; it cannot be resolved"
                ),
            }
        }
        Ok(resolver)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas_by_uri.len()
    }

    /// Returns true if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas_by_uri.is_empty()
    }

    /// Registered schemas with their URIs, sorted by URI.
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> = self
            .schemas_by_uri
            .iter()
            .map(|(uri, schema)| (uri.as_str(), schema))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl SchemaResolver for LocalResolver {
    fn resolve(&self, uri: &str) -> Result<Option<Value>, ResolutionError> {
        Ok(self.schemas_by_uri.get(normalize_uri(uri)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_ignores_empty_fragment() {
        let mut resolver = LocalResolver::new();
        resolver.insert("https://example.com/meta#", json!({"title": "meta"}));
        let found = resolver.resolve("https://example.com/meta").unwrap();
        assert_eq!(found, Some(json!({"title": "meta"})));
        assert!(resolver.resolve("https://example.com/other").unwrap().is_none());
    }

    #[test]
    fn test_add_indexes_by_identifier() {
        let mut resolver = LocalResolver::new();
        assert_eq!(
            resolver.add(json!({"$id": "https://example.com/a"})),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(
            resolver.add(json!({"id": "http://example.com/legacy#"})),
            Some("http://example.com/legacy#".to_string())
        );
        assert_eq!(resolver.add(json!({"type": "string"})), None);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_from_paths_loads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("meta.json"),
            r#"{"$id": "https://example.com/meta", "$schema": "https://json-schema.org/draft/2020-12/schema"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("anon.yaml"), "type: string\n").unwrap();

        let resolver = LocalResolver::from_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.entries()[0].0, "https://example.com/meta");
    }

    #[test]
    fn test_from_paths_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();
        let err = LocalResolver::from_paths(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ResolutionError::Fetch { .. }));
    }

    #[test]
    fn test_empty_resolver_knows_nothing() {
        assert!(EmptyResolver.resolve("https://example.com").unwrap().is_none());
    }
}
