//! # Dialect Detection
//!
//! Determines the dialect and the active vocabularies at every schema
//! location.
//!
//! ## Official Dialects
//!
//! Draft-00 through draft-07 (schema and hyper-schema), 2019-09 and
//! 2020-12 are known without resolution. URIs are compared after dropping
//! an empty trailing fragment, so `http://json-schema.org/draft-07/schema`
//! and `http://json-schema.org/draft-07/schema#` name the same dialect.
//!
//! ## Custom Metaschemas
//!
//! Any other `$schema` URI is fetched through the [`SchemaResolver`] and
//! its own `$schema` is followed until an official dialect is reached. The
//! first `$vocabulary` object met along that chain replaces the vocabulary
//! set the official dialect would have provided.
//!
//! ## Resource Boundaries
//!
//! A nested schema object starts a new resource when it carries a string
//! identifier that is not a bare `#anchor`. `$id` is the identifier keyword
//! from draft-06 onwards; draft-04 and earlier use `id`. Only a boundary
//! that also declares `$schema` can change the dialect; any other location
//! inherits the scope of its parent.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ResolutionError;
use crate::resolver::SchemaResolver;
use crate::vocabulary::{self as vocab, VocabularySet};

/// Longest chain of custom metaschemas followed before giving up.
pub const MAX_METASCHEMA_DEPTH: usize = 16;

/// A dialect known without resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficialDialect {
    /// Canonical metaschema URI.
    pub uri: &'static str,
    /// Vocabularies the dialect enables.
    pub vocabularies: &'static [&'static str],
    /// Keyword that identifies a resource under this dialect.
    pub id_keyword: &'static str,
}

impl OfficialDialect {
    /// The vocabularies of this dialect as a set.
    pub fn vocabulary_set(&self) -> VocabularySet {
        self.vocabularies.iter().copied().collect()
    }
}

const OFFICIAL_DIALECTS: &[OfficialDialect] = &[
    OfficialDialect {
        uri: "https://json-schema.org/draft/2020-12/schema",
        vocabularies: &[
            vocab::CORE_2020_12,
            vocab::APPLICATOR_2020_12,
            vocab::UNEVALUATED_2020_12,
            vocab::VALIDATION_2020_12,
            vocab::META_DATA_2020_12,
            vocab::FORMAT_ANNOTATION_2020_12,
            vocab::CONTENT_2020_12,
        ],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: "https://json-schema.org/draft/2019-09/schema",
        vocabularies: &[
            vocab::CORE_2019_09,
            vocab::APPLICATOR_2019_09,
            vocab::VALIDATION_2019_09,
            vocab::META_DATA_2019_09,
            vocab::FORMAT_2019_09,
            vocab::CONTENT_2019_09,
        ],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_07,
        vocabularies: &[vocab::DRAFT_07],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_07_HYPER,
        vocabularies: &[vocab::DRAFT_07_HYPER, vocab::DRAFT_07],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_06,
        vocabularies: &[vocab::DRAFT_06],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_06_HYPER,
        vocabularies: &[vocab::DRAFT_06_HYPER, vocab::DRAFT_06],
        id_keyword: "$id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_04,
        vocabularies: &[vocab::DRAFT_04],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_04_HYPER,
        vocabularies: &[vocab::DRAFT_04_HYPER, vocab::DRAFT_04],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_03,
        vocabularies: &[vocab::DRAFT_03],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_03_HYPER,
        vocabularies: &[vocab::DRAFT_03_HYPER, vocab::DRAFT_03],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_02,
        vocabularies: &[vocab::DRAFT_02],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_02_HYPER,
        vocabularies: &[vocab::DRAFT_02_HYPER, vocab::DRAFT_02],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_01,
        vocabularies: &[vocab::DRAFT_01],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_01_HYPER,
        vocabularies: &[vocab::DRAFT_01_HYPER, vocab::DRAFT_01],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_00,
        vocabularies: &[vocab::DRAFT_00],
        id_keyword: "id",
    },
    OfficialDialect {
        uri: vocab::DRAFT_00_HYPER,
        vocabularies: &[vocab::DRAFT_00_HYPER, vocab::DRAFT_00],
        id_keyword: "id",
    },
];

/// Drop an empty trailing fragment.
pub fn normalize_uri(uri: &str) -> &str {
    uri.strip_suffix('#').unwrap_or(uri)
}

/// Look up an official dialect by metaschema URI.
pub fn official_dialect(uri: &str) -> Option<&'static OfficialDialect> {
    let uri = normalize_uri(uri);
    OFFICIAL_DIALECTS
        .iter()
        .find(|dialect| normalize_uri(dialect.uri) == uri)
}

/// All official dialects, newest first.
pub fn official_dialects() -> &'static [OfficialDialect] {
    OFFICIAL_DIALECTS
}

/// Dialect and vocabularies in force at a location.
///
/// Cheap to clone: the URI and the vocabulary set are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    dialect: Arc<str>,
    base_dialect: Option<&'static OfficialDialect>,
    vocabularies: Arc<VocabularySet>,
}

impl Scope {
    /// The scope of a location whose dialect could not be determined.
    /// No vocabulary is active, so no rule matches there.
    pub fn unknown() -> Self {
        Self {
            dialect: Arc::from(""),
            base_dialect: None,
            vocabularies: Arc::new(VocabularySet::new()),
        }
    }

    /// The scope of an official dialect.
    pub fn official(dialect: &'static OfficialDialect) -> Self {
        Self {
            dialect: Arc::from(dialect.uri),
            base_dialect: Some(dialect),
            vocabularies: Arc::new(dialect.vocabulary_set()),
        }
    }

    /// The declared metaschema URI. Empty when unknown.
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// The official dialect the declared metaschema builds on.
    pub fn base_dialect(&self) -> Option<&'static OfficialDialect> {
        self.base_dialect
    }

    /// Active vocabularies.
    pub fn vocabularies(&self) -> &VocabularySet {
        &self.vocabularies
    }

    /// Returns true if the dialect was determined.
    pub fn is_known(&self) -> bool {
        self.base_dialect.is_some()
    }
}

/// Compute the scope declared by a metaschema URI.
///
/// # Errors
///
/// Returns `ResolutionError::NotFound` when a custom metaschema on the
/// chain is unknown to `resolver`, and `ResolutionError::UnknownDialect`
/// when the chain has no `$schema`, loops, or is deeper than
/// [`MAX_METASCHEMA_DEPTH`].
pub fn metaschema_scope(
    uri: &str,
    resolver: &dyn SchemaResolver,
) -> Result<Scope, ResolutionError> {
    let mut current = uri.to_string();
    let mut visited: Vec<String> = Vec::new();
    let mut declared: Option<VocabularySet> = None;

    for _ in 0..MAX_METASCHEMA_DEPTH {
        if let Some(official) = official_dialect(&current) {
            let vocabularies = declared.unwrap_or_else(|| official.vocabulary_set());
            return Ok(Scope {
                dialect: Arc::from(uri),
                base_dialect: Some(official),
                vocabularies: Arc::new(vocabularies),
            });
        }

        if visited.iter().any(|seen| normalize_uri(seen) == normalize_uri(&current)) {
            return Err(ResolutionError::UnknownDialect {
                uri: uri.to_string(),
                reason: format!("metaschema '{current}' refers back to itself"),
            });
        }

        let metaschema = resolver
            .resolve(&current)?
            .ok_or_else(|| ResolutionError::NotFound {
                uri: current.clone(),
            })?;

        if declared.is_none() {
            if let Some(Value::Object(vocabularies)) = metaschema.get("$vocabulary") {
                declared = Some(vocabularies.keys().cloned().collect());
            }
        }

        let next = match metaschema.get("$schema").and_then(Value::as_str) {
            Some(next) => next.to_string(),
            None => {
                return Err(ResolutionError::UnknownDialect {
                    uri: uri.to_string(),
                    reason: format!("metaschema '{current}' does not declare $schema"),
                });
            }
        };
        visited.push(std::mem::replace(&mut current, next));
    }

    Err(ResolutionError::UnknownDialect {
        uri: uri.to_string(),
        reason: format!("metaschema chain is deeper than {MAX_METASCHEMA_DEPTH}"),
    })
}

/// Returns true if `node` carries a resource identifier under `keyword`.
fn has_identifier(node: &Value, keyword: &str) -> bool {
    node.get(keyword)
        .and_then(Value::as_str)
        .is_some_and(|id| !id.starts_with('#'))
}

/// Memoizing scope computation for one walk.
pub(crate) struct ScopeCache<'a> {
    resolver: &'a dyn SchemaResolver,
    default_dialect: Option<&'a str>,
    scopes: HashMap<String, Scope>,
}

impl<'a> ScopeCache<'a> {
    pub(crate) fn new(resolver: &'a dyn SchemaResolver, default_dialect: Option<&'a str>) -> Self {
        Self {
            resolver,
            default_dialect,
            scopes: HashMap::new(),
        }
    }

    fn scope_for(&mut self, uri: &str) -> Result<Scope, ResolutionError> {
        if let Some(scope) = self.scopes.get(uri) {
            return Ok(scope.clone());
        }
        let scope = metaschema_scope(uri, self.resolver)?;
        self.scopes.insert(uri.to_string(), scope.clone());
        Ok(scope)
    }

    /// Scope of the document root.
    pub(crate) fn root(&mut self, node: &Value) -> Result<Scope, ResolutionError> {
        if let Some(uri) = node.get("$schema").and_then(Value::as_str) {
            return self.scope_for(uri);
        }
        match self.default_dialect {
            Some(uri) => self.scope_for(uri),
            None => {
                tracing::warn!("could not determine the dialect of the schema; no rule will match");
                Ok(Scope::unknown())
            }
        }
    }

    /// Scope of a nested location whose parent has scope `parent`.
    pub(crate) fn nested(&mut self, node: &Value, parent: &Scope) -> Result<Scope, ResolutionError> {
        let Some(uri) = node.get("$schema").and_then(Value::as_str) else {
            return Ok(parent.clone());
        };
        if !has_identifier(node, "$id") && !has_identifier(node, "id") {
            return Ok(parent.clone());
        }

        let candidate = self.scope_for(uri)?;
        let id_keyword = candidate.base_dialect.map_or("$id", |d| d.id_keyword);
        if has_identifier(node, id_keyword) {
            tracing::debug!(dialect = %uri, "entering nested schema resource");
            Ok(candidate)
        } else {
            Ok(parent.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{EmptyResolver, LocalResolver};
    use serde_json::json;

    #[test]
    fn test_official_lookup_ignores_empty_fragment() {
        let with = official_dialect("http://json-schema.org/draft-07/schema#").unwrap();
        let without = official_dialect("http://json-schema.org/draft-07/schema").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.id_keyword, "$id");
        assert!(official_dialect("https://json-schema.org/draft/2020-12/schema#").is_some());
        assert!(official_dialect("https://example.com/mine").is_none());
    }

    #[test]
    fn test_legacy_drafts_use_id() {
        let draft4 = official_dialect(vocab::DRAFT_04).unwrap();
        assert_eq!(draft4.id_keyword, "id");
        let draft6 = official_dialect(vocab::DRAFT_06).unwrap();
        assert_eq!(draft6.id_keyword, "$id");
    }

    #[test]
    fn test_hyper_schema_includes_base_vocabulary() {
        let scope = metaschema_scope(vocab::DRAFT_07_HYPER, &EmptyResolver).unwrap();
        assert!(scope.vocabularies().contains(vocab::DRAFT_07));
        assert!(scope.vocabularies().contains(vocab::DRAFT_07_HYPER));
    }

    #[test]
    fn test_official_scope_needs_no_resolver() {
        let scope =
            metaschema_scope("https://json-schema.org/draft/2020-12/schema", &EmptyResolver)
                .unwrap();
        assert!(scope.is_known());
        assert!(scope.vocabularies().contains(vocab::VALIDATION_2020_12));
        assert_eq!(scope.vocabularies().len(), 7);
    }

    #[test]
    fn test_unknown_metaschema_is_not_found() {
        let err = metaschema_scope("https://example.com/meta", &EmptyResolver).unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { ref uri } if uri == "https://example.com/meta"));
    }

    #[test]
    fn test_custom_metaschema_inherits_base_vocabularies() {
        let mut resolver = LocalResolver::new();
        resolver.insert(
            "https://example.com/meta",
            json!({"$schema": "https://json-schema.org/draft/2020-12/schema"}),
        );
        let scope = metaschema_scope("https://example.com/meta", &resolver).unwrap();
        assert_eq!(scope.dialect(), "https://example.com/meta");
        assert_eq!(
            scope.base_dialect().unwrap().uri,
            "https://json-schema.org/draft/2020-12/schema"
        );
        assert!(scope.vocabularies().contains(vocab::APPLICATOR_2020_12));
    }

    #[test]
    fn test_custom_vocabulary_replaces_inherited_set() {
        let mut resolver = LocalResolver::new();
        resolver.insert(
            "https://example.com/meta",
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$vocabulary": {
                    vocab::CORE_2020_12: true,
                    vocab::APPLICATOR_2020_12: true
                }
            }),
        );
        let scope = metaschema_scope("https://example.com/meta", &resolver).unwrap();
        assert!(scope.vocabularies().contains(vocab::APPLICATOR_2020_12));
        assert!(!scope.vocabularies().contains(vocab::VALIDATION_2020_12));
    }

    #[test]
    fn test_metaschema_cycle_is_rejected() {
        let mut resolver = LocalResolver::new();
        resolver.insert("https://example.com/a", json!({"$schema": "https://example.com/b"}));
        resolver.insert("https://example.com/b", json!({"$schema": "https://example.com/a"}));
        let err = metaschema_scope("https://example.com/a", &resolver).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownDialect { .. }));
    }

    #[test]
    fn test_metaschema_without_schema_is_rejected() {
        let mut resolver = LocalResolver::new();
        resolver.insert("https://example.com/a", json!({"type": "object"}));
        let err = metaschema_scope("https://example.com/a", &resolver).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownDialect { .. }));
    }

    #[test]
    fn test_root_without_schema_uses_default_or_unknown() {
        let mut cache = ScopeCache::new(&EmptyResolver, None);
        assert!(!cache.root(&json!({"type": "string"})).unwrap().is_known());

        let mut cache = ScopeCache::new(&EmptyResolver, Some(vocab::DRAFT_07));
        let scope = cache.root(&json!({"type": "string"})).unwrap();
        assert_eq!(scope.dialect(), vocab::DRAFT_07);
    }

    #[test]
    fn test_nested_schema_without_id_inherits() {
        let mut cache = ScopeCache::new(&EmptyResolver, None);
        let parent = metaschema_scope("https://json-schema.org/draft/2020-12/schema", &EmptyResolver)
            .unwrap();
        let nested = cache
            .nested(&json!({"$schema": vocab::DRAFT_07, "type": "string"}), &parent)
            .unwrap();
        assert_eq!(nested, parent);
    }

    #[test]
    fn test_nested_resource_is_redialected() {
        let mut cache = ScopeCache::new(&EmptyResolver, None);
        let parent = metaschema_scope("https://json-schema.org/draft/2020-12/schema", &EmptyResolver)
            .unwrap();
        let nested = cache
            .nested(
                &json!({"$schema": vocab::DRAFT_07, "$id": "https://example.com/inner"}),
                &parent,
            )
            .unwrap();
        assert_eq!(nested.dialect(), vocab::DRAFT_07);
    }

    #[test]
    fn test_nested_draft4_resource_requires_legacy_id() {
        let mut cache = ScopeCache::new(&EmptyResolver, None);
        let parent = Scope::official(official_dialect(vocab::DRAFT_07).unwrap());
        let with_dollar = cache
            .nested(&json!({"$schema": vocab::DRAFT_04, "$id": "https://example.com/x"}), &parent)
            .unwrap();
        assert_eq!(with_dollar, parent);
        let with_legacy = cache
            .nested(&json!({"$schema": vocab::DRAFT_04, "id": "https://example.com/x"}), &parent)
            .unwrap();
        assert_eq!(with_legacy.dialect(), vocab::DRAFT_04);
    }

    #[test]
    fn test_anchor_is_not_a_boundary() {
        let mut cache = ScopeCache::new(&EmptyResolver, None);
        let parent = Scope::official(official_dialect(vocab::DRAFT_07).unwrap());
        let nested = cache
            .nested(&json!({"$schema": vocab::DRAFT_06, "$id": "#anchor"}), &parent)
            .unwrap();
        assert_eq!(nested, parent);
    }
}
