//! # Schema Compilation and Evaluation
//!
//! Compiles a schema into a [`Template`] and evaluates instances against
//! it, reporting every violation with its instance location, schema
//! location and message.
//!
//! ## Dialect Selection
//!
//! The draft is chosen from the schema's `$schema` (or the configured
//! default), using the same dialect detection as the linter. A custom
//! metaschema is resolved to the official dialect it builds on and the
//! schema is compiled under that dialect. Draft-03 and older cannot be
//! compiled.
//!
//! ## Tracing
//!
//! [`Template::trace`] reports the evaluation in the basic output format:
//! the annotations collected by a passing evaluation, or the errors of a
//! failing one, each with its keyword and instance location.
//!
//! ## Schema Resolution
//!
//! `$ref` targets outside the schema are served from a [`LocalResolver`].
//! No network request is ever made: an unknown URI fails compilation.

use std::fmt;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

use jsl_lint::dialect::normalize_uri;
use jsl_lint::vocabulary as vocab;
use jsl_lint::{metaschema_scope, LocalResolver, ResolutionError, SchemaResolver};

const DEFAULT_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Resolves `$ref` URIs from the schemas held by a [`LocalResolver`].
struct LocalSchemaRetriever {
    resolver: LocalResolver,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        match self.resolver.resolve(uri)? {
            Some(schema) => Ok(schema),
            None => Err(Box::new(ResolutionError::NotFound {
                uri: uri.to_string(),
            })),
        }
    }
}

/// Error during schema compilation or instance validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The instance did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Identifier of the schema, or `(anonymous)`.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The value to compile is neither an object nor a boolean.
    #[error("not a schema: {reason}")]
    NotASchema {
        /// What was found instead.
        reason: String,
    },

    /// The schema's dialect has no evaluator.
    #[error("unsupported dialect '{dialect}'")]
    UnsupportedDialect {
        /// The declared metaschema URI.
        dialect: String,
    },

    /// The metaschema could not be resolved.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Identifier of the schema, or `(anonymous)`.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The evaluation output could not be converted to a trace.
    #[error("trace serialization error: {0}")]
    Trace(#[from] serde_json::Error),
}

/// Whether a trace step records an annotation or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// An annotation produced by a passing keyword.
    Annotation,
    /// A failing keyword.
    Error,
}

impl TraceKind {
    /// Returns the lowercase kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::Error => "error",
        }
    }
}

/// One step of an evaluation trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Annotation or error.
    pub kind: TraceKind,
    /// JSON Pointer to the keyword within the schema.
    pub keyword_location: String,
    /// JSON Pointer to the evaluated value in the instance.
    pub instance_location: String,
    /// The error message, or the annotation value as JSON.
    pub detail: String,
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} at {:?}: {}",
            self.kind.as_str(),
            self.keyword_location,
            self.instance_location,
            self.detail
        )
    }
}

fn output_text(unit: &Value, key: &str) -> String {
    match unit.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// The `jsonschema` draft for an official dialect URI.
fn draft_for(uri: &str) -> Option<Draft> {
    let uri = normalize_uri(uri);
    let is = |candidate: &str| normalize_uri(candidate) == uri;
    if is(DEFAULT_DIALECT) {
        Some(Draft::Draft202012)
    } else if is("https://json-schema.org/draft/2019-09/schema") {
        Some(Draft::Draft201909)
    } else if is(vocab::DRAFT_07) || is(vocab::DRAFT_07_HYPER) {
        Some(Draft::Draft7)
    } else if is(vocab::DRAFT_06) || is(vocab::DRAFT_06_HYPER) {
        Some(Draft::Draft6)
    } else if is(vocab::DRAFT_04) || is(vocab::DRAFT_04_HYPER) {
        Some(Draft::Draft4)
    } else {
        None
    }
}

fn schema_name(schema: &Value) -> String {
    ["$id", "id"]
        .iter()
        .find_map(|keyword| schema.get(*keyword).and_then(Value::as_str))
        .unwrap_or("(anonymous)")
        .to_string()
}

/// Compiles schemas against a fixed set of resolvable schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    resolver: LocalResolver,
    default_dialect: Option<String>,
}

impl SchemaCompiler {
    /// A compiler resolving references and metaschemas from `resolver`.
    pub fn new(resolver: LocalResolver) -> Self {
        Self {
            resolver,
            default_dialect: None,
        }
    }

    /// Dialect assumed for schemas without `$schema`. 2020-12 otherwise.
    pub fn with_default_dialect(mut self, uri: impl Into<String>) -> Self {
        self.default_dialect = Some(uri.into());
        self
    }

    fn options(&self, draft: Draft) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(draft);
        opts.with_retriever(LocalSchemaRetriever {
            resolver: self.resolver.clone(),
        });
        opts
    }

    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::NotASchema` for values other than
    /// objects and booleans, `Resolution` when a custom metaschema cannot
    /// be resolved, `UnsupportedDialect` for draft-03 and older, and
    /// `ValidatorBuildError` when the schema itself is invalid.
    pub fn compile(&self, schema: &Value) -> Result<Template, SchemaValidationError> {
        if !schema.is_object() && !schema.is_boolean() {
            return Err(SchemaValidationError::NotASchema {
                reason: format!("expected an object or a boolean, found {schema}"),
            });
        }

        let declared = schema
            .get("$schema")
            .and_then(Value::as_str)
            .or(self.default_dialect.as_deref())
            .unwrap_or(DEFAULT_DIALECT);
        let scope = metaschema_scope(declared, &self.resolver)?;
        let base = scope
            .base_dialect()
            .ok_or_else(|| SchemaValidationError::UnsupportedDialect {
                dialect: declared.to_string(),
            })?;
        let draft = draft_for(base.uri).ok_or_else(|| SchemaValidationError::UnsupportedDialect {
            dialect: declared.to_string(),
        })?;

        let mut effective = schema.clone();
        if normalize_uri(declared) != normalize_uri(base.uri) {
            if let Value::Object(map) = &mut effective {
                map.insert("$schema".to_string(), Value::String(base.uri.to_string()));
            }
        }

        let name = schema_name(schema);
        tracing::debug!(schema = %name, dialect = %declared, base = %base.uri, "compiling schema");
        let validator = self.options(draft).build(&effective).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: name.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Template {
            validator,
            name,
            dialect: declared.to_string(),
        })
    }
}

/// A compiled schema.
pub struct Template {
    validator: Validator,
    name: String,
    dialect: String,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Template {
    /// Identifier of the compiled schema, or `(anonymous)`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared metaschema URI of the compiled schema.
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Evaluate `instance`, passing each violation to `observer`.
    ///
    /// Returns true if the instance is valid.
    pub fn evaluate(
        &self,
        instance: &Value,
        mut observer: Option<&mut dyn FnMut(&Violation)>,
    ) -> bool {
        let mut valid = true;
        for error in self.validator.iter_errors(instance) {
            valid = false;
            let Some(observer) = observer.as_deref_mut() else {
                break;
            };
            observer(&Violation {
                instance_path: error.instance_path.to_string(),
                schema_path: error.schema_path.to_string(),
                message: error.to_string(),
            });
        }
        valid
    }

    /// All violations of `instance`.
    pub fn violations(&self, instance: &Value) -> ValidationViolations {
        let mut violations = Vec::new();
        let mut collect = |violation: &Violation| violations.push(violation.clone());
        self.evaluate(instance, Some(&mut collect as &mut dyn FnMut(&Violation)));
        ValidationViolations { violations }
    }

    /// Evaluate `instance` and return its basic-format trace.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::Trace` if the evaluation output
    /// cannot be serialized.
    pub fn trace(&self, instance: &Value) -> Result<Vec<TraceStep>, SchemaValidationError> {
        let output = serde_json::to_value(self.validator.apply(instance).basic())?;
        let (kind, units) = if output.get("valid").and_then(Value::as_bool) == Some(true) {
            (TraceKind::Annotation, output.get("annotations"))
        } else {
            (TraceKind::Error, output.get("errors"))
        };
        let steps = units
            .and_then(Value::as_array)
            .map(|units| {
                units
                    .iter()
                    .map(|unit| TraceStep {
                        kind,
                        keyword_location: output_text(unit, "keywordLocation"),
                        instance_location: output_text(unit, "instanceLocation"),
                        detail: match unit.get("error") {
                            Some(_) => output_text(unit, "error"),
                            None => output_text(unit, "annotations"),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(steps)
    }

    /// Validate `instance`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with every
    /// violation if the instance is invalid.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let violations = self.violations(instance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.name.clone(),
                violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(schema: Value) -> Template {
        SchemaCompiler::default().compile(&schema).unwrap()
    }

    #[test]
    fn test_valid_instance() {
        let template = compile(json!({"type": "object", "required": ["a"]}));
        assert!(template.evaluate(&json!({"a": 1}), None));
        assert!(template.validate(&json!({"a": 1})).is_ok());
    }

    #[test]
    fn test_violations_are_located() {
        let template = compile(json!({
            "$schema": DEFAULT_DIALECT,
            "properties": {"a": {"type": "string"}}
        }));
        let violations = template.violations(&json!({"a": 1}));
        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.instance_path, "/a");
        assert!(violation.schema_path.contains("/properties/a/type"));
    }

    #[test]
    fn test_observer_sees_every_violation() {
        let template = compile(json!({"type": "object", "minProperties": 1, "required": ["a"]}));
        let mut seen = 0;
        let mut count = |_: &Violation| seen += 1;
        let valid = template.evaluate(&json!({}), Some(&mut count as &mut dyn FnMut(&Violation)));
        assert!(!valid);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_draft_selection() {
        assert_eq!(draft_for(vocab::DRAFT_07), Some(Draft::Draft7));
        assert_eq!(draft_for("http://json-schema.org/draft-04/schema"), Some(Draft::Draft4));
        assert_eq!(draft_for(vocab::DRAFT_06_HYPER), Some(Draft::Draft6));
        assert_eq!(draft_for(vocab::DRAFT_03), None);
    }

    #[test]
    fn test_draft4_exclusive_maximum_semantics() {
        let template = compile(json!({
            "$schema": vocab::DRAFT_04,
            "maximum": 5,
            "exclusiveMaximum": true
        }));
        assert!(!template.evaluate(&json!(5), None));
        assert!(template.evaluate(&json!(4), None));
    }

    #[test]
    fn test_draft3_is_unsupported() {
        let err = SchemaCompiler::default()
            .compile(&json!({"$schema": vocab::DRAFT_03}))
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::UnsupportedDialect { .. }));
    }

    #[test]
    fn test_not_a_schema() {
        let err = SchemaCompiler::default().compile(&json!([1])).unwrap_err();
        assert!(matches!(err, SchemaValidationError::NotASchema { .. }));
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(compile(json!(true)).evaluate(&json!("anything"), None));
        assert!(!compile(json!(false)).evaluate(&json!(null), None));
    }

    #[test]
    fn test_custom_metaschema_compiles_under_base_dialect() {
        let mut resolver = LocalResolver::new();
        resolver.add(json!({
            "$id": "https://example.com/meta",
            "$schema": vocab::DRAFT_07
        }));
        let template = SchemaCompiler::new(resolver)
            .compile(&json!({"$schema": "https://example.com/meta", "type": "integer"}))
            .unwrap();
        assert_eq!(template.dialect(), "https://example.com/meta");
        assert!(template.evaluate(&json!(3), None));
        assert!(!template.evaluate(&json!("3"), None));
    }

    #[test]
    fn test_unknown_metaschema_fails() {
        let err = SchemaCompiler::default()
            .compile(&json!({"$schema": "https://example.com/nope"}))
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::Resolution(_)));
    }

    #[test]
    fn test_trace_of_failing_instance() {
        let template = compile(json!({"properties": {"a": {"type": "string"}}}));
        let steps = template.trace(&json!({"a": 1})).unwrap();
        assert!(!steps.is_empty());
        assert!(steps.iter().all(|step| step.kind == TraceKind::Error));
        assert!(steps.iter().any(|step| step.instance_location == "/a"
            && step.keyword_location.contains("/properties/a/type")));
    }

    #[test]
    fn test_trace_of_passing_instance() {
        let template = compile(json!({"title": "Counter", "type": "integer"}));
        let steps = template.trace(&json!(3)).unwrap();
        assert!(steps.iter().all(|step| step.kind == TraceKind::Annotation));
    }

    #[test]
    fn test_display_formats() {
        let violation = Violation {
            instance_path: String::new(),
            schema_path: "/type".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(violation.to_string(), "  (root): bad");
    }
}
