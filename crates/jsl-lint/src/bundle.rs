//! # Rule Bundles
//!
//! A [`Bundle`] is the immutable, ordered rule set of one invocation. Rules
//! run in category order and, within a category, in registration order.
//!
//! ## Check
//!
//! [`Bundle::check`] walks the document once and reports every rule whose
//! condition holds at every location. Several rules may report the same
//! location. The document is never modified.
//!
//! ## Apply
//!
//! [`Bundle::apply`] rewrites the document until no rule matches. Each
//! pass walks the document afresh and, at every location, transforms with
//! the first matching rule only. Locations below a node rewritten in the
//! current pass are left for the next pass, since their shape may have
//! changed. The loop stops at the first pass that fires nothing, or fails
//! with [`LintError::NonConvergent`] once the pass cap is reached.
//!
//! ## Evaluation-sensitive rules
//!
//! Rules reporting [`Rule::affects_evaluation`] are skipped, in both modes,
//! for a document in which any location carries `unevaluatedProperties` or
//! `unevaluatedItems` under a vocabulary that defines them.
//!
//! ## Invariant
//!
//! When `apply` converges, `check` on the result with the same bundle
//! reports nothing: the final pass of `apply` evaluated the same
//! conditions over the same locations and none held.

use std::collections::HashSet;

use serde_json::Value;

use jsl_core::Pointer;

use crate::diagnostic::{Diagnostic, Reporter};
use crate::dialect::Scope;
use crate::error::LintError;
use crate::resolver::SchemaResolver;
use crate::rule::{Category, Rule, Transformer};
use crate::rules;
use crate::vocabulary::UNEVALUATED;
use crate::walker::{walk, Frame, SchemaWalker};

/// Default upper bound on `apply` passes.
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Result of a converged [`Bundle::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// Passes performed, including the final pass that fired nothing.
    pub passes: usize,
    /// Transforms fired across all passes.
    pub transforms: usize,
}

impl ApplyOutcome {
    /// Returns true if the document was modified.
    pub fn changed(&self) -> bool {
        self.transforms > 0
    }
}

/// An ordered, immutable rule set.
pub struct Bundle {
    rules: Vec<Box<dyn Rule>>,
    default_dialect: Option<String>,
    max_passes: usize,
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("rules", &self.rule_names())
            .field("default_dialect", &self.default_dialect)
            .field("max_passes", &self.max_passes)
            .finish()
    }
}

impl Bundle {
    /// Start building a bundle.
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    /// A bundle without rules. `check` always passes and `apply` never
    /// modifies.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            default_dialect: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Rule ids in execution order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the bundle has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Dialect assumed for documents without `$schema`.
    pub fn default_dialect(&self) -> Option<&str> {
        self.default_dialect.as_deref()
    }

    /// Upper bound on `apply` passes.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    fn matches(
        rule: &dyn Rule,
        node: &Value,
        scope: &Scope,
        pointer: &Pointer,
        unevaluated: bool,
    ) -> bool {
        !(unevaluated && rule.affects_evaluation())
            && rule.condition(node, scope.dialect(), scope.vocabularies(), pointer)
    }

    fn first_match(
        &self,
        node: &Value,
        scope: &Scope,
        pointer: &Pointer,
        unevaluated: bool,
    ) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .map(|rule| rule.as_ref())
            .find(|rule| Self::matches(*rule, node, scope, pointer, unevaluated))
    }

    /// Report every rule that matches anywhere in `schema`.
    ///
    /// Returns true if nothing was reported.
    ///
    /// # Errors
    ///
    /// Returns `LintError::Resolution` if a custom metaschema cannot be
    /// resolved.
    pub fn check(
        &self,
        schema: &Value,
        walker: &dyn SchemaWalker,
        resolver: &dyn SchemaResolver,
        reporter: &mut dyn Reporter,
    ) -> Result<bool, LintError> {
        let mut clean = true;
        if self.rules.is_empty() {
            return Ok(clean);
        }

        let frames: Vec<Frame<'_>> = walk(schema, walker, resolver, self.default_dialect())
            .collect::<Result<_, _>>()?;
        let unevaluated = frames
            .iter()
            .any(|frame| uses_unevaluated(frame.node, &frame.scope));

        for frame in &frames {
            if !frame.scope.is_known() {
                continue;
            }
            for rule in &self.rules {
                let rule = rule.as_ref();
                if !Self::matches(rule, frame.node, &frame.scope, &frame.pointer, unevaluated) {
                    continue;
                }
                tracing::trace!(pointer = %frame.pointer, rule = rule.name(), "diagnostic");
                clean = false;
                reporter.report(Diagnostic {
                    pointer: frame.pointer.clone(),
                    rule: rule.name().to_string(),
                    message: rule.message().to_string(),
                });
            }
        }
        Ok(clean)
    }

    /// Rewrite `schema` until no rule matches.
    ///
    /// # Errors
    ///
    /// Returns `LintError::Resolution` if a custom metaschema cannot be
    /// resolved; every location of the failing pass is still untouched.
    /// Returns `LintError::NonConvergent` if rules are still firing after
    /// [`max_passes`](Self::max_passes) passes. The document then holds the
    /// result of the last pass and should be discarded.
    pub fn apply(
        &self,
        schema: &mut Value,
        walker: &dyn SchemaWalker,
        resolver: &dyn SchemaResolver,
    ) -> Result<ApplyOutcome, LintError> {
        let mut outcome = ApplyOutcome::default();
        if self.rules.is_empty() {
            outcome.passes = 1;
            return Ok(outcome);
        }

        let mut fired_last_pass: Vec<String> = Vec::new();
        for pass in 1..=self.max_passes {
            outcome.passes = pass;

            let mut unevaluated = false;
            let mut locations: Vec<(Pointer, Scope)> = Vec::new();
            for frame in walk(schema, walker, resolver, self.default_dialect()) {
                let frame = frame?;
                unevaluated |= uses_unevaluated(frame.node, &frame.scope);
                locations.push((frame.pointer, frame.scope));
            }

            let mut rewritten: Vec<Pointer> = Vec::new();
            let mut fired: Vec<String> = Vec::new();
            for (pointer, scope) in locations {
                if !scope.is_known() || rewritten.iter().any(|done| pointer.starts_with(done)) {
                    continue;
                }
                let Some(node) = pointer.get(schema) else {
                    continue;
                };
                let Some(rule) = self.first_match(node, &scope, &pointer, unevaluated) else {
                    continue;
                };
                let Some(node) = pointer.get_mut(schema) else {
                    continue;
                };
                tracing::trace!(pass, pointer = %pointer, rule = rule.name(), "transform");
                rule.transform(&mut Transformer::new(node));
                fired.push(rule.name().to_string());
                rewritten.push(pointer);
            }

            tracing::debug!(pass, transforms = fired.len(), "apply pass complete");
            if fired.is_empty() {
                return Ok(outcome);
            }
            outcome.transforms += fired.len();
            fired_last_pass = fired;
        }

        let mut rules: Vec<String> = fired_last_pass;
        rules.sort();
        rules.dedup();
        Err(LintError::NonConvergent {
            passes: self.max_passes,
            rules,
        })
    }
}

/// Returns true if `node` carries an `unevaluated*` keyword that its
/// vocabularies give meaning to.
fn uses_unevaluated(node: &Value, scope: &Scope) -> bool {
    scope.vocabularies().contains_any(UNEVALUATED)
        && ["unevaluatedProperties", "unevaluatedItems"]
            .iter()
            .any(|keyword| node.get(*keyword).is_some())
}

/// Builder for [`Bundle`].
pub struct BundleBuilder {
    rules: Vec<Box<dyn Rule>>,
    categories: HashSet<Category>,
    default_dialect: Option<String>,
    max_passes: usize,
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            categories: HashSet::new(),
            default_dialect: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl BundleBuilder {
    /// Enable every built-in rule of `category`. Enabling a category twice
    /// has no further effect.
    pub fn category(mut self, category: Category) -> Self {
        if self.categories.insert(category) {
            self.rules.extend(rules::catalogue(category));
        }
        self
    }

    /// Enable several categories.
    pub fn categories(self, categories: impl IntoIterator<Item = Category>) -> Self {
        categories.into_iter().fold(self, Self::category)
    }

    /// Register a custom rule.
    pub fn rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Dialect assumed for documents without `$schema`.
    pub fn default_dialect(mut self, uri: impl Into<String>) -> Self {
        self.default_dialect = Some(uri.into());
        self
    }

    /// Upper bound on `apply` passes. Values below one are raised to one.
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    /// Finish the bundle.
    ///
    /// # Errors
    ///
    /// Returns `LintError::DuplicateRule` if two rules share an id.
    pub fn build(self) -> Result<Bundle, LintError> {
        let mut rules = self.rules;
        rules.sort_by_key(|rule| rule.category());

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(LintError::DuplicateRule(rule.name().to_string()));
            }
        }

        Ok(Bundle {
            rules,
            default_dialect: self.default_dialect,
            max_passes: self.max_passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::EmptyResolver;
    use crate::rules::syntax_sugar::TypeBooleanAsEnum;
    use crate::vocabulary::VocabularySet;
    use crate::walker::DefaultWalker;
    use serde_json::json;

    #[test]
    fn test_bundle_order_is_category_then_registration() {
        let bundle = Bundle::builder()
            .category(Category::SyntaxSugar)
            .category(Category::Simplify)
            .build()
            .unwrap();
        assert_eq!(
            bundle.rule_names(),
            vec![
                "single_type_array",
                "enum_to_const",
                "type_boolean_as_enum",
                "type_null_as_enum"
            ]
        );
    }

    #[test]
    fn test_category_is_idempotent() {
        let bundle = Bundle::builder()
            .category(Category::Redundant)
            .category(Category::Redundant)
            .build()
            .unwrap();
        assert_eq!(bundle.len(), 4);
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let err = Bundle::builder()
            .category(Category::SyntaxSugar)
            .rule(Box::new(TypeBooleanAsEnum))
            .build()
            .unwrap_err();
        assert!(matches!(err, LintError::DuplicateRule(id) if id == "type_boolean_as_enum"));
    }

    #[test]
    fn test_max_passes_floor() {
        let bundle = Bundle::builder().max_passes(0).build().unwrap();
        assert_eq!(bundle.max_passes(), 1);
        assert_eq!(Bundle::empty().max_passes(), DEFAULT_MAX_PASSES);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = Bundle::empty();
        let mut schema = json!({"$schema": "http://json-schema.org/draft-07/schema#", "type": "boolean"});
        let before = schema.clone();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        assert!(bundle
            .check(&schema, &DefaultWalker, &EmptyResolver, &mut diagnostics)
            .unwrap());
        let outcome = bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver).unwrap();
        assert_eq!(outcome, ApplyOutcome { passes: 1, transforms: 0 });
        assert_eq!(schema, before);
    }

    #[test]
    fn test_check_reports_all_matching_rules() {
        let bundle = Bundle::builder()
            .categories([Category::AntiPattern, Category::Redundant])
            .build()
            .unwrap();
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "string",
            "enum": ["a", "a"]
        });
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let clean = bundle
            .check(&schema, &DefaultWalker, &EmptyResolver, &mut diagnostics)
            .unwrap();
        assert!(!clean);
        let ids: Vec<&str> = diagnostics.iter().map(|d| d.rule.as_str()).collect();
        assert_eq!(ids, vec!["enum_with_type", "duplicate_enum_values"]);
        assert!(diagnostics.iter().all(|d| d.pointer.is_root()));
    }

    #[test]
    fn test_apply_first_match_per_node_per_pass() {
        let bundle = Bundle::builder()
            .categories([Category::AntiPattern, Category::Redundant])
            .build()
            .unwrap();
        let mut schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "string",
            "enum": ["a", "a"]
        });
        let outcome = bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver).unwrap();
        assert_eq!(outcome, ApplyOutcome { passes: 3, transforms: 2 });
        assert_eq!(
            schema,
            json!({"$schema": "http://json-schema.org/draft-07/schema#", "enum": ["a"]})
        );
    }

    #[test]
    fn test_unknown_dialect_matches_nothing() {
        let bundle = Bundle::builder().category(Category::SyntaxSugar).build().unwrap();
        let mut schema = json!({"type": "boolean"});
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        assert!(bundle
            .check(&schema, &DefaultWalker, &EmptyResolver, &mut diagnostics)
            .unwrap());
        let outcome = bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver).unwrap();
        assert!(!outcome.changed());
    }

    #[test]
    fn test_default_dialect_applies_without_schema() {
        let bundle = Bundle::builder()
            .category(Category::SyntaxSugar)
            .default_dialect("https://json-schema.org/draft/2020-12/schema")
            .build()
            .unwrap();
        let mut schema = json!({"properties": {"flag": {"type": "boolean"}}});
        bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver).unwrap();
        assert_eq!(schema, json!({"properties": {"flag": {"enum": [false, true]}}}));
    }

    struct WrapInAllOf;

    impl Rule for WrapInAllOf {
        fn name(&self) -> &'static str {
            "wrap_in_all_of"
        }
        fn category(&self) -> Category {
            Category::Simplify
        }
        fn message(&self) -> &'static str {
            "wrap"
        }
        fn condition(&self, schema: &Value, _: &str, _: &VocabularySet, pointer: &Pointer) -> bool {
            pointer.len() < 4 && schema.get("minimum").is_some()
        }
        fn transform(&self, transformer: &mut Transformer<'_>) {
            if let Some(minimum) = transformer.erase("minimum") {
                transformer.assign("allOf", json!([{"minimum": minimum}]));
            }
        }
    }

    #[test]
    fn test_new_subschemas_are_visited_next_pass() {
        let bundle = Bundle::builder().rule(Box::new(WrapInAllOf)).build().unwrap();
        let mut schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "minimum": 1
        });
        let outcome = bundle.apply(&mut schema, &DefaultWalker, &EmptyResolver).unwrap();
        assert_eq!(outcome.transforms, 2);
        assert_eq!(outcome.passes, 3);
        assert_eq!(
            schema,
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "allOf": [{"allOf": [{"minimum": 1}]}]
            })
        );
    }
}
