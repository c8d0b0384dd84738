//! AntiPattern: valid but discouraged keyword combinations.

use serde_json::Value;

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::type_admits;
use crate::vocabulary::{VocabularySet, VALIDATION, VALIDATION_SINCE_DRAFT_06};

/// `type` next to an `enum` whose values already satisfy it.
pub struct EnumWithType;

impl Rule for EnumWithType {
    fn name(&self) -> &'static str {
        "enum_with_type"
    }

    fn category(&self) -> Category {
        Category::AntiPattern
    }

    fn message(&self) -> &'static str {
        "Setting `type` alongside `enum` is considered an anti-pattern, as the enumeration choices already imply their respective types"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION)
            && schema.get("enum").and_then(Value::as_array).is_some_and(|values| {
                !values.is_empty() && values.iter().all(|v| type_admits(schema, v))
            })
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.erase("type");
    }
}

/// `type` next to a `const` that already satisfies it.
pub struct ConstWithType;

impl Rule for ConstWithType {
    fn name(&self) -> &'static str {
        "const_with_type"
    }

    fn category(&self) -> Category {
        Category::AntiPattern
    }

    fn message(&self) -> &'static str {
        "Setting `type` alongside `const` is considered an anti-pattern, as the constant already implies its respective type"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION_SINCE_DRAFT_06)
            && schema.get("const").is_some_and(|v| type_admits(schema, v))
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.erase("type");
    }
}

fn numeric_pair(schema: &Value, exclusive: &str, inclusive: &str) -> Option<(f64, f64)> {
    let exclusive = schema.get(exclusive).and_then(Value::as_f64)?;
    let inclusive = schema.get(inclusive).and_then(Value::as_f64)?;
    Some((exclusive, inclusive))
}

/// Numeric `exclusiveMaximum` together with `maximum`. Only the tighter
/// bound is kept; on a tie the exclusive bound wins.
pub struct ExclusiveMaximumNumberAndMaximum;

impl Rule for ExclusiveMaximumNumberAndMaximum {
    fn name(&self) -> &'static str {
        "exclusive_maximum_number_and_maximum"
    }

    fn category(&self) -> Category {
        Category::AntiPattern
    }

    fn message(&self) -> &'static str {
        "Setting both `exclusiveMaximum` and `maximum` at the same time is considered an anti-pattern. You should choose one"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION_SINCE_DRAFT_06)
            && numeric_pair(schema, "exclusiveMaximum", "maximum").is_some()
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        let Some((exclusive, maximum)) =
            numeric_pair(transformer.schema(), "exclusiveMaximum", "maximum")
        else {
            return;
        };
        if maximum < exclusive {
            transformer.erase("exclusiveMaximum");
        } else {
            transformer.erase("maximum");
        }
    }
}

/// Numeric `exclusiveMinimum` together with `minimum`. Only the tighter
/// bound is kept; on a tie the exclusive bound wins.
pub struct ExclusiveMinimumNumberAndMinimum;

impl Rule for ExclusiveMinimumNumberAndMinimum {
    fn name(&self) -> &'static str {
        "exclusive_minimum_number_and_minimum"
    }

    fn category(&self) -> Category {
        Category::AntiPattern
    }

    fn message(&self) -> &'static str {
        "Setting both `exclusiveMinimum` and `minimum` at the same time is considered an anti-pattern. You should choose one"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION_SINCE_DRAFT_06)
            && numeric_pair(schema, "exclusiveMinimum", "minimum").is_some()
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        let Some((exclusive, minimum)) =
            numeric_pair(transformer.schema(), "exclusiveMinimum", "minimum")
        else {
            return;
        };
        if minimum > exclusive {
            transformer.erase("exclusiveMinimum");
        } else {
            transformer.erase("minimum");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::official_dialect;
    use crate::vocabulary as vocab;
    use serde_json::json;

    fn draft(uri: &str) -> VocabularySet {
        official_dialect(uri).unwrap().vocabulary_set()
    }

    fn fires(rule: &dyn Rule, schema: &Value, uri: &str) -> bool {
        rule.condition(schema, uri, &draft(uri), &Pointer::root())
    }

    fn fixed(rule: &dyn Rule, mut schema: Value) -> Value {
        rule.transform(&mut Transformer::new(&mut schema));
        schema
    }

    #[test]
    fn test_enum_with_type() {
        let schema = json!({"type": "string", "enum": ["a", "b"]});
        assert!(fires(&EnumWithType, &schema, vocab::DRAFT_04));
        assert_eq!(fixed(&EnumWithType, schema), json!({"enum": ["a", "b"]}));
    }

    #[test]
    fn test_enum_with_narrowing_type_is_kept() {
        let schema = json!({"type": "string", "enum": ["a", 1]});
        assert!(!fires(&EnumWithType, &schema, vocab::DRAFT_07));
        let schema = json!({"type": "integer", "enum": [1.5]});
        assert!(!fires(&EnumWithType, &schema, vocab::DRAFT_07));
    }

    #[test]
    fn test_enum_with_malformed_type() {
        let schema = json!({"type": 3, "enum": ["a"]});
        assert!(!fires(&EnumWithType, &schema, vocab::DRAFT_07));
        assert!(!fires(&EnumWithType, &json!({"type": "string", "enum": "a"}), vocab::DRAFT_07));
    }

    #[test]
    fn test_const_with_type() {
        let schema = json!({"type": ["null", "integer"], "const": 4});
        assert!(fires(&ConstWithType, &schema, vocab::DRAFT_06));
        assert!(!fires(&ConstWithType, &schema, vocab::DRAFT_04));
        assert_eq!(fixed(&ConstWithType, schema), json!({"const": 4}));
    }

    #[test]
    fn test_exclusive_maximum_keeps_tighter_bound() {
        let rule = ExclusiveMaximumNumberAndMaximum;
        let schema = json!({"exclusiveMaximum": 10, "maximum": 5});
        assert!(fires(&rule, &schema, vocab::DRAFT_07));
        assert_eq!(fixed(&rule, schema), json!({"maximum": 5}));
        assert_eq!(
            fixed(&rule, json!({"exclusiveMaximum": 5, "maximum": 10})),
            json!({"exclusiveMaximum": 5})
        );
        assert_eq!(
            fixed(&rule, json!({"exclusiveMaximum": 5, "maximum": 5})),
            json!({"exclusiveMaximum": 5})
        );
    }

    #[test]
    fn test_exclusive_maximum_boolean_form_is_draft4() {
        let schema = json!({"exclusiveMaximum": true, "maximum": 5});
        assert!(!fires(&ExclusiveMaximumNumberAndMaximum, &schema, vocab::DRAFT_04));
        assert!(!fires(&ExclusiveMaximumNumberAndMaximum, &schema, vocab::DRAFT_07));
    }

    #[test]
    fn test_exclusive_minimum_keeps_tighter_bound() {
        let rule = ExclusiveMinimumNumberAndMinimum;
        assert_eq!(
            fixed(&rule, json!({"exclusiveMinimum": 1, "minimum": 3})),
            json!({"minimum": 3})
        );
        assert_eq!(
            fixed(&rule, json!({"exclusiveMinimum": 3, "minimum": 1})),
            json!({"exclusiveMinimum": 3})
        );
        assert_eq!(
            fixed(&rule, json!({"exclusiveMinimum": 2, "minimum": 2})),
            json!({"exclusiveMinimum": 2})
        );
    }
}
