//! Redundant: keywords that restate the default or repeat themselves.

use serde_json::Value;

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::{deduplicate, defines, has_duplicates, is_trivial_schema};
use crate::vocabulary::{VocabularySet, APPLICATOR, VALIDATION};

/// `additionalProperties` set to `true` or `{}`.
///
/// The keyword marks every remaining property as evaluated, so it is kept
/// wherever an `unevaluatedProperties` keyword is in effect.
pub struct AdditionalPropertiesDefault;

impl Rule for AdditionalPropertiesDefault {
    fn name(&self) -> &'static str {
        "additional_properties_default"
    }

    fn category(&self) -> Category {
        Category::Redundant
    }

    fn message(&self) -> &'static str {
        "Setting `additionalProperties` to `true` does not add any further constraint"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(APPLICATOR)
            && !defines(schema, "unevaluatedProperties")
            && schema.get("additionalProperties").is_some_and(is_trivial_schema)
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.erase("additionalProperties");
    }

    fn affects_evaluation(&self) -> bool {
        true
    }
}

/// Single-schema `items` set to `true` or `{}`.
///
/// The keyword marks every item as evaluated, so it is kept wherever an
/// `unevaluatedItems` keyword is in effect.
pub struct ItemsSchemaDefault;

impl Rule for ItemsSchemaDefault {
    fn name(&self) -> &'static str {
        "items_schema_default"
    }

    fn category(&self) -> Category {
        Category::Redundant
    }

    fn message(&self) -> &'static str {
        "Setting the `items` keyword to the empty schema does not add any further constraint"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(APPLICATOR)
            && !defines(schema, "unevaluatedItems")
            && schema.get("items").is_some_and(is_trivial_schema)
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.erase("items");
    }

    fn affects_evaluation(&self) -> bool {
        true
    }
}

fn duplicated(schema: &Value, keyword: &str) -> bool {
    schema
        .get(keyword)
        .and_then(Value::as_array)
        .is_some_and(|values| has_duplicates(values))
}

fn remove_duplicates(transformer: &mut Transformer<'_>, keyword: &str) {
    let unique = match transformer.get(keyword) {
        Some(Value::Array(values)) => deduplicate(values),
        _ => return,
    };
    transformer.assign(keyword, Value::Array(unique));
}

/// Repeated values in `enum`.
pub struct DuplicateEnumValues;

impl Rule for DuplicateEnumValues {
    fn name(&self) -> &'static str {
        "duplicate_enum_values"
    }

    fn category(&self) -> Category {
        Category::Redundant
    }

    fn message(&self) -> &'static str {
        "Setting duplicate values in `enum` is considered an anti-pattern"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION) && duplicated(schema, "enum")
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        remove_duplicates(transformer, "enum");
    }
}

/// Repeated names in `required`.
pub struct DuplicateRequiredValues;

impl Rule for DuplicateRequiredValues {
    fn name(&self) -> &'static str {
        "duplicate_required_values"
    }

    fn category(&self) -> Category {
        Category::Redundant
    }

    fn message(&self) -> &'static str {
        "Setting duplicate values in `required` is considered an anti-pattern"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION) && duplicated(schema, "required")
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        remove_duplicates(transformer, "required");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::official_dialect;
    use crate::vocabulary as vocab;
    use serde_json::json;

    fn matches(rule: &dyn Rule, schema: &Value) -> bool {
        let vocabularies = official_dialect(vocab::DRAFT_07).unwrap().vocabulary_set();
        rule.condition(schema, vocab::DRAFT_07, &vocabularies, &Pointer::root())
    }

    #[test]
    fn test_additional_properties_default() {
        assert!(matches(&AdditionalPropertiesDefault, &json!({"additionalProperties": true})));
        assert!(matches(&AdditionalPropertiesDefault, &json!({"additionalProperties": {}})));
        assert!(!matches(&AdditionalPropertiesDefault, &json!({"additionalProperties": false})));
        assert!(!matches(
            &AdditionalPropertiesDefault,
            &json!({"additionalProperties": true, "unevaluatedProperties": false})
        ));

        let mut schema = json!({"type": "object", "additionalProperties": {}});
        AdditionalPropertiesDefault.transform(&mut Transformer::new(&mut schema));
        assert_eq!(schema, json!({"type": "object"}));
    }

    #[test]
    fn test_items_schema_default() {
        assert!(matches(&ItemsSchemaDefault, &json!({"items": true})));
        assert!(!matches(&ItemsSchemaDefault, &json!({"items": [true]})));
        assert!(!matches(&ItemsSchemaDefault, &json!({"items": {"type": "string"}})));
    }

    #[test]
    fn test_only_default_keywords_affect_evaluation() {
        assert!(AdditionalPropertiesDefault.affects_evaluation());
        assert!(ItemsSchemaDefault.affects_evaluation());
        assert!(!DuplicateEnumValues.affects_evaluation());
        assert!(!DuplicateRequiredValues.affects_evaluation());
    }

    #[test]
    fn test_duplicate_enum_values() {
        let mut schema = json!({"enum": [1, "a", 1, null, null]});
        assert!(matches(&DuplicateEnumValues, &schema));
        DuplicateEnumValues.transform(&mut Transformer::new(&mut schema));
        assert_eq!(schema, json!({"enum": [1, "a", null]}));
        assert!(!matches(&DuplicateEnumValues, &schema));
    }

    #[test]
    fn test_duplicate_required_values() {
        let mut schema = json!({"required": ["a", "b", "a"]});
        assert!(matches(&DuplicateRequiredValues, &schema));
        DuplicateRequiredValues.transform(&mut Transformer::new(&mut schema));
        assert_eq!(schema, json!({"required": ["a", "b"]}));
        assert!(!matches(&DuplicateRequiredValues, &json!({"required": "a"})));
    }
}
