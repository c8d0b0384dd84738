//! Modernize: newer-draft spellings of older keywords.

use serde_json::{Map, Value};

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::defines;
use crate::vocabulary::{self as vocab, VocabularySet};

/// Array-form `items` becomes `prefixItems` under 2020-12, and
/// `additionalItems` takes over `items`.
pub struct ItemsArrayToPrefixItems;

impl Rule for ItemsArrayToPrefixItems {
    fn name(&self) -> &'static str {
        "items_array_to_prefix_items"
    }

    fn category(&self) -> Category {
        Category::Modernize
    }

    fn message(&self) -> &'static str {
        "The array form of `items` is replaced by `prefixItems` in 2020-12, with `items` taking the role of `additionalItems`"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains(vocab::APPLICATOR_2020_12)
            && schema.get("items").is_some_and(Value::is_array)
            && !defines(schema, "prefixItems")
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.rename("items", "prefixItems");
        transformer.rename("additionalItems", "items");
    }
}

/// `dependencies` splits into `dependentRequired` and `dependentSchemas`
/// from 2019-09 onwards.
pub struct DependenciesToDependent;

fn is_property_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|names| names.iter().all(Value::is_string))
}

impl Rule for DependenciesToDependent {
    fn name(&self) -> &'static str {
        "dependencies_to_dependent"
    }

    fn category(&self) -> Category {
        Category::Modernize
    }

    fn message(&self) -> &'static str {
        "The `dependencies` keyword is split into `dependentRequired` and `dependentSchemas` since 2019-09"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        let applicator = vocabularies
            .contains_any(&[vocab::APPLICATOR_2019_09, vocab::APPLICATOR_2020_12]);
        let validation = vocabularies
            .contains_any(&[vocab::VALIDATION_2019_09, vocab::VALIDATION_2020_12]);
        applicator
            && validation
            && !defines(schema, "dependentRequired")
            && !defines(schema, "dependentSchemas")
            && schema
                .get("dependencies")
                .and_then(Value::as_object)
                .is_some_and(|entries| {
                    entries
                        .values()
                        .all(|v| is_property_list(v) || v.is_object() || v.is_boolean())
                })
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        let Some(Value::Object(entries)) = transformer.erase("dependencies") else {
            return;
        };
        let mut required = Map::new();
        let mut schemas = Map::new();
        for (name, value) in entries {
            if is_property_list(&value) {
                required.insert(name, value);
            } else {
                schemas.insert(name, value);
            }
        }
        if !required.is_empty() {
            transformer.assign("dependentRequired", Value::Object(required));
        }
        if !schemas.is_empty() {
            transformer.assign("dependentSchemas", Value::Object(schemas));
        }
    }
}
