//! Simplify: shorter spellings of the same constraint.

use serde_json::Value;

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::defines;
use crate::vocabulary::{VocabularySet, VALIDATION, VALIDATION_SINCE_DRAFT_06};

/// A `type` array with one name.
pub struct SingleTypeArray;

fn single_type(schema: &Value) -> Option<&str> {
    match schema.get("type")?.as_array()?.as_slice() {
        [Value::String(name)] => Some(name.as_str()),
        _ => None,
    }
}

impl Rule for SingleTypeArray {
    fn name(&self) -> &'static str {
        "single_type_array"
    }

    fn category(&self) -> Category {
        Category::Simplify
    }

    fn message(&self) -> &'static str {
        "Setting `type` to an array of a single type is the same as directly declaring such type"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION) && single_type(schema).is_some()
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        if let Some(name) = single_type(transformer.schema()).map(str::to_string) {
            transformer.assign("type", Value::String(name));
        }
    }
}

/// An `enum` of one value.
pub struct EnumToConst;

impl Rule for EnumToConst {
    fn name(&self) -> &'static str {
        "enum_to_const"
    }

    fn category(&self) -> Category {
        Category::Simplify
    }

    fn message(&self) -> &'static str {
        "An `enum` of a single value can be expressed as `const`"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        vocabularies.contains_any(VALIDATION_SINCE_DRAFT_06)
            && !defines(schema, "const")
            && schema
                .get("enum")
                .and_then(Value::as_array)
                .is_some_and(|values| values.len() == 1)
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        if let Some(Value::Array(mut values)) = transformer.erase("enum") {
            if let Some(value) = values.pop() {
                transformer.assign("const", value);
            }
        }
    }
}
