//! SyntaxSugar: shorthand types expanded into explicit enumerations.

use serde_json::{json, Value};

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::defines;
use crate::vocabulary::{VocabularySet, VALIDATION};

fn single_valued_type(schema: &Value, name: &str, vocabularies: &VocabularySet) -> bool {
    vocabularies.contains_any(VALIDATION)
        && schema.get("type").and_then(Value::as_str) == Some(name)
        && !defines(schema, "enum")
        && !defines(schema, "const")
}

/// `type: boolean` is `enum: [false, true]`.
pub struct TypeBooleanAsEnum;

impl Rule for TypeBooleanAsEnum {
    fn name(&self) -> &'static str {
        "type_boolean_as_enum"
    }

    fn category(&self) -> Category {
        Category::SyntaxSugar
    }

    fn message(&self) -> &'static str {
        "Setting `type` to `boolean` is syntax sugar for an enumeration of two values: `false` and `true`"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        single_valued_type(schema, "boolean", vocabularies)
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.assign("enum", json!([false, true]));
        transformer.erase("type");
    }
}

/// `type: null` is `enum: [null]`.
pub struct TypeNullAsEnum;

impl Rule for TypeNullAsEnum {
    fn name(&self) -> &'static str {
        "type_null_as_enum"
    }

    fn category(&self) -> Category {
        Category::SyntaxSugar
    }

    fn message(&self) -> &'static str {
        "Setting `type` to `null` is syntax sugar for an enumeration of a single value: `null`"
    }

    fn condition(
        &self,
        schema: &Value,
        _dialect: &str,
        vocabularies: &VocabularySet,
        _pointer: &Pointer,
    ) -> bool {
        single_valued_type(schema, "null", vocabularies)
    }

    fn transform(&self, transformer: &mut Transformer<'_>) {
        transformer.assign("enum", json!([null]));
        transformer.erase("type");
    }
}
