//! # Rule Catalogue
//!
//! The built-in rules, one module per category. Every condition is gated
//! on the vocabulary that gives its keywords meaning, so a rule never
//! fires under a dialect where the pattern means something else.
//!
//! | Category | Rules |
//! |----------|-------|
//! | Modernize | `items_array_to_prefix_items`, `dependencies_to_dependent` |
//! | AntiPattern | `enum_with_type`, `const_with_type`, `exclusive_maximum_number_and_maximum`, `exclusive_minimum_number_and_minimum` |
//! | Simplify | `single_type_array`, `enum_to_const` |
//! | Redundant | `additional_properties_default`, `items_schema_default`, `duplicate_enum_values`, `duplicate_required_values` |
//! | Superfluous | `then_without_if`, `else_without_if`, `max_contains_without_contains`, `min_contains_without_contains`, `content_schema_without_media_type` |
//! | SyntaxSugar | `type_boolean_as_enum`, `type_null_as_enum` |

use serde_json::Value;

use crate::rule::{Category, Rule};

pub mod antipattern;
pub mod modernize;
pub mod redundant;
pub mod simplify;
pub mod superfluous;
pub mod syntax_sugar;

/// The built-in rules of `category`, in registration order.
pub fn catalogue(category: Category) -> Vec<Box<dyn Rule>> {
    match category {
        Category::Modernize => vec![
            Box::new(modernize::ItemsArrayToPrefixItems),
            Box::new(modernize::DependenciesToDependent),
        ],
        Category::AntiPattern => vec![
            Box::new(antipattern::EnumWithType),
            Box::new(antipattern::ConstWithType),
            Box::new(antipattern::ExclusiveMaximumNumberAndMaximum),
            Box::new(antipattern::ExclusiveMinimumNumberAndMinimum),
        ],
        Category::Simplify => vec![
            Box::new(simplify::SingleTypeArray),
            Box::new(simplify::EnumToConst),
        ],
        Category::Redundant => vec![
            Box::new(redundant::AdditionalPropertiesDefault),
            Box::new(redundant::ItemsSchemaDefault),
            Box::new(redundant::DuplicateEnumValues),
            Box::new(redundant::DuplicateRequiredValues),
        ],
        Category::Superfluous => vec![
            Box::new(superfluous::ThenWithoutIf),
            Box::new(superfluous::ElseWithoutIf),
            Box::new(superfluous::MaxContainsWithoutContains),
            Box::new(superfluous::MinContainsWithoutContains),
            Box::new(superfluous::ContentSchemaWithoutMediaType),
        ],
        Category::SyntaxSugar => vec![
            Box::new(syntax_sugar::TypeBooleanAsEnum),
            Box::new(syntax_sugar::TypeNullAsEnum),
        ],
    }
}

/// Returns true if `schema` is an object with `keyword`.
pub(crate) fn defines(schema: &Value, keyword: &str) -> bool {
    schema.as_object().is_some_and(|map| map.contains_key(keyword))
}

/// The type names of `type`, or `None` when it is neither a string nor an
/// array of strings.
pub(crate) fn type_names(schema: &Value) -> Option<Vec<&str>> {
    match schema.get("type")? {
        Value::String(name) => Some(vec![name.as_str()]),
        Value::Array(names) => names.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

/// Whether `value` is an instance of the primitive type `name`.
///
/// Only exact integers match `integer`, and unknown type names never match.
pub(crate) fn is_instance_of(value: &Value, name: &str) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "any" => true,
        _ => false,
    }
}

/// Returns true if `type` is well formed and one of its names admits `value`.
pub(crate) fn type_admits(schema: &Value, value: &Value) -> bool {
    type_names(schema).is_some_and(|names| names.iter().any(|name| is_instance_of(value, name)))
}

/// Returns true if `items` holds a repeated value.
pub(crate) fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, item)| items[..i].contains(item))
}

/// `items` with repeats removed, keeping first occurrences.
pub(crate) fn deduplicate(items: &[Value]) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

/// Returns true if `value` is `true` or `{}`.
pub(crate) fn is_trivial_schema(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
