//! Fixing a schema never changes which instances it accepts.

use jsl_lint::{Bundle, Category, DefaultWalker, EmptyResolver};
use jsl_schema::{SchemaCompiler, Template};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const V2020: &str = "https://json-schema.org/draft/2020-12/schema";

const DIALECTS: &[&str] = &[
    V2020,
    "https://json-schema.org/draft/2019-09/schema",
    "http://json-schema.org/draft-07/schema#",
    "http://json-schema.org/draft-06/schema#",
];

fn instances() -> Vec<Value> {
    vec![
        json!(null),
        json!(true),
        json!(false),
        json!(0),
        json!(2),
        json!(4),
        json!(2.5),
        json!("a"),
        json!([]),
        json!([1]),
        json!(["a", true]),
        json!([1, 2, 3]),
        json!({}),
        json!({"a": 1}),
        json!({"a": "a", "b": null}),
        json!({"z": false}),
    ]
}

fn compile(schema: &Value) -> Option<Template> {
    SchemaCompiler::default().compile(schema).ok()
}

fn fix(schema: &Value) -> Value {
    let bundle = Bundle::builder()
        .categories(Category::all().iter().copied())
        .build()
        .unwrap();
    let mut fixed = schema.clone();
    bundle
        .apply(&mut fixed, &DefaultWalker, &EmptyResolver)
        .unwrap();
    fixed
}

fn assert_equivalent(schema: &Value) {
    let Some(before) = compile(schema) else {
        return;
    };
    let fixed = fix(schema);
    let after = compile(&fixed).unwrap_or_else(|| panic!("{fixed} no longer compiles"));
    for instance in instances() {
        assert_eq!(
            before.evaluate(&instance, None),
            after.evaluate(&instance, None),
            "{instance} against {schema} fixed to {fixed}"
        );
    }
}

#[test]
fn test_additional_properties_seen_through_all_of() {
    let schema = json!({
        "$schema": V2020,
        "allOf": [{"additionalProperties": true}],
        "unevaluatedProperties": false
    });
    assert_equivalent(&schema);
    assert_eq!(fix(&schema), schema);
    assert!(compile(&schema).unwrap().evaluate(&json!({"b": 1}), None));
}

#[test]
fn test_items_seen_through_all_of() {
    let schema = json!({
        "$schema": V2020,
        "allOf": [{"items": true}],
        "unevaluatedItems": false
    });
    assert_equivalent(&schema);
    assert_eq!(fix(&schema), schema);
    assert!(compile(&schema).unwrap().evaluate(&json!([1]), None));
}

#[test]
fn test_legacy_cleanup_is_equivalent() {
    assert_equivalent(&json!({
        "$schema": V2020,
        "type": "object",
        "additionalProperties": true,
        "required": ["a", "a"],
        "properties": {
            "a": {"type": ["integer"], "enum": [1, 2]},
            "b": {"type": "null"},
            "z": {"type": "boolean", "then": {}}
        }
    }));
}

/// Fragments whose rewrites every supported validator treats the same way.
fn fragment() -> impl Strategy<Value = (String, Value)> {
    prop_oneof![
        prop::sample::select(vec!["boolean", "null", "string", "integer", "object", "array"])
            .prop_map(|t| ("type".to_string(), json!(t))),
        prop::sample::select(vec!["boolean", "null", "integer"])
            .prop_map(|t| ("type".to_string(), json!([t]))),
        prop::collection::vec(
            prop_oneof![Just(json!("a")), Just(json!(2)), Just(json!(null)), Just(json!(true))],
            1..4
        )
        .prop_map(|values| ("enum".to_string(), Value::Array(values))),
        prop_oneof![Just(json!("a")), Just(json!(2)), Just(json!(false))]
            .prop_map(|value| ("const".to_string(), value)),
        (0i64..5).prop_map(|n| ("maximum".to_string(), json!(n))),
        (0i64..5).prop_map(|n| ("exclusiveMaximum".to_string(), json!(n))),
        (0i64..5).prop_map(|n| ("minimum".to_string(), json!(n))),
        (0i64..5).prop_map(|n| ("exclusiveMinimum".to_string(), json!(n))),
        Just(("required".to_string(), json!(["a", "b", "a"]))),
        Just(("additionalProperties".to_string(), json!(true))),
        Just(("additionalProperties".to_string(), json!({}))),
        Just(("items".to_string(), json!({}))),
        Just(("items".to_string(), json!(true))),
        Just(("unevaluatedProperties".to_string(), json!(false))),
        Just(("unevaluatedItems".to_string(), json!(false))),
        Just(("then".to_string(), json!(false))),
        Just(("else".to_string(), json!(false))),
    ]
}

fn schema_node() -> impl Strategy<Value = Value> {
    let leaf = prop::collection::vec(fragment(), 0..4)
        .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<String, Value>>()));
    leaf.prop_recursive(3, 24, 3, |inner| {
        (
            prop::collection::vec(fragment(), 0..3),
            prop::collection::btree_map("[ab]", inner.clone(), 0..2),
            prop::sample::select(vec!["allOf", "anyOf", "oneOf"]),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(fields, properties, applicator, branches)| {
                let mut map: Map<String, Value> = fields.into_iter().collect();
                if !properties.is_empty() {
                    map.insert(
                        "properties".to_string(),
                        Value::Object(properties.into_iter().collect()),
                    );
                }
                if !branches.is_empty() {
                    map.insert(applicator.to_string(), Value::Array(branches));
                }
                Value::Object(map)
            })
    })
}

fn document() -> impl Strategy<Value = Value> {
    (prop::sample::select(DIALECTS.to_vec()), schema_node()).prop_map(|(dialect, mut schema)| {
        if let Value::Object(map) = &mut schema {
            map.insert("$schema".to_string(), json!(dialect));
        }
        schema
    })
}

proptest! {
    /// Every instance valid before a fix is valid after it, and the reverse.
    #[test]
    fn fix_preserves_validation(schema in document()) {
        let Some(before) = compile(&schema) else {
            return Ok(());
        };
        let fixed = fix(&schema);
        let after = compile(&fixed);
        prop_assert!(after.is_some(), "{} no longer compiles", fixed);
        let after = after.unwrap();
        for instance in instances() {
            prop_assert_eq!(
                before.evaluate(&instance, None),
                after.evaluate(&instance, None),
                "{} against {} fixed to {}",
                instance,
                schema,
                fixed
            );
        }
    }
}
