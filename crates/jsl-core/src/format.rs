//! # Schema-Aware Pretty Printing
//!
//! Produces the text written back to disk after a document is rewritten.
//!
//! ## Ordering
//!
//! Object members are emitted by keyword rank first and name second.
//! Identification and reference keywords lead, followed by annotations,
//! then everything else alphabetically. The ordering applies at every depth
//! so it is stable regardless of how the input was laid out, and printing
//! the same value twice always yields the same bytes.
//!
//! Layout matches `serde_json::to_string_pretty`: two-space indentation,
//! `"key": value` members, empty containers on one line. The output ends
//! with a newline.

use std::fmt::Write as _;

use serde_json::Value;

use crate::error::CoreError;

/// Keywords that are printed ahead of all others, in this order.
const LEADING_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "id",
    "$vocabulary",
    "$anchor",
    "$dynamicAnchor",
    "$recursiveAnchor",
    "$ref",
    "$dynamicRef",
    "$recursiveRef",
    "$comment",
    "title",
    "description",
    "examples",
    "default",
    "deprecated",
    "readOnly",
    "writeOnly",
    "type",
    "enum",
    "const",
];

/// Rank used to order an object member. Leading keywords get their
/// position in the list; every other name shares the last rank and is
/// ordered alphabetically.
pub fn keyword_rank(name: &str) -> usize {
    LEADING_KEYWORDS
        .iter()
        .position(|k| *k == name)
        .unwrap_or(LEADING_KEYWORDS.len())
}

/// Pretty print a document with schema-aware member ordering.
///
/// # Errors
///
/// Returns `CoreError::Serialization` if a string cannot be encoded.
pub fn prettify(value: &Value) -> Result<String, CoreError> {
    let mut out = String::new();
    write_value(&mut out, value, 0)?;
    out.push('\n');
    Ok(out)
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), CoreError> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            out.push_str(&serde_json::to_string(value)?);
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                indent(out, depth + 1);
                write_value(out, item, depth + 1)?;
            }
            out.push('\n');
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> = map.iter().collect();
            members.sort_by(|(a, _), (b, _)| {
                keyword_rank(a).cmp(&keyword_rank(b)).then_with(|| a.cmp(b))
            });

            out.push('{');
            for (i, (name, member)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                indent(out, depth + 1);
                let _ = write!(out, "{}: ", serde_json::to_string(name)?);
                write_value(out, member, depth + 1)?;
            }
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
    }
    Ok(())
}
