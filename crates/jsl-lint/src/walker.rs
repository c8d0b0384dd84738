//! # Schema Walking
//!
//! Enumerates every sub-schema location of a document in pre-order: the
//! root first, then the sub-schemas of each keyword in sorted keyword
//! order, array elements in index order and map members in sorted name
//! order.
//!
//! Which keywords hold sub-schemas is decided by a [`SchemaWalker`]. Only
//! object and boolean values in those positions are visited, so `enum`,
//! `const`, `default` and `examples` values are never mistaken for schemas.
//!
//! The walk is an iterator over an explicit stack. It never recurses, so
//! deeply nested documents cannot exhaust the call stack.

use serde_json::Value;

use jsl_core::Pointer;

use crate::dialect::{Scope, ScopeCache};
use crate::error::LintError;
use crate::resolver::SchemaResolver;

/// Shape of the value a keyword holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubschemaKind {
    /// A single schema (`not`, `if`, `additionalProperties`).
    Single,
    /// An array of schemas (`allOf`, `prefixItems`).
    Array,
    /// Either a single schema or an array of schemas (`items` before 2020-12).
    SingleOrArray,
    /// An object whose member values are schemas (`properties`, `$defs`).
    Members,
}

/// Classifies keywords as sub-schema positions.
pub trait SchemaWalker: Send + Sync {
    /// The kind of sub-schema `keyword` holds under `scope`, or `None` when
    /// its value is not a schema.
    fn subschema_kind(&self, keyword: &str, scope: &Scope) -> Option<SubschemaKind>;
}

/// Applicator, content and unevaluated keywords of every supported draft.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWalker;

impl SchemaWalker for DefaultWalker {
    fn subschema_kind(&self, keyword: &str, _scope: &Scope) -> Option<SubschemaKind> {
        let kind = match keyword {
            "additionalProperties" | "additionalItems" | "contains" | "propertyNames" | "if"
            | "then" | "else" | "not" | "unevaluatedItems" | "unevaluatedProperties"
            | "contentSchema" => SubschemaKind::Single,
            "items" | "extends" => SubschemaKind::SingleOrArray,
            "allOf" | "anyOf" | "oneOf" | "prefixItems" => SubschemaKind::Array,
            "properties" | "patternProperties" | "$defs" | "definitions" | "dependentSchemas"
            | "dependencies" => SubschemaKind::Members,
            _ => return None,
        };
        Some(kind)
    }
}

/// One visited location.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// Location of the node within the document.
    pub pointer: Pointer,
    /// The sub-schema at `pointer`.
    pub node: &'a Value,
    /// Dialect and vocabularies in force at `pointer`.
    pub scope: Scope,
}

fn is_schema(value: &Value) -> bool {
    value.is_object() || value.is_boolean()
}

/// Walk `schema`. Each call starts an independent traversal.
///
/// `default_dialect` applies when the root declares no `$schema`.
pub fn walk<'a>(
    schema: &'a Value,
    walker: &'a dyn SchemaWalker,
    resolver: &'a dyn SchemaResolver,
    default_dialect: Option<&'a str>,
) -> Walk<'a> {
    Walk {
        stack: vec![(Pointer::root(), schema, None)],
        walker,
        scopes: ScopeCache::new(resolver, default_dialect),
        failed: false,
    }
}

/// Iterator returned by [`walk`].
///
/// Yields `Err` at most once; the walk ends after the first error.
pub struct Walk<'a> {
    stack: Vec<(Pointer, &'a Value, Option<Scope>)>,
    walker: &'a dyn SchemaWalker,
    scopes: ScopeCache<'a>,
    failed: bool,
}

impl<'a> Walk<'a> {
    fn children(&self, pointer: &Pointer, node: &'a Value, scope: &Scope) -> Vec<(Pointer, &'a Value)> {
        let mut children = Vec::new();
        let Value::Object(map) = node else {
            return children;
        };

        let mut keywords: Vec<&String> = map.keys().collect();
        keywords.sort();
        for keyword in keywords {
            let Some(kind) = self.walker.subschema_kind(keyword, scope) else {
                continue;
            };
            let value = &map[keyword.as_str()];
            let base = pointer.push_property(keyword.as_str());
            match (kind, value) {
                (SubschemaKind::Single | SubschemaKind::SingleOrArray, v) if is_schema(v) => {
                    children.push((base, v));
                }
                (SubschemaKind::Array | SubschemaKind::SingleOrArray, Value::Array(items)) => {
                    children.extend(
                        items
                            .iter()
                            .enumerate()
                            .filter(|(_, item)| is_schema(item))
                            .map(|(index, item)| (base.push_index(index), item)),
                    );
                }
                (SubschemaKind::Members, Value::Object(members)) => {
                    let mut names: Vec<&String> = members.keys().collect();
                    names.sort();
                    for name in names {
                        let member = &members[name.as_str()];
                        if is_schema(member) {
                            children.push((base.push_property(name.as_str()), member));
                        }
                    }
                }
                _ => {}
            }
        }
        children
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Result<Frame<'a>, LintError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (pointer, node, parent) = self.stack.pop()?;

        let scope = match parent {
            None => self.scopes.root(node),
            Some(parent) => self.scopes.nested(node, &parent),
        };
        let scope = match scope {
            Ok(scope) => scope,
            Err(e) => {
                self.failed = true;
                self.stack.clear();
                return Some(Err(e.into()));
            }
        };

        let children = self.children(&pointer, node, &scope);
        for (child_pointer, child) in children.into_iter().rev() {
            self.stack.push((child_pointer, child, Some(scope.clone())));
        }

        Some(Ok(Frame {
            pointer,
            node,
            scope,
        }))
    }
}
