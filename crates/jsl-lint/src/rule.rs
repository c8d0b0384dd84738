//! # Rules
//!
//! A [`Rule`] is a named, categorized pair of operations: a pure
//! `condition` that recognises a pattern at one schema location, and a
//! `transform` that rewrites that location to an equivalent form without
//! the pattern.
//!
//! ## Contract
//!
//! - `condition` never fails. A missing keyword or a keyword of the wrong
//!   type is a non-match.
//! - `transform` only touches the node it was matched against.
//! - `transform` consumes its own trigger: evaluating the same rule's
//!   `condition` on the rewritten node returns false. The fixpoint loop of
//!   [`Bundle::apply`](crate::Bundle::apply) terminates only for rule sets
//!   that honour this.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use jsl_core::Pointer;

use crate::error::LintError;
use crate::vocabulary::VocabularySet;

/// Rule category. Categories are enabled as a whole.
///
/// The declaration order is the order rules run in within a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Upgrade keywords to their newer-draft equivalents.
    Modernize,
    /// Constructs that are valid but discouraged.
    AntiPattern,
    /// Replace a construct with a shorter equivalent.
    Simplify,
    /// Remove keywords that restate the default.
    Redundant,
    /// Remove keywords that have no effect where they are.
    Superfluous,
    /// Desugar shorthand into its explicit form.
    SyntaxSugar,
}

impl Category {
    /// All categories in bundle order.
    pub fn all() -> &'static [Category] {
        &[
            Self::Modernize,
            Self::AntiPattern,
            Self::Simplify,
            Self::Redundant,
            Self::Superfluous,
            Self::SyntaxSugar,
        ]
    }

    /// Categories enabled when none is requested explicitly.
    pub fn defaults() -> &'static [Category] {
        &[
            Self::Modernize,
            Self::AntiPattern,
            Self::Simplify,
            Self::Redundant,
        ]
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modernize => "modernize",
            Self::AntiPattern => "anti_pattern",
            Self::Simplify => "simplify",
            Self::Redundant => "redundant",
            Self::Superfluous => "superfluous",
            Self::SyntaxSugar => "syntax_sugar",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LintError;

    /// Case-insensitive; `-` and `_` are interchangeable and may be omitted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Category::all()
            .iter()
            .copied()
            .find(|category| category.as_str().replace('_', "") == folded)
            .ok_or_else(|| LintError::UnknownCategory(s.to_string()))
    }
}

/// A lint rule.
pub trait Rule: Send + Sync {
    /// Identifier, unique within a bundle.
    fn name(&self) -> &'static str;

    /// The category the rule belongs to.
    fn category(&self) -> Category;

    /// Human readable description reported with every diagnostic.
    fn message(&self) -> &'static str;

    /// Returns true if the pattern is present at `schema`.
    fn condition(
        &self,
        schema: &Value,
        dialect: &str,
        vocabularies: &VocabularySet,
        pointer: &Pointer,
    ) -> bool;

    /// Rewrite the matched node.
    fn transform(&self, transformer: &mut Transformer<'_>);

    /// Returns true if `transform` may remove a keyword whose evaluation
    /// marks properties or items as evaluated. A bundle does not run such
    /// rules on documents where `unevaluatedProperties` or
    /// `unevaluatedItems` is in effect, since an enclosing `unevaluated*`
    /// keyword can observe those marks through any in-place applicator or
    /// `$ref`.
    fn affects_evaluation(&self) -> bool {
        false
    }
}

/// Mutable view of the node a rule matched.
///
/// Keyword operations are no-ops on boolean schemas.
pub struct Transformer<'a> {
    schema: &'a mut Value,
}

impl<'a> Transformer<'a> {
    /// Wrap the matched node.
    pub fn new(schema: &'a mut Value) -> Self {
        Self { schema }
    }

    /// The node as it currently is.
    pub fn schema(&self) -> &Value {
        &*self.schema
    }

    /// Value of `keyword`, if present.
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.schema.get(keyword)
    }

    fn object(&mut self) -> Option<&mut Map<String, Value>> {
        self.schema.as_object_mut()
    }

    /// Set `keyword` to `value`.
    pub fn assign(&mut self, keyword: &str, value: Value) {
        if let Some(map) = self.object() {
            map.insert(keyword.to_string(), value);
        }
    }

    /// Remove `keyword`, returning its value.
    pub fn erase(&mut self, keyword: &str) -> Option<Value> {
        self.object().and_then(|map| map.remove(keyword))
    }

    /// Move the value of `from` to `to`, replacing any value `to` held.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(value) = self.erase(from) {
            self.assign(to, value);
        }
    }

    /// Replace the whole node.
    pub fn replace(&mut self, value: Value) {
        *self.schema = value;
    }
}
