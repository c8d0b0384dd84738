//! Superfluous: keywords that have no effect without a partner keyword.

use serde_json::Value;

use jsl_core::Pointer;

use crate::rule::{Category, Rule, Transformer};
use crate::rules::defines;
use crate::vocabulary::{self as vocab, VocabularySet, CONDITIONAL};

/// A keyword ignored unless `partner` is present.
struct Orphan {
    keyword: &'static str,
    partner: &'static str,
    vocabularies: &'static [&'static str],
}

impl Orphan {
    fn matches(&self, schema: &Value, vocabularies: &VocabularySet) -> bool {
        vocabularies.contains_any(self.vocabularies)
            && defines(schema, self.keyword)
            && !defines(schema, self.partner)
    }
}

const CONTAINS_VALIDATION: &[&str] = &[vocab::VALIDATION_2019_09, vocab::VALIDATION_2020_12];
const CONTENT: &[&str] = &[vocab::CONTENT_2019_09, vocab::CONTENT_2020_12];

macro_rules! orphan_rule {
    ($(#[$doc:meta])* $rule:ident, $name:literal, $message:literal, $keyword:literal, $partner:literal, $vocabularies:expr) => {
        $(#[$doc])*
        pub struct $rule;

        impl $rule {
            const ORPHAN: Orphan = Orphan {
                keyword: $keyword,
                partner: $partner,
                vocabularies: $vocabularies,
            };
        }

        impl Rule for $rule {
            fn name(&self) -> &'static str {
                $name
            }

            fn category(&self) -> Category {
                Category::Superfluous
            }

            fn message(&self) -> &'static str {
                $message
            }

            fn condition(
                &self,
                schema: &Value,
                _dialect: &str,
                vocabularies: &VocabularySet,
                _pointer: &Pointer,
            ) -> bool {
                Self::ORPHAN.matches(schema, vocabularies)
            }

            fn transform(&self, transformer: &mut Transformer<'_>) {
                transformer.erase($keyword);
            }
        }
    };
}

orphan_rule!(
    /// `then` without `if`.
    ThenWithoutIf,
    "then_without_if",
    "The `then` keyword is meaningless without the presence of the `if` keyword",
    "then",
    "if",
    CONDITIONAL
);

orphan_rule!(
    /// `else` without `if`.
    ElseWithoutIf,
    "else_without_if",
    "The `else` keyword is meaningless without the presence of the `if` keyword",
    "else",
    "if",
    CONDITIONAL
);

orphan_rule!(
    /// `maxContains` without `contains`.
    MaxContainsWithoutContains,
    "max_contains_without_contains",
    "The `maxContains` keyword is meaningless without the presence of the `contains` keyword",
    "maxContains",
    "contains",
    CONTAINS_VALIDATION
);

orphan_rule!(
    /// `minContains` without `contains`.
    MinContainsWithoutContains,
    "min_contains_without_contains",
    "The `minContains` keyword is meaningless without the presence of the `contains` keyword",
    "minContains",
    "contains",
    CONTAINS_VALIDATION
);

orphan_rule!(
    /// `contentSchema` without `contentMediaType`.
    ContentSchemaWithoutMediaType,
    "content_schema_without_media_type",
    "The `contentSchema` keyword is meaningless without the presence of the `contentMediaType` keyword",
    "contentSchema",
    "contentMediaType",
    CONTENT
);
