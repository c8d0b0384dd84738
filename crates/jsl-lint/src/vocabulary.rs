//! # Vocabularies
//!
//! URIs of the keyword vocabularies the rule catalogue keys on, and the
//! [`VocabularySet`] attached to every walked location.
//!
//! 2019-09 and 2020-12 split their keywords into named vocabularies. Older
//! drafts have no such split; the metaschema URI itself stands in as the
//! single vocabulary, so a rule that understands draft-07 `enum` lists
//! [`DRAFT_07`] next to [`VALIDATION_2020_12`].

use std::collections::BTreeSet;

pub const CORE_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/core";
pub const APPLICATOR_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/applicator";
pub const UNEVALUATED_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/unevaluated";
pub const VALIDATION_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/validation";
pub const META_DATA_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/meta-data";
pub const FORMAT_ANNOTATION_2020_12: &str =
    "https://json-schema.org/draft/2020-12/vocab/format-annotation";
pub const CONTENT_2020_12: &str = "https://json-schema.org/draft/2020-12/vocab/content";

pub const CORE_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/core";
pub const APPLICATOR_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/applicator";
pub const VALIDATION_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/validation";
pub const META_DATA_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/meta-data";
pub const FORMAT_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/format";
pub const CONTENT_2019_09: &str = "https://json-schema.org/draft/2019-09/vocab/content";

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
pub const DRAFT_07_HYPER: &str = "http://json-schema.org/draft-07/hyper-schema#";
pub const DRAFT_06: &str = "http://json-schema.org/draft-06/schema#";
pub const DRAFT_06_HYPER: &str = "http://json-schema.org/draft-06/hyper-schema#";
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";
pub const DRAFT_04_HYPER: &str = "http://json-schema.org/draft-04/hyper-schema#";
pub const DRAFT_03: &str = "http://json-schema.org/draft-03/schema#";
pub const DRAFT_03_HYPER: &str = "http://json-schema.org/draft-03/hyper-schema#";
pub const DRAFT_02: &str = "http://json-schema.org/draft-02/schema#";
pub const DRAFT_02_HYPER: &str = "http://json-schema.org/draft-02/hyper-schema#";
pub const DRAFT_01: &str = "http://json-schema.org/draft-01/schema#";
pub const DRAFT_01_HYPER: &str = "http://json-schema.org/draft-01/hyper-schema#";
pub const DRAFT_00: &str = "http://json-schema.org/draft-00/schema#";
pub const DRAFT_00_HYPER: &str = "http://json-schema.org/draft-00/hyper-schema#";

/// Vocabularies that give `type`, `enum` and `required` their meaning.
pub const VALIDATION: &[&str] = &[
    VALIDATION_2020_12,
    VALIDATION_2019_09,
    DRAFT_07,
    DRAFT_06,
    DRAFT_04,
    DRAFT_03,
    DRAFT_02,
    DRAFT_01,
    DRAFT_00,
];

/// Vocabularies with `const`, numeric `exclusiveMaximum`/`exclusiveMinimum`
/// and boolean schemas (draft-06 onwards).
pub const VALIDATION_SINCE_DRAFT_06: &[&str] =
    &[VALIDATION_2020_12, VALIDATION_2019_09, DRAFT_07, DRAFT_06];

/// Vocabularies that give `properties`, `items` and `additionalProperties`
/// their meaning.
pub const APPLICATOR: &[&str] = &[
    APPLICATOR_2020_12,
    APPLICATOR_2019_09,
    DRAFT_07,
    DRAFT_06,
    DRAFT_04,
    DRAFT_03,
    DRAFT_02,
    DRAFT_01,
    DRAFT_00,
];

/// Vocabularies with `unevaluatedProperties` and `unevaluatedItems`.
pub const UNEVALUATED: &[&str] = &[UNEVALUATED_2020_12, APPLICATOR_2019_09];

/// Vocabularies with `if`/`then`/`else`.
pub const CONDITIONAL: &[&str] = &[APPLICATOR_2020_12, APPLICATOR_2019_09, DRAFT_07];

/// The set of vocabulary URIs in force at a location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularySet {
    uris: BTreeSet<String>,
}

impl VocabularySet {
    /// An empty set: nothing is known about the keywords at this location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `uri` is active.
    pub fn contains(&self, uri: &str) -> bool {
        self.uris.contains(uri)
    }

    /// Returns true if any of `uris` is active.
    pub fn contains_any(&self, uris: &[&str]) -> bool {
        uris.iter().any(|uri| self.uris.contains(*uri))
    }

    /// Number of active vocabularies.
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Returns true if no vocabulary is active.
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Iterate the active vocabularies in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.uris.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for VocabularySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            uris: iter.into_iter().map(Into::into).collect(),
        }
    }
}
