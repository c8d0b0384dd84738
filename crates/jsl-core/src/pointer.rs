//! # JSON Pointer
//!
//! An owned, immutable-by-convention RFC 6901 pointer. Pointers are built
//! token by token while walking a schema and rendered to their string form
//! only when reported.
//!
//! ## Invariant
//!
//! A pointer produced by a walk resolves against the document it was
//! produced from, at the time it was produced. Documents may change
//! afterwards (a rewrite pass can remove the node), so [`Pointer::get`]
//! returns `Option` rather than assuming the node still exists.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;

/// One reference token of a pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// An object member name. Pointers parsed from text only ever contain
    /// this variant; array lookups interpret the name as a decimal index.
    Property(String),
    /// An array element index.
    Index(usize),
}

impl Token {
    fn write_escaped(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Property(name) => {
                for c in name.chars() {
                    match c {
                        '~' => f.write_str("~0")?,
                        '/' => f.write_str("~1")?,
                        other => write!(f, "{other}")?,
                    }
                }
                Ok(())
            }
        }
    }

    /// Interpret the token as an array index, following RFC 6901: decimal
    /// digits only and no leading zeros.
    fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Property(name) => {
                if name.is_empty()
                    || (name.len() > 1 && name.starts_with('0'))
                    || !name.bytes().all(|b| b.is_ascii_digit())
                {
                    return None;
                }
                name.parse().ok()
            }
        }
    }

    fn as_key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Property(name) => std::borrow::Cow::Borrowed(name.as_str()),
            Self::Index(index) => std::borrow::Cow::Owned(index.to_string()),
        }
    }
}

/// A JSON Pointer: an ordered list of reference tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    tokens: Vec<Token>,
}

impl Pointer {
    /// The empty pointer, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse the string form of a pointer.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPointer` if a non-empty pointer does not
    /// start with `/` or contains an escape other than `~0` and `~1`.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let rest = text.strip_prefix('/').ok_or_else(|| CoreError::InvalidPointer {
            pointer: text.to_string(),
            reason: "must be empty or start with '/'".to_string(),
        })?;

        let mut tokens = Vec::new();
        for raw in rest.split('/') {
            let mut name = String::with_capacity(raw.len());
            let mut chars = raw.chars();
            while let Some(c) = chars.next() {
                if c != '~' {
                    name.push(c);
                    continue;
                }
                match chars.next() {
                    Some('0') => name.push('~'),
                    Some('1') => name.push('/'),
                    other => {
                        return Err(CoreError::InvalidPointer {
                            pointer: text.to_string(),
                            reason: format!("invalid escape sequence '~{}'", other.unwrap_or(' ')),
                        })
                    }
                }
            }
            tokens.push(Token::Property(name));
        }
        Ok(Self { tokens })
    }

    /// Returns a new pointer with an object member appended.
    pub fn push_property(&self, name: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::Property(name.into()));
        Self { tokens }
    }

    /// Returns a new pointer with an array index appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::Index(index));
        Self { tokens }
    }

    /// The pointer to the enclosing value, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.tokens.split_last()?;
        Some(Self {
            tokens: init.to_vec(),
        })
    }

    /// The last token, or `None` for the root.
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Returns true if `prefix` addresses this location or one of its ancestors.
    pub fn starts_with(&self, prefix: &Pointer) -> bool {
        self.tokens.len() >= prefix.tokens.len()
            && self
                .tokens
                .iter()
                .zip(&prefix.tokens)
                .all(|(a, b)| a.as_key() == b.as_key())
    }

    /// Returns true for the empty pointer.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of reference tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true for the empty pointer.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The reference tokens in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Resolve the pointer against a document.
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.tokens
            .iter()
            .try_fold(document, |current, token| match current {
                Value::Object(map) => map.get(&*token.as_key()),
                Value::Array(items) => token.as_index().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Resolve the pointer against a document for mutation.
    pub fn get_mut<'a>(&self, document: &'a mut Value) -> Option<&'a mut Value> {
        self.tokens
            .iter()
            .try_fold(document, |current, token| match current {
                Value::Object(map) => map.get_mut(&*token.as_key()),
                Value::Array(items) => token.as_index().and_then(move |i| items.get_mut(i)),
                _ => None,
            })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str("/")?;
            token.write_escaped(f)?;
        }
        Ok(())
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::str::FromStr for Pointer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
