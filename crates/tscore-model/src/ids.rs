//! Drug and condition identifiers.

use std::fmt;

/// A single concept identifier read from an ID list file.
///
/// Identifiers made only of decimal digits are numeric concept IDs; anything
/// else is carried through as an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Id {
    Int(u64),
    Token(String),
}

impl Id {
    /// Render the identifier as a SQL literal.
    ///
    /// Tokens become single-quoted strings with embedded quotes doubled.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Token(token) => format!("'{}'", token.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Token(token) => f.write_str(token),
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

/// Ordered list of identifiers. Duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(Vec<Id>);

impl IdList {
    pub fn new(ids: Vec<Id>) -> Self {
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Id> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Id] {
        &self.0
    }

    /// Render as a parenthesised collection literal, e.g. `(773, 797)`.
    ///
    /// A single element renders as `(773)`, which is valid both after `in`
    /// and as a collection constructor argument.
    pub fn to_tuple_literal(&self) -> String {
        let items: Vec<String> = self.0.iter().map(Id::to_literal).collect();
        format!("({})", items.join(", "))
    }
}

impl FromIterator<Id> for IdList {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Id>> for IdList {
    fn from(ids: Vec<Id>) -> Self {
        Self(ids)
    }
}

impl<'a> IntoIterator for &'a IdList {
    type Item = &'a Id;
    type IntoIter = std::slice::Iter<'a, Id>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
