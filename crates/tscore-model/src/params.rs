//! Named parameters that drive script rendering and execution.
//!
//! A [`ParameterSet`] is an insertion-ordered map from parameter name to
//! value. The names double as template placeholders and as keys in the
//! parameters file, so they keep the camelCase spelling users write.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{ModelError, Result};

/// Placeholder shown wherever the database password would be displayed.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Well-known parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    DbConnectionName,
    DbUser,
    DbPass,
    DbSchemaName,
    DrugEraTableName,
    CondEraTableName,
    ConditionWindowStart,
    ConditionWindowEnd,
    DrugOccurrenceOffset,
    Pseudocount,
    CountsScoresTableName,
    ReportFileName,
    CondIdsTuple,
    DrugIdsTuple,
}

impl ParamKey {
    /// All known keys in their canonical order.
    pub const ALL: [ParamKey; 14] = [
        Self::DbConnectionName,
        Self::DbUser,
        Self::DbPass,
        Self::DbSchemaName,
        Self::DrugEraTableName,
        Self::CondEraTableName,
        Self::ConditionWindowStart,
        Self::ConditionWindowEnd,
        Self::DrugOccurrenceOffset,
        Self::Pseudocount,
        Self::CountsScoresTableName,
        Self::ReportFileName,
        Self::CondIdsTuple,
        Self::DrugIdsTuple,
    ];

    /// Keys whose values must parse as integers.
    pub const INTEGER_KEYS: [ParamKey; 3] = [
        Self::ConditionWindowStart,
        Self::ConditionWindowEnd,
        Self::DrugOccurrenceOffset,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DbConnectionName => "dbConnectionName",
            Self::DbUser => "dbUser",
            Self::DbPass => "dbPass",
            Self::DbSchemaName => "dbSchemaName",
            Self::DrugEraTableName => "drugEraTableName",
            Self::CondEraTableName => "condEraTableName",
            Self::ConditionWindowStart => "conditionWindowStart",
            Self::ConditionWindowEnd => "conditionWindowEnd",
            Self::DrugOccurrenceOffset => "drugOccurrenceOffset",
            Self::Pseudocount => "pseudocount",
            Self::CountsScoresTableName => "countsScoresTableName",
            Self::ReportFileName => "reportFileName",
            Self::CondIdsTuple => "condIdsTuple",
            Self::DrugIdsTuple => "drugIdsTuple",
        }
    }

    /// Value a fresh parameter set starts with.
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::DbConnectionName => ParamValue::from("lsomop"),
            Self::DrugEraTableName => ParamValue::from("drug_era"),
            Self::CondEraTableName => ParamValue::from("condition_era"),
            Self::ConditionWindowStart => ParamValue::Integer(-100_000),
            Self::ConditionWindowEnd => ParamValue::Integer(100_000),
            Self::DrugOccurrenceOffset => ParamValue::Integer(0),
            Self::Pseudocount => ParamValue::Integer(1),
            Self::CountsScoresTableName => ParamValue::from("counts_scores"),
            Self::DbUser
            | Self::DbPass
            | Self::DbSchemaName
            | Self::ReportFileName
            | Self::CondIdsTuple
            | Self::DrugIdsTuple => ParamValue::Unset,
        }
    }
}

impl AsRef<str> for ParamKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter value. `Unset` means the value still has to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamValue {
    #[default]
    Unset,
    Text(String),
    Integer(i64),
}

impl ParamValue {
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Text substituted into a script, or `None` when unresolved.
    pub fn resolved(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
        }
    }

    /// Interpret the value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Unset => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("<unset>"),
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A credential that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED_VALUE})")
    }
}

/// Ordered parameter map.
///
/// `Display` and `Debug` always redact `dbPass`; the stored value is the
/// real secret and is what execution receives.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: IndexMap<String, ParamValue>,
}

impl ParameterSet {
    /// An empty set with no keys at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding every known key at its default value.
    pub fn defaults() -> Self {
        let values = ParamKey::ALL
            .iter()
            .map(|key| (key.as_str().to_string(), key.default_value()))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&ParamValue> {
        self.values.get(name.as_ref())
    }

    /// Insert or overwrite a value. New keys are appended; existing keys keep
    /// their position.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<ParamValue>) {
        let name = name.as_ref();
        let value = value.into();
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    /// True when the key is absent or holds `Unset`.
    pub fn is_unset(&self, name: impl AsRef<str>) -> bool {
        !self.get(name).is_some_and(ParamValue::is_set)
    }

    /// Resolved text for a key, if any.
    pub fn text(&self, name: impl AsRef<str>) -> Option<String> {
        self.get(name).and_then(ParamValue::resolved)
    }

    /// Integer value of a key.
    ///
    /// Returns `Ok(None)` when the key is unset and an error when the value
    /// does not parse.
    pub fn integer(&self, key: ParamKey) -> Result<Option<i64>> {
        match self.get(key) {
            None | Some(ParamValue::Unset) => Ok(None),
            Some(value) => value
                .as_integer()
                .map(Some)
                .ok_or_else(|| ModelError::InvalidInteger {
                    key: key.as_str().to_string(),
                    value: value.to_string(),
                }),
        }
    }

    /// The database password as a [`Secret`]. Unset yields an empty secret.
    pub fn secret(&self) -> Secret {
        Secret::new(self.text(ParamKey::DbPass).unwrap_or_default())
    }

    /// Merge string settings (e.g. a parsed parameters file) over this set.
    pub fn merge<I, K, V>(&mut self, settings: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in settings {
            self.set(name, ParamValue::Text(value.into()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn display_value<'a>(name: &str, value: &'a ParamValue) -> DisplayValue<'a> {
        if name == ParamKey::DbPass.as_str() && value.is_set() {
            DisplayValue::Redacted
        } else {
            DisplayValue::Plain(value)
        }
    }
}

enum DisplayValue<'a> {
    Plain(&'a ParamValue),
    Redacted,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(value) => write!(f, "{value}"),
            Self::Redacted => f.write_str(REDACTED_VALUE),
        }
    }
}

impl fmt::Debug for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(value) => write!(f, "{value:?}"),
            Self::Redacted => f.write_str(REDACTED_VALUE),
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (name, value) in &self.values {
            writeln!(f, "{name}: {},", Self::display_value(name, value))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|(name, value)| (name, Self::display_value(name, value))),
            )
            .finish()
    }
}
