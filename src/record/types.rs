use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::fields::{field_index, FieldSpec, CANONICAL_FIELDS};

/// A single applicant field value, decided once when the input is coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Numeric(Number),
    Text(String),
}

impl FieldValue {
    /// Coerce raw user input.
    ///
    /// Integers stay integers on the wire, finite floats become floats, and
    /// anything else (including empty input, `NaN` and `inf`) is kept verbatim
    /// as text.
    pub fn coerce(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return FieldValue::Numeric(Number::from(n));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(n) = Number::from_f64(f) {
                return FieldValue::Numeric(n);
            }
        }
        FieldValue::Text(input.to_string())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Numeric(_))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Numeric(Number::from(value))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Numeric(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    UnknownField(String),
    InvalidAssignment(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::UnknownField(name) => write!(f, "Unknown field '{}'", name),
            RecordError::InvalidAssignment(s) => {
                write!(f, "Invalid assignment '{}', expected FIELD=VALUE", s)
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Applicant attributes keyed by the canonical field set.
///
/// Values are stored index-aligned with [`CANONICAL_FIELDS`], so every
/// canonical field is always present and nothing else can be added.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    values: Vec<FieldValue>,
}

impl Default for ApplicantRecord {
    fn default() -> Self {
        Self {
            values: CANONICAL_FIELDS.iter().map(|f| FieldValue::from(f.default)).collect(),
        }
    }
}

impl ApplicantRecord {
    /// Start from the built-in defaults, then apply configured overrides.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, RecordError> {
        let mut record = Self::default();
        for (name, value) in overrides {
            record.set(name, value)?;
        }
        Ok(record)
    }

    /// Update one field from raw input. Other fields are never touched.
    pub fn set(&mut self, name: &str, input: &str) -> Result<&FieldValue, RecordError> {
        let index = field_index(name).ok_or_else(|| RecordError::UnknownField(name.to_string()))?;
        self.values[index] = FieldValue::coerce(input);
        Ok(&self.values[index])
    }

    /// Same as [`set`](Self::set) but addressed by canonical position.
    pub fn set_at(&mut self, index: usize, input: &str) -> Option<&FieldValue> {
        let slot = self.values.get_mut(index)?;
        *slot = FieldValue::coerce(input);
        Some(slot)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        field_index(name).map(|i| &self.values[i])
    }

    pub fn get_at(&self, index: usize) -> Option<(&'static FieldSpec, &FieldValue)> {
        Some((CANONICAL_FIELDS.get(index)?, self.values.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, &FieldValue)> {
        CANONICAL_FIELDS.iter().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ApplicantRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (spec, value) in self.iter() {
            map.serialize_entry(spec.name, value)?;
        }
        map.end()
    }
}

/// Backend-issued key of a submitted applicant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountParseError {
    Empty,
    NotANumber(String),
}

impl fmt::Display for AccountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountParseError::Empty => write!(f, "Account number is required"),
            AccountParseError::NotANumber(s) => write!(f, "Account number must be a number, got '{}'", s),
        }
    }
}

impl std::error::Error for AccountParseError {}

impl FromStr for AccountId {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AccountParseError::Empty);
        }
        trimmed
            .parse::<i64>()
            .map(AccountId)
            .map_err(|_| AccountParseError::NotANumber(s.to_string()))
    }
}
