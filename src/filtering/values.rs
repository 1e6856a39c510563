use chrono::{DateTime, Utc};
use sea_orm::Value;
use serde::{Deserialize, Serialize};

use crate::core::ValueDomain;

/// Scalar compared against a field by a filter predicate.
///
/// Deserialized untagged from JSON: `null`, booleans, integers, floats and
/// strings. `Date` never comes out of JSON directly; strings are read as dates
/// when the target field has the `DateTime` domain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(DateTime<Utc>),
}

impl FilterValue {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Date(_) => "datetime",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a bind value for a field of `domain`.
    ///
    /// `Ok(None)` means SQL NULL. The error string explains the mismatch and is
    /// wrapped into `ApiError::TypeMismatch` by the caller.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub(crate) fn coerce(&self, domain: ValueDomain) -> Result<Option<Value>, String> {
        let value = match (domain, self) {
            (_, Self::Null) => return Ok(None),
            (ValueDomain::Text, Self::Text(s)) => Value::from(s.clone()),
            (ValueDomain::Integer, Self::Integer(i)) => Value::from(*i),
            (ValueDomain::Integer, Self::Float(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Value::from(*f as i64)
            }
            (ValueDomain::Float, Self::Float(f)) => Value::from(*f),
            (ValueDomain::Float, Self::Integer(i)) => Value::from(*i as f64),
            (ValueDomain::Boolean, Self::Bool(b)) => Value::from(*b),
            (ValueDomain::DateTime, Self::Date(d)) => Value::from(*d),
            (ValueDomain::DateTime, Self::Text(s)) => DateTime::parse_from_rfc3339(s)
                .map(|d| Value::from(d.with_timezone(&Utc)))
                .map_err(|_| format!("'{s}' is not an RFC 3339 timestamp"))?,
            _ => {
                return Err(format!(
                    "expected {} value, got {}",
                    domain.name(),
                    self.kind()
                ));
            }
        };
        Ok(Some(value))
    }
}

/// Typed SQL NULL for a column of `domain`.
pub(crate) fn null_of(domain: ValueDomain) -> Value {
    match domain {
        ValueDomain::Text => Value::from(Option::<String>::None),
        ValueDomain::Integer => Value::from(Option::<i64>::None),
        ValueDomain::Float => Value::from(Option::<f64>::None),
        ValueDomain::Boolean => Value::from(Option::<bool>::None),
        ValueDomain::DateTime => Value::from(Option::<DateTime<Utc>>::None),
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
