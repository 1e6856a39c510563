//! Conversion between store rows and [`Record`]s.

use chrono::{DateTime, Utc};
use sea_orm::{DbErr, QueryResult, Value};
use serde_json::Value as Json;

use crate::core::{AttributeDef, Record, TypeDescriptor, ValueDomain};
use crate::errors::ApiError;
use crate::filtering::FilterValue;
use crate::filtering::values::null_of;

fn to_json<T: Into<Json>>(value: Option<T>) -> Json {
    value.map_or(Json::Null, Into::into)
}

/// Decode one row selected through [`record_select`](crate::filtering::record_select).
///
/// # Errors
///
/// Returns the store's `DbErr` when a column is missing or has an unexpected type.
pub fn decode_row(descriptor: &TypeDescriptor, row: &QueryResult) -> Result<Record, DbErr> {
    let mut record = Record::new();
    for attribute in &descriptor.attributes {
        let name = attribute.name;
        let value = match attribute.domain {
            ValueDomain::Text => to_json(row.try_get::<Option<String>>("", name)?),
            ValueDomain::Integer => to_json(row.try_get::<Option<i64>>("", name)?),
            ValueDomain::Float => to_json(row.try_get::<Option<f64>>("", name)?),
            ValueDomain::Boolean => to_json(row.try_get::<Option<bool>>("", name)?),
            ValueDomain::DateTime => to_json(
                row.try_get::<Option<DateTime<Utc>>>("", name)?
                    .map(|d| d.to_rfc3339()),
            ),
        };
        record.insert(name.to_string(), value);
    }
    Ok(record)
}

/// Identifier carried by `record`, if any. `null` counts as absent.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` when the identifier is not an integer.
pub fn record_id(descriptor: &TypeDescriptor, record: &Record) -> Result<Option<i64>, ApiError> {
    let id = descriptor.id();
    match record.get(id.name) {
        None | Some(Json::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            ApiError::bad_request(format!(
                "'{}' of {} must be an integer",
                id.name, descriptor.name
            ))
        }),
    }
}

/// Column values to write for `record`, in descriptor order.
///
/// Only attributes present in the record are returned; keys the descriptor does
/// not know are ignored, and the identifier is never included.
///
/// # Errors
///
/// `BadRequest` for nested JSON, `TypeMismatch` when a value does not fit the
/// attribute's domain.
pub fn column_values<'d>(
    descriptor: &'d TypeDescriptor,
    record: &Record,
) -> Result<Vec<(&'d AttributeDef, Value)>, ApiError> {
    let id = descriptor.id();
    let mut values = Vec::new();
    for attribute in &descriptor.attributes {
        if attribute.name == id.name {
            continue;
        }
        let Some(raw) = record.get(attribute.name) else {
            continue;
        };
        let scalar: FilterValue = serde_json::from_value(raw.clone()).map_err(|_| {
            ApiError::bad_request(format!(
                "'{}' of {} must be a scalar value",
                attribute.name, descriptor.name
            ))
        })?;
        let value = scalar
            .coerce(attribute.domain)
            .map_err(|m| ApiError::type_mismatch(attribute.name, m))?
            .unwrap_or_else(|| null_of(attribute.domain));
        values.push((attribute, value));
    }
    Ok(values)
}
