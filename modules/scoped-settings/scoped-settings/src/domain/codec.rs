//! Value codec: maps typed values to and from the flat multi-slot storage shape.
//!
//! A stored setting carries one column per storage type. Exactly one of them is
//! occupied, and it is the one named by the record's storage type. Everything
//! outside this module and `record` only ever sees a decoded `SettingValue`.

use scoped_settings_sdk::{SettingValue, StorageType};
use serde_json::Value as JsonValue;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::error::DomainError;

/// Flat storage representation: one optional slot per storage type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSlots {
    pub text: Option<String>,
    pub boolean: Option<bool>,
    pub integer: Option<i64>,
    pub float: Option<f64>,
    pub datetime: Option<OffsetDateTime>,
    pub date: Option<Date>,
    pub json: Option<JsonValue>,
}

impl ValueSlots {
    /// Storage types whose slot currently holds a value.
    #[must_use]
    pub fn occupied(&self) -> Vec<StorageType> {
        let flags = [
            (StorageType::Text, self.text.is_some()),
            (StorageType::Boolean, self.boolean.is_some()),
            (StorageType::Integer, self.integer.is_some()),
            (StorageType::Float, self.float.is_some()),
            (StorageType::Datetime, self.datetime.is_some()),
            (StorageType::Date, self.date.is_some()),
            (StorageType::Json, self.json.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(t, set)| set.then_some(t))
            .collect()
    }
}

/// Classify a typed value. Total by construction: every variant has exactly one tag.
#[must_use]
pub const fn infer_type(value: &SettingValue) -> StorageType {
    value.storage_type()
}

/// Classify a dynamically typed JSON value.
///
/// Maps and arrays are `json`, never `text`. `null` and unsigned integers
/// beyond `i64::MAX` have no storage type.
///
/// # Errors
/// `UnsupportedValueType` for shapes outside the seven storage types.
pub fn infer_json_type(value: &JsonValue) -> Result<StorageType, DomainError> {
    match value {
        JsonValue::Null => Err(DomainError::unsupported_value_type("null")),
        JsonValue::Bool(_) => Ok(StorageType::Boolean),
        JsonValue::String(_) => Ok(StorageType::Text),
        JsonValue::Number(n) if n.is_i64() => Ok(StorageType::Integer),
        JsonValue::Number(n) if n.is_u64() => Err(DomainError::unsupported_value_type(format!(
            "unsigned integer {n} exceeds the 64-bit signed range"
        ))),
        JsonValue::Number(_) => Ok(StorageType::Float),
        JsonValue::Array(_) | JsonValue::Object(_) => Ok(StorageType::Json),
    }
}

/// Convert a dynamically typed JSON value into the setting value of its inferred type.
///
/// # Errors
/// `UnsupportedValueType` when the value has no storage type.
pub fn value_from_json(value: JsonValue) -> Result<SettingValue, DomainError> {
    let value = match (infer_json_type(&value)?, value) {
        (StorageType::Boolean, JsonValue::Bool(b)) => SettingValue::Boolean(b),
        (StorageType::Text, JsonValue::String(s)) => SettingValue::Text(s),
        (StorageType::Integer, JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => SettingValue::Integer(i),
            None => return Err(DomainError::unsupported_value_type(format!("number {n}"))),
        },
        (StorageType::Float, JsonValue::Number(n)) => match n.as_f64() {
            Some(f) => SettingValue::Float(f),
            None => return Err(DomainError::unsupported_value_type(format!("number {n}"))),
        },
        (_, other) => SettingValue::Json(other),
    };
    Ok(value)
}

/// Write `value` into the slot named by `declared`, leaving the other six empty.
///
/// Datetimes are normalized to UTC and truncated to whole seconds.
///
/// # Errors
/// - `TypeMismatch` when the value's type differs from `declared`. There is no
///   implicit integer/float coercion.
/// - `UnsupportedValueType` for a top-level JSON `null` or a non-finite float.
pub fn encode(
    path: &str,
    declared: StorageType,
    value: SettingValue,
) -> Result<ValueSlots, DomainError> {
    let actual = infer_type(&value);
    if actual != declared {
        return Err(DomainError::type_mismatch(path, declared, actual.as_str()));
    }

    let mut slots = ValueSlots::default();
    match value {
        SettingValue::Text(v) => slots.text = Some(v),
        SettingValue::Boolean(v) => slots.boolean = Some(v),
        SettingValue::Integer(v) => slots.integer = Some(v),
        SettingValue::Float(v) => slots.float = Some(finite(v)?),
        SettingValue::DateTime(v) => slots.datetime = Some(normalize_datetime(v)),
        SettingValue::Date(v) => slots.date = Some(v),
        SettingValue::Json(JsonValue::Null) => {
            return Err(DomainError::unsupported_value_type("null"));
        }
        SettingValue::Json(v) => slots.json = Some(v),
    }
    Ok(slots)
}

/// Read the slot named by `storage_type`.
///
/// # Errors
/// - `StorageTypeUndefined` when no storage type is set.
/// - `CorruptRecord` when the named slot is empty or any other slot is occupied.
pub fn decode(
    id: Option<i64>,
    path: &str,
    storage_type: Option<StorageType>,
    slots: &ValueSlots,
) -> Result<SettingValue, DomainError> {
    let Some(storage_type) = storage_type else {
        return Err(DomainError::storage_type_undefined(path));
    };

    let occupied = slots.occupied();
    if occupied.iter().any(|t| *t != storage_type) {
        return Err(DomainError::corrupt_record(
            id,
            format!("storage type is {storage_type} but slots {occupied:?} are occupied"),
        ));
    }

    let value = match storage_type {
        StorageType::Text => slots.text.clone().map(SettingValue::Text),
        StorageType::Boolean => slots.boolean.map(SettingValue::Boolean),
        StorageType::Integer => slots.integer.map(SettingValue::Integer),
        StorageType::Float => slots.float.map(SettingValue::Float),
        StorageType::Datetime => slots.datetime.map(SettingValue::DateTime),
        StorageType::Date => slots.date.map(SettingValue::Date),
        StorageType::Json => slots.json.clone().map(SettingValue::Json),
    };

    value.ok_or_else(|| {
        DomainError::corrupt_record(id, format!("{storage_type} slot is empty"))
    })
}

/// Coerce a loosely typed input to `declared`, as bulk loading does.
///
/// - boolean: bools, integers (non-zero is true), and `true/false/1/0/yes/no/on/off` strings
/// - integer: integers, integral floats, and numeric strings; never truncates
/// - float: any number or numeric string
/// - json: strings are decoded as JSON documents, anything else is kept as-is
/// - date/datetime: unix timestamps, RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`
///
/// # Errors
/// `TypeMismatch` when the input cannot be read as `declared`, `UnsupportedValueType` for `null`
/// or a float that is not finite.
pub fn coerce(path: &str, declared: StorageType, raw: JsonValue) -> Result<SettingValue, DomainError> {
    if raw.is_null() {
        return Err(DomainError::unsupported_value_type("null"));
    }
    let mismatch = |raw: &JsonValue| DomainError::type_mismatch(path, declared, json_kind(raw));

    match declared {
        StorageType::Text => match raw {
            JsonValue::String(s) => Ok(SettingValue::Text(s)),
            other => Err(mismatch(&other)),
        },
        StorageType::Boolean => coerce_bool(&raw)
            .map(SettingValue::Boolean)
            .ok_or_else(|| mismatch(&raw)),
        StorageType::Integer => coerce_integer(&raw)
            .map(SettingValue::Integer)
            .ok_or_else(|| mismatch(&raw)),
        StorageType::Float => {
            let v = coerce_float(&raw).ok_or_else(|| mismatch(&raw))?;
            Ok(SettingValue::Float(finite(v)?))
        }
        StorageType::Json => match raw {
            JsonValue::String(s) => serde_json::from_str::<JsonValue>(&s)
                .map(SettingValue::Json)
                .map_err(|e| {
                    DomainError::type_mismatch(path, declared, format!("invalid JSON text ({e})"))
                }),
            other => Ok(SettingValue::Json(other)),
        },
        StorageType::Datetime => coerce_datetime(&raw)
            .map(|dt| SettingValue::DateTime(normalize_datetime(dt)))
            .ok_or_else(|| mismatch(&raw)),
        StorageType::Date => coerce_date(&raw)
            .map(SettingValue::Date)
            .ok_or_else(|| mismatch(&raw)),
    }
}

/// Human-readable shape name of a JSON value, used in mismatch errors.
#[must_use]
pub const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "map",
    }
}

/// NaN and the infinities have no portable column representation (SQLite stores NaN as NULL).
fn finite(v: f64) -> Result<f64, DomainError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DomainError::unsupported_value_type(format!("non-finite float {v}")))
    }
}

fn normalize_datetime(value: OffsetDateTime) -> OffsetDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    utc - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

fn coerce_bool(raw: &JsonValue) -> Option<bool> {
    match raw {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_i64().map(|i| i != 0),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(raw: &JsonValue) -> Option<i64> {
    match raw {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= -(2f64.powi(63)) && *f < 2f64.powi(63))
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_float(raw: &JsonValue) -> Option<f64> {
    match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_datetime(raw: &JsonValue) -> Option<OffsetDateTime> {
    match raw {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok()),
        JsonValue::String(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

fn coerce_date(raw: &JsonValue) -> Option<Date> {
    match raw {
        JsonValue::String(s) => {
            let s = s.trim();
            Date::parse(s, format_description!("[year]-[month]-[day]"))
                .ok()
                .or_else(|| parse_datetime(s).map(|dt| dt.to_offset(UtcOffset::UTC).date()))
        }
        other => coerce_datetime(other).map(|dt| dt.to_offset(UtcOffset::UTC).date()),
    }
}

fn parse_datetime(s: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(dt.assume_utc());
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}
