use dapple_core::{AsValue, Error, Result, Value};
use rusqlite::types::{Value as SqliteValue, ValueRef};
use time::macros::format_description;

pub(crate) fn extract_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => v.as_value(),
        ValueRef::Real(v) => v.as_value(),
        ValueRef::Text(v) => String::from_utf8_lossy(v).into_owned().as_value(),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    }
}

/// Converts a parameter into one of the five SQLite storage classes.
///
/// Decimals, uuids and temporal values are stored as text in the formats
/// `AsValue` parses back.
pub(crate) fn bind_value(value: Value) -> Result<SqliteValue> {
    if value.is_null() {
        return Ok(SqliteValue::Null);
    }
    Ok(match value {
        Value::Boolean(Some(v)) => SqliteValue::Integer(v as i64),
        Value::Int32(Some(v)) => SqliteValue::Integer(v.into()),
        Value::Int64(Some(v)) => SqliteValue::Integer(v),
        Value::UInt64(Some(v)) => SqliteValue::Integer(i64::try_from(v).map_err(|_| {
            Error::msg(format!(
                "Cannot bind u64 value `{v}` into sqlite integer because it's out of bounds"
            ))
        })?),
        Value::Float64(Some(v)) => SqliteValue::Real(v),
        Value::Decimal(Some(v)) => SqliteValue::Text(v.to_string()),
        Value::Varchar(Some(v)) => SqliteValue::Text(v),
        Value::Blob(Some(v)) => SqliteValue::Blob(v.into_vec()),
        Value::Date(Some(v)) => SqliteValue::Text(v.format(format_description!("[year]-[month]-[day]"))?),
        Value::Time(Some(v)) => SqliteValue::Text(if v.nanosecond() == 0 {
            v.format(format_description!("[hour]:[minute]:[second]"))?
        } else {
            v.format(format_description!("[hour]:[minute]:[second].[subsecond]"))?
        }),
        Value::Timestamp(Some(v)) => SqliteValue::Text(if v.nanosecond() == 0 {
            v.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))?
        } else {
            v.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
            ))?
        }),
        Value::Uuid(Some(v)) => SqliteValue::Text(v.to_string()),
        _ => SqliteValue::Null,
    })
}
