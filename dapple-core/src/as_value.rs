use crate::{Error, Result, Value, truncate_long};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{any, borrow::Cow, str::FromStr};
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// used for query parameters and result cells.
///
/// # Conversion contract
/// - `as_value` wraps the value in its canonical variant without loss.
/// - `try_from_value` accepts the canonical variant and, where it is lossless
///   after a range check, other numeric widths. Text is parsed for numeric,
///   decimal, uuid and temporal targets because many drivers (SQLite among
///   them) hand those back as text.
/// - A null value only converts into `Option<T>` or `Value`.
///
/// # Examples
/// ```rust
/// use dapple_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed null of this type.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {} value {} to {}",
        value.type_name(),
        value,
        any::type_name::<T>(),
    ))
}

fn parse_text<T: FromStr>(text: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.trim().parse::<T>().map_err(|e| {
        Error::new(e).context(format!(
            "Cannot parse `{}` as {}",
            truncate_long!(text),
            any::type_name::<T>()
        ))
    })
}

macro_rules! impl_from_value {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    value.as_value()
                }
            }
        )+
    };
}

macro_rules! impl_as_integer {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $($pat_rest => $expr_rest,)*
                    Value::Varchar(Some(ref v)) => parse_text(v),
                    ref v => Err(conversion_error::<Self>(v)),
                }
            }
        }
    };
}

impl_as_integer!(
    i32,
    Value::Int32,
    Value::Int64(Some(v)) => i32::try_from(v)
        .map_err(|_| Error::msg(format!("Value {v}: i64 is out of range for i32"))),
    Value::UInt64(Some(v)) => i32::try_from(v)
        .map_err(|_| Error::msg(format!("Value {v}: u64 is out of range for i32"))),
);
impl_as_integer!(
    i64,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => i64::try_from(v)
        .map_err(|_| Error::msg(format!("Value {v}: u64 is out of range for i64"))),
);
impl_as_integer!(
    u64,
    Value::UInt64,
    Value::Int32(Some(v)) => u64::try_from(v)
        .map_err(|_| Error::msg(format!("Value {v}: i32 is out of range for u64"))),
    Value::Int64(Some(v)) => u64::try_from(v)
        .map_err(|_| Error::msg(format!("Value {v}: i64 is out of range for u64"))),
);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => match v.trim() {
                "true" | "TRUE" | "1" => Ok(true),
                "false" | "FALSE" | "0" => Ok(false),
                _ => Err(conversion_error::<Self>(&value)),
            },
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for f64 {
    fn as_empty_value() -> Value {
        Value::Float64(None)
    }
    fn as_value(self) -> Value {
        Value::Float64(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float64(Some(v)) => Ok(v),
            Value::Int32(Some(v)) => Ok(v as _),
            Value::Int64(Some(v)) => Ok(v as _),
            Value::UInt64(Some(v)) => Ok(v as _),
            Value::Decimal(Some(v)) => v
                .to_f64()
                .ok_or_else(|| Error::msg(format!("Decimal {v} does not fit in a f64"))),
            Value::Varchar(Some(ref v)) => parse_text(v),
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::UInt64(Some(v)) => Ok(v.into()),
            Value::Float64(Some(v)) => Decimal::try_from(v)
                .map_err(|e| Error::new(e).context(format!("Cannot convert {v} to Decimal"))),
            Value::Varchar(Some(ref v)) => parse_text(v),
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Uuid(Some(v)) => Ok(v.to_string()),
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Cow<'static, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => {
                Date::parse(v.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
                    Error::new(e).context(format!("Cannot parse `{}` as Date", truncate_long!(v)))
                })
            }
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(ref v)) => {
                let v = v.trim();
                Time::parse(v, format_description!("[hour]:[minute]:[second].[subsecond]"))
                    .or_else(|_| Time::parse(v, format_description!("[hour]:[minute]:[second]")))
                    .map_err(|e| {
                        Error::new(e)
                            .context(format!("Cannot parse `{}` as Time", truncate_long!(v)))
                    })
            }
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(ref v)) => {
                let v = v.trim();
                PrimitiveDateTime::parse(
                    v,
                    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
                )
                .or_else(|_| {
                    PrimitiveDateTime::parse(
                        v,
                        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
                    )
                })
                .or_else(|_| {
                    PrimitiveDateTime::parse(
                        v,
                        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
                    )
                })
                .map_err(|e| {
                    Error::new(e).context(format!(
                        "Cannot parse `{}` as PrimitiveDateTime",
                        truncate_long!(v)
                    ))
                })
            }
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => parse_text(v),
            Value::Blob(Some(ref v)) => Uuid::from_slice(v)
                .map_err(|e| Error::new(e).context("Cannot convert BLOB to Uuid")),
            ref v => Err(conversion_error::<Self>(v)),
        }
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl_from_value!(
    bool,
    i32,
    i64,
    u64,
    f64,
    Decimal,
    String,
    Cow<'static, str>,
    Box<[u8]>,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    Uuid,
);

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(Some(value.into()))
    }
}

macro_rules! impl_from_narrow {
    ($($source:ty => $wide:ty),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    <$wide>::from(value).as_value()
                }
            }
        )+
    };
}
impl_from_narrow!(i8 => i32, i16 => i32, u8 => i32, u16 => i32, u32 => i64, f32 => f64);
