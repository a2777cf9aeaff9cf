//! Plain property values shared by entities and business objects.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::entity::RepeatConfig;
use crate::mapping::{MappingResult, Site};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Bool,
    Int,
    Date,
    Time,
    DateTime,
    Duration,
    TextSet,
    Repeat,
}

/// Declared type of a plain property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl FieldType {
    pub const fn required(kind: ValueKind) -> Self {
        FieldType {
            kind,
            nullable: false,
        }
    }

    pub const fn optional(kind: ValueKind) -> Self {
        FieldType {
            kind,
            nullable: true,
        }
    }

    /// Whether a value declared as `source` may be stored in a slot of this type.
    /// A nullable value never fits a non-nullable slot.
    pub fn accepts(&self, source: &FieldType) -> bool {
        self.kind == source.kind && (self.nullable || !source.nullable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Duration(Duration),
    TextSet(BTreeSet<String>),
    Repeat(RepeatConfig),
}

impl Value {
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Text(_) => Some(ValueKind::Text),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Time(_) => Some(ValueKind::Time),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::Duration(_) => Some(ValueKind::Duration),
            Value::TextSet(_) => Some(ValueKind::TextSet),
            Value::Repeat(_) => Some(ValueKind::Repeat),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert into a concrete type, reporting `site` on mismatch.
    pub fn cast<T: FromValue>(self, site: &Site) -> MappingResult<T> {
        T::from_value(self).ok_or_else(|| site.mismatch())
    }
}

/// Extraction of a concrete type out of a `Value`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_conversions! {
    String => Text,
    bool => Bool,
    i64 => Int,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Duration => Duration,
    BTreeSet<String> => TextSet,
    RepeatConfig => Repeat,
}
