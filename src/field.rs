use crate::error::{ConfigError, ParseError};
use crate::loader::Loader;
use crate::value::{Kind, Value};
use chrono::{DateTime, TimeDelta, Utc};

/// Annotation names understood by the default loader
pub mod tags {
    /// Environment variable key (before the loader prefix is applied)
    pub const ENV: &str = "env";
    /// Marks the field as required when set to [`TRUE`]
    pub const REQUIRED: &str = "required";
    /// Raw value used when the environment variable is unset or empty
    pub const DEFAULT: &str = "default";
    /// Inclusive lower bound
    pub const MIN: &str = "min";
    /// Inclusive upper bound
    pub const MAX: &str = "max";
    /// Replaces the generic out of range message
    pub const RANGE_ERROR: &str = "range_error";

    pub const TRUE: &str = "true";
}

/// Declarative annotations attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tags(&'static [(&'static str, &'static str)]);

impl Tags {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self(pairs)
    }

    /// Literal for the first tag called `name`
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().copied()
    }

    /// Environment key, if one is declared and non-empty
    pub fn env_key(&self) -> Option<&'static str> {
        self.get(tags::ENV).filter(|key| !key.is_empty())
    }

    pub fn default_literal(&self) -> Option<&'static str> {
        self.get(tags::DEFAULT).filter(|value| !value.is_empty())
    }

    pub fn is_required(&self) -> bool {
        self.get(tags::REQUIRED) == Some(tags::TRUE)
    }

    pub fn min(&self) -> Option<&'static str> {
        self.get(tags::MIN).filter(|value| !value.is_empty())
    }

    pub fn max(&self) -> Option<&'static str> {
        self.get(tags::MAX).filter(|value| !value.is_empty())
    }

    pub fn range_error(&self) -> Option<&'static str> {
        self.get(tags::RANGE_ERROR).filter(|value| !value.is_empty())
    }
}

/// Describes a single field of a configuration structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used in error paths
    pub name: &'static str,
    pub tags: Tags,
}

impl FieldSpec {
    pub const fn new(name: &'static str, tags: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            name,
            tags: Tags::new(tags),
        }
    }
}

/// A field the loader can visit.
///
/// Leaf types load themselves through [`Loader::load_leaf`]; structures
/// deriving `EnvConfig` recurse into their own fields and ignore `spec`.
pub trait Field {
    fn load(&mut self, loader: &Loader, spec: &FieldSpec) -> Result<(), ConfigError>;
}

/// Conversion between a leaf field's Rust type and a [`Value`]
pub trait FieldValue: Sized {
    fn kind() -> Kind;

    /// Element kind for sequence types
    fn element_kind() -> Option<Kind> {
        None
    }

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ParseError>;
}

fn mismatch(kind: Kind, value: &Value) -> ParseError {
    ParseError::Mismatch {
        kind,
        found: value.type_name().to_string(),
    }
}

fn out_of_range(kind: Kind, shown: impl ToString) -> ParseError {
    ParseError::Mismatch {
        kind,
        found: shown.to_string(),
    }
}

macro_rules! leaf_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn load(&mut self, loader: &Loader, spec: &FieldSpec) -> Result<(), ConfigError> {
                    loader.load_leaf(self, spec)
                }
            }
        )*
    };
}

macro_rules! signed_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self, ParseError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range(Kind::$kind, v)),
                        Value::Uint(v) => <$ty>::try_from(v).map_err(|_| out_of_range(Kind::$kind, v)),
                        other => Err(mismatch(Kind::$kind, &other)),
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::Uint(*self as u64)
                }

                fn from_value(value: Value) -> Result<Self, ParseError> {
                    match value {
                        Value::Uint(v) => <$ty>::try_from(v).map_err(|_| out_of_range(Kind::$kind, v)),
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range(Kind::$kind, v)),
                        other => Err(mismatch(Kind::$kind, &other)),
                    }
                }
            }
        )*
    };
}

signed_field_value!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64, isize => Int);
unsigned_field_value!(u8 => Uint8, u16 => Uint16, u32 => Uint32, u64 => Uint64, usize => Uint);

leaf_field!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    TimeDelta,
    std::time::Duration,
    DateTime<Utc>,
);

impl FieldValue for f64 {
    fn kind() -> Kind {
        Kind::Float64
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch(Kind::Float64, &other)),
        }
    }
}

impl FieldValue for f32 {
    fn kind() -> Kind {
        Kind::Float32
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(out_of_range(Kind::Float32, v))
            }
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch(Kind::Float32, &other)),
        }
    }
}

impl FieldValue for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(Kind::Bool, &other)),
        }
    }
}

impl FieldValue for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(mismatch(Kind::String, &other)),
        }
    }
}

impl FieldValue for TimeDelta {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Duration(v) => Ok(v),
            other => Err(mismatch(Kind::Duration, &other)),
        }
    }
}

// std durations cannot be negative, so negative literals are rejected on store
impl FieldValue for std::time::Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn to_value(&self) -> Value {
        Value::Duration(TimeDelta::from_std(*self).unwrap_or(TimeDelta::MAX))
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Duration(v) => v.to_std().map_err(|_| out_of_range(Kind::Duration, v)),
            other => Err(mismatch(Kind::Duration, &other)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Time(v) => Ok(v),
            other => Err(mismatch(Kind::Time, &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> Kind {
        Kind::Slice
    }

    fn element_kind() -> Option<Kind> {
        Some(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(Kind::Slice, &other)),
        }
    }
}

impl<T: FieldValue> Field for Vec<T> {
    fn load(&mut self, loader: &Loader, spec: &FieldSpec) -> Result<(), ConfigError> {
        loader.load_leaf(self, spec)
    }
}
