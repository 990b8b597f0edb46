use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Coarse category of a field's value type, used as the parser registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    /// Native-width signed integer (`isize`)
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Native-width unsigned integer (`usize`)
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Slice,
    Duration,
    /// Timestamp fields: compound in shape, but always loaded as a leaf
    Time,
}

impl Kind {
    /// The zero value a freshly created field of this kind holds
    pub fn zero_value(self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => Value::Int(0),
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 => {
                Value::Uint(0)
            }
            Kind::Float32 | Kind::Float64 => Value::Float(0.0),
            Kind::String => Value::Str(String::new()),
            Kind::Slice => Value::List(Vec::new()),
            Kind::Duration => Value::Duration(TimeDelta::zero()),
            Kind::Time => Value::Time(DateTime::<Utc>::default()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Duration => "duration",
            Kind::Time => "time",
        };
        f.write_str(name)
    }
}

/// A field's value while it passes through parsers and validators
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Duration(TimeDelta),
    Time(DateTime<Utc>),
    List(Vec<Value>),
}

impl Value {
    /// Whether this is the zero value of its type.
    ///
    /// `false` counts as zero, so a required boolean can never be loaded as off.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(v) => *v == 0,
            Value::Uint(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Duration(d) => d.is_zero(),
            Value::Time(t) => *t == DateTime::<Utc>::default(),
            Value::List(items) => items.is_empty(),
        }
    }

    /// Range-comparable form of the value, if it has one
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int(v) => Some(Numeric::Int(*v)),
            Value::Float(v) => Some(Numeric::Float(*v)),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Duration(_) => "duration",
            Value::Time(_) => "time",
            Value::List(_) => "list",
        }
    }
}

/// The two numeric domains range bounds are compared in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{}", v),
            Numeric::Float(v) => write!(f, "{:.6}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Int64.to_string(), "int64");
        assert_eq!(Kind::Float64.to_string(), "float64");
        assert_eq!(Kind::Uint16.to_string(), "uint16");
        assert_eq!(Kind::Time.to_string(), "time");
    }

    #[test]
    fn test_zero_values_are_zero() {
        let kinds = [
            Kind::Bool,
            Kind::Int,
            Kind::Int64,
            Kind::Uint8,
            Kind::Float64,
            Kind::String,
            Kind::Slice,
            Kind::Duration,
            Kind::Time,
        ];
        for kind in kinds {
            assert!(kind.zero_value().is_zero(), "{} zero value", kind);
        }
    }

    #[test]
    fn test_non_zero_values() {
        assert!(!Value::Bool(true).is_zero());
        assert!(!Value::Int(-1).is_zero());
        assert!(!Value::Float(0.5).is_zero());
        assert!(!Value::Str("x".to_string()).is_zero());
        assert!(!Value::Duration(TimeDelta::seconds(1)).is_zero());
        assert!(!Value::List(vec![Value::Int(0)]).is_zero());
    }

    #[test]
    fn test_as_numeric() {
        assert_eq!(Value::Int(5).as_numeric(), Some(Numeric::Int(5)));
        assert_eq!(Value::Float(1.5).as_numeric(), Some(Numeric::Float(1.5)));
        assert_eq!(Value::Uint(5).as_numeric(), None);
        assert_eq!(Value::Str("5".into()).as_numeric(), None);
    }

    #[test]
    fn test_numeric_display() {
        assert_eq!(Numeric::Int(-3).to_string(), "-3");
        assert_eq!(Numeric::Float(1.5).to_string(), "1.500000");
    }
}
