use crate::value::{Kind, Numeric};
use colored::Colorize;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Boxed error type returned by custom parsers and validators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading a configuration structure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The wrapped error happened while loading the named field
    #[error("field {name}: {source}")]
    Field {
        name: &'static str,
        source: Box<ConfigError>,
    },
    /// A field with an environment key has a kind with no registered parser
    #[error("unsupported type: {0}")]
    UnsupportedType(Kind),
    /// The raw value could not be converted to the field's type
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed value failed one of the loader's validators
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// Wrap this error with the name of the field it occurred in
    pub fn in_field(self, name: &'static str) -> Self {
        ConfigError::Field {
            name,
            source: Box::new(self),
        }
    }

    /// Field names from the outermost structure down to the failing field
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut current = self;
        while let ConfigError::Field { name, source } = current {
            names.push(*name);
            current = source;
        }
        names
    }

    /// Dotted path of the failing field, e.g. `database.port`
    pub fn path(&self) -> String {
        self.field_names().join(".")
    }

    /// The underlying error with all field wrapping removed
    pub fn root_cause(&self) -> &ConfigError {
        let mut current = self;
        while let ConfigError::Field { source, .. } = current {
            current = source;
        }
        current
    }
}

/// Errors produced while converting a raw string into a value
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid integer {literal:?}: {source}")]
    Int {
        literal: String,
        source: ParseIntError,
    },
    #[error("invalid float {literal:?}: {source}")]
    Float {
        literal: String,
        source: ParseFloatError,
    },
    #[error("invalid boolean {0:?}")]
    Bool(String),
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error("unsupported slice element type: {0}")]
    UnsupportedElement(Kind),
    /// A parsed value does not fit the field it is stored into
    #[error("cannot store {found} in a {kind} field")]
    Mismatch { kind: Kind, found: String },
    #[error(transparent)]
    Custom(BoxError),
}

impl ParseError {
    /// Wrap an arbitrary error raised by a custom parser
    pub fn custom(error: impl Into<BoxError>) -> Self {
        ParseError::Custom(error.into())
    }
}

/// Errors produced by the duration literal parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {literal:?}")]
    UnknownUnit { unit: String, literal: String },
    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Errors produced by validators
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("required field is empty")]
    Required,
    #[error("{message}: {source}")]
    Range { message: String, source: RangeError },
    #[error(transparent)]
    Custom(BoxError),
}

impl ValidationError {
    /// Wrap an arbitrary error raised by a custom validator
    pub fn custom(error: impl Into<BoxError>) -> Self {
        ValidationError::Custom(error.into())
    }
}

/// Detail of a range check failure
#[derive(Debug, Error)]
pub enum RangeError {
    /// The declared bound literal itself does not parse
    #[error("invalid {bound} value: {source}")]
    InvalidBound {
        bound: &'static str,
        source: ParseError,
    },
    #[error("value {value} is less than minimum {minimum}")]
    BelowMinimum { value: Numeric, minimum: Numeric },
    #[error("value {value} is greater than maximum {maximum}")]
    AboveMaximum { value: Numeric, maximum: Numeric },
}

/// Render a load failure for a panic message or terminal output
pub fn format_config_error(error: &ConfigError) -> String {
    let path = error.path();
    let location = if path.is_empty() {
        "<config>".to_string()
    } else {
        path
    };

    format!(
        "Configuration failed at {}:\n  - {}",
        location.magenta().bold(),
        error.root_cause().to_string().red()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_wrapping_display() {
        let error = ConfigError::Validation(ValidationError::Required)
            .in_field("host")
            .in_field("database");

        assert_eq!(
            error.to_string(),
            "field database: field host: required field is empty"
        );
    }

    #[test]
    fn test_path_and_field_names() {
        let error = ConfigError::UnsupportedType(Kind::Uint16)
            .in_field("port")
            .in_field("server");

        assert_eq!(error.field_names(), vec!["server", "port"]);
        assert_eq!(error.path(), "server.port");
        assert!(matches!(
            error.root_cause(),
            ConfigError::UnsupportedType(Kind::Uint16)
        ));
    }

    #[test]
    fn test_unwrapped_error_has_empty_path() {
        let error = ConfigError::UnsupportedType(Kind::Time);
        assert_eq!(error.path(), "");
        assert_eq!(error.to_string(), "unsupported type: time");
    }

    #[test]
    fn test_range_error_display() {
        let error = ValidationError::Range {
            message: "value out of range".to_string(),
            source: RangeError::AboveMaximum {
                value: Numeric::Int(101),
                maximum: Numeric::Int(100),
            },
        };
        assert_eq!(
            error.to_string(),
            "value out of range: value 101 is greater than maximum 100"
        );
    }

    #[test]
    fn test_invalid_bound_display() {
        let source = "abc".parse::<i64>().unwrap_err();
        let error = RangeError::InvalidBound {
            bound: "min",
            source: ParseError::Int {
                literal: "abc".to_string(),
                source,
            },
        };
        assert!(error.to_string().starts_with("invalid min value: "));
    }

    #[test]
    fn test_custom_errors_are_transparent() {
        let error = ConfigError::from(ParseError::custom("bad timestamp"));
        assert_eq!(error.to_string(), "bad timestamp");

        let error = ConfigError::from(ValidationError::custom("not a url"));
        assert_eq!(error.to_string(), "not a url");
    }

    #[test]
    fn test_format_config_error() {
        colored::control::set_override(false);

        let error = ConfigError::Validation(ValidationError::Required).in_field("token");
        let formatted = format_config_error(&error);

        assert!(formatted.contains("Configuration failed at token"));
        assert!(formatted.contains("required field is empty"));
    }

    #[test]
    fn test_format_config_error_without_path() {
        colored::control::set_override(false);

        let formatted = format_config_error(&ConfigError::UnsupportedType(Kind::Int8));
        assert!(formatted.contains("<config>"));
        assert!(formatted.contains("unsupported type: int8"));
    }
}
