use crate::loader::Loader;
use crate::parsers::{
    BoolParser, DurationParser, Float64Parser, Int64Parser, IntParser, StringParser, ValueParser,
};
use crate::validators::{RangeValidator, RequiredValidator, Validator};
use crate::value::Kind;
use std::collections::HashMap;

/// Assembles a [`Loader`] from the default parsers and validators plus
/// caller supplied overrides.
///
/// # Example
/// ```rust
/// use env_binder::{Kind, Loader, ParseError, Value};
///
/// let loader = Loader::builder()
///     .with_prefix("APP_")
///     .with_parser(Kind::Uint16, |raw: &str, target: &mut Value| -> Result<(), ParseError> {
///         if !raw.is_empty() {
///             let port: u16 = raw.parse().map_err(ParseError::custom)?;
///             *target = Value::Uint(port.into());
///         }
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(loader.prefix(), "APP_");
/// assert!(loader.parser(Kind::Uint16).is_some());
/// ```
pub struct LoaderBuilder {
    parsers: HashMap<Kind, Box<dyn ValueParser>>,
    validators: Vec<Box<dyn Validator>>,
    prefix: String,
}

impl LoaderBuilder {
    /// Start from the default parser table and the required and range validators
    pub fn new() -> Self {
        let mut parsers: HashMap<Kind, Box<dyn ValueParser>> = HashMap::new();
        parsers.insert(Kind::String, Box::new(StringParser));
        parsers.insert(Kind::Int64, Box::new(Int64Parser));
        parsers.insert(Kind::Int, Box::new(IntParser));
        parsers.insert(Kind::Bool, Box::new(BoolParser));
        parsers.insert(Kind::Float64, Box::new(Float64Parser));
        parsers.insert(Kind::Duration, Box::new(DurationParser));

        Self {
            parsers,
            validators: vec![Box::new(RequiredValidator), Box::new(RangeValidator)],
            prefix: String::new(),
        }
    }

    /// Register a parser for `kind`, replacing any existing one.
    ///
    /// The parser is also used for sequence elements of that kind.
    pub fn with_parser(mut self, kind: Kind, parser: impl ValueParser + 'static) -> Self {
        self.parsers.insert(kind, Box::new(parser));
        self
    }

    /// Append a validator; validators run in registration order
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Prefix prepended to every environment key, e.g. `APP_` turns `PORT`
    /// into `APP_PORT`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn build(self) -> Loader {
        Loader {
            parsers: self.parsers,
            validators: self.validators,
            prefix: self.prefix,
        }
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, ValidationError};
    use crate::field::Tags;
    use crate::value::Value;

    #[test]
    fn test_builder_new() {
        let builder = LoaderBuilder::new();
        assert_eq!(builder.parsers.len(), 6);
        assert_eq!(builder.validators.len(), 2);
        assert!(builder.prefix.is_empty());
    }

    #[test]
    fn test_builder_default() {
        let builder = LoaderBuilder::default();
        assert_eq!(builder.parsers.len(), 6);
    }

    #[test]
    fn test_with_parser_replaces_existing() {
        let loader = LoaderBuilder::new()
            .with_parser(Kind::String, |raw: &str, target: &mut Value| -> Result<(), ParseError> {
                *target = Value::Str(raw.trim().to_string());
                Ok(())
            })
            .build();

        let mut value = Value::Str(String::new());
        loader
            .parser(Kind::String)
            .unwrap()
            .parse("  padded  ", &mut value)
            .unwrap();
        assert_eq!(value, Value::Str("padded".to_string()));
        assert_eq!(loader.parsers.len(), 6);
    }

    #[test]
    fn test_with_parser_inserts_new_kind() {
        let loader = LoaderBuilder::new()
            .with_parser(Kind::Int32, IntParser)
            .build();
        assert!(loader.parser(Kind::Int32).is_some());
        assert_eq!(loader.parsers.len(), 7);
    }

    #[test]
    fn test_with_validator_appends() {
        let no_localhost = |value: &Value, _tags: &Tags| -> Result<(), ValidationError> {
            match value {
                Value::Str(s) if s == "localhost" => {
                    Err(ValidationError::custom("localhost is not allowed"))
                }
                _ => Ok(()),
            }
        };
        let loader = LoaderBuilder::new().with_validator(no_localhost).build();

        assert_eq!(loader.validators.len(), 3);
        let last = loader.validators.last().unwrap();
        assert!(last
            .validate(&Value::Str("localhost".to_string()), &Tags::default())
            .is_err());
        assert!(last
            .validate(&Value::Str("db".to_string()), &Tags::default())
            .is_ok());
    }

    #[test]
    fn test_with_prefix() {
        let loader = LoaderBuilder::new().with_prefix("APP_").build();
        assert_eq!(loader.prefix(), "APP_");
    }
}
