use crate::error::{ParseError, RangeError, ValidationError};
use crate::field::Tags;
use crate::value::{Numeric, Value};

/// Generic message for range failures without a `range_error` tag
pub const OUT_OF_RANGE: &str = "value out of range";

/// Checks a parsed field value against its declared annotations
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value, tags: &Tags) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value, &Tags) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, value: &Value, tags: &Tags) -> Result<(), ValidationError> {
        self(value, tags)
    }
}

/// Rejects zero values on fields marked `required = "true"`.
///
/// Zero includes `false`, so a required boolean only accepts `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl Validator for RequiredValidator {
    fn validate(&self, value: &Value, tags: &Tags) -> Result<(), ValidationError> {
        if !tags.is_required() {
            return Ok(());
        }

        if value.is_zero() {
            return Err(ValidationError::Required);
        }

        Ok(())
    }
}

/// Checks integer and float values against inclusive `min`/`max` bounds.
///
/// Values of any other kind pass, even when bounds are declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator;

impl Validator for RangeValidator {
    fn validate(&self, value: &Value, tags: &Tags) -> Result<(), ValidationError> {
        let (min, max) = (tags.min(), tags.max());
        if min.is_none() && max.is_none() {
            return Ok(());
        }

        let result = match value.as_numeric() {
            Some(Numeric::Int(v)) => check_int_range(v, min, max),
            Some(Numeric::Float(v)) => check_float_range(v, min, max),
            None => Ok(()),
        };

        result.map_err(|source| ValidationError::Range {
            message: tags.range_error().unwrap_or(OUT_OF_RANGE).to_string(),
            source,
        })
    }
}

fn int_bound(bound: &'static str, literal: &str) -> Result<i64, RangeError> {
    literal.parse::<i64>().map_err(|source| RangeError::InvalidBound {
        bound,
        source: ParseError::Int {
            literal: literal.to_string(),
            source,
        },
    })
}

fn float_bound(bound: &'static str, literal: &str) -> Result<f64, RangeError> {
    literal.parse::<f64>().map_err(|source| RangeError::InvalidBound {
        bound,
        source: ParseError::Float {
            literal: literal.to_string(),
            source,
        },
    })
}

fn check_int_range(value: i64, min: Option<&str>, max: Option<&str>) -> Result<(), RangeError> {
    if let Some(literal) = min {
        let minimum = int_bound("min", literal)?;
        if value < minimum {
            return Err(RangeError::BelowMinimum {
                value: Numeric::Int(value),
                minimum: Numeric::Int(minimum),
            });
        }
    }

    if let Some(literal) = max {
        let maximum = int_bound("max", literal)?;
        if value > maximum {
            return Err(RangeError::AboveMaximum {
                value: Numeric::Int(value),
                maximum: Numeric::Int(maximum),
            });
        }
    }

    Ok(())
}

fn check_float_range(value: f64, min: Option<&str>, max: Option<&str>) -> Result<(), RangeError> {
    if let Some(literal) = min {
        let minimum = float_bound("min", literal)?;
        if value < minimum {
            return Err(RangeError::BelowMinimum {
                value: Numeric::Float(value),
                minimum: Numeric::Float(minimum),
            });
        }
    }

    if let Some(literal) = max {
        let maximum = float_bound("max", literal)?;
        if value > maximum {
            return Err(RangeError::AboveMaximum {
                value: Numeric::Float(value),
                maximum: Numeric::Float(maximum),
            });
        }
    }

    Ok(())
}
