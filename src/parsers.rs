//! Conversion of raw strings into field values.
//!
//! Every scalar parser treats an empty string as "no value": the target is left
//! untouched and no error is raised. Whether a field must have a value is the
//! validators' concern.

use crate::error::{DurationError, ParseError};
use crate::loader::default_loader;
use crate::value::{Kind, Value};
use chrono::TimeDelta;

/// Converts a raw string into a field value
pub trait ValueParser: Send + Sync {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError>;
}

impl<F> ValueParser for F
where
    F: Fn(&str, &mut Value) -> Result<(), ParseError> + Send + Sync,
{
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        self(raw, target)
    }
}

/// Looks up the parser for a sequence's element kind
pub type ParserProvider<'a> = dyn Fn(Kind) -> Option<&'a dyn ValueParser> + 'a;

/// Separator between sequence elements
pub const SLICE_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl ValueParser for StringParser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        *target = Value::Str(raw.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Int64Parser;

impl ValueParser for Int64Parser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }
        let v = raw.parse::<i64>().map_err(|source| ParseError::Int {
            literal: raw.to_string(),
            source,
        })?;
        *target = Value::Int(v);
        Ok(())
    }
}

/// Parses native-width integers, rejecting values that overflow `isize`
#[derive(Debug, Clone, Copy, Default)]
pub struct IntParser;

impl ValueParser for IntParser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }
        let v = raw.parse::<isize>().map_err(|source| ParseError::Int {
            literal: raw.to_string(),
            source,
        })?;
        *target = Value::Int(v as i64);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolParser;

impl ValueParser for BoolParser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }
        let v = match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => return Err(ParseError::Bool(raw.to_string())),
        };
        *target = Value::Bool(v);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Float64Parser;

impl ValueParser for Float64Parser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }
        let v = raw.parse::<f64>().map_err(|source| ParseError::Float {
            literal: raw.to_string(),
            source,
        })?;
        *target = Value::Float(v);
        Ok(())
    }
}

/// Parses a bare integer as seconds, anything else as a duration literal
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationParser;

impl ValueParser for DurationParser {
    fn parse(&self, raw: &str, target: &mut Value) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }
        let d = if raw.parse::<i64>().is_ok() {
            parse_duration(&format!("{}s", raw))?
        } else {
            parse_duration(raw)?
        };
        *target = Value::Duration(d);
        Ok(())
    }
}

/// Splits comma separated input and parses each element with the parser
/// registered for the element kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceParser;

impl SliceParser {
    /// Parse `raw` into a list of `element` values.
    ///
    /// The whole conversion fails on the first bad element; `target` is only
    /// replaced once every element parsed.
    pub fn parse_with(
        &self,
        raw: &str,
        element: Kind,
        provider: &ParserProvider<'_>,
        target: &mut Value,
    ) -> Result<(), ParseError> {
        if raw.is_empty() {
            return Ok(());
        }

        let parser = provider(element).ok_or(ParseError::UnsupportedElement(element))?;

        let items = raw
            .split(SLICE_SEPARATOR)
            .map(|piece| {
                let mut item = element.zero_value();
                parser.parse(piece, &mut item)?;
                Ok(item)
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        *target = Value::List(items);
        Ok(())
    }

    /// Like [`SliceParser::parse_with`], looking element parsers up in the
    /// shared default loader
    pub fn parse(&self, raw: &str, element: Kind, target: &mut Value) -> Result<(), ParseError> {
        self.parse_with(raw, element, &|kind| default_loader().parser(kind), target)
    }
}

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Largest magnitude a duration may have, reached only by negative durations
const MAX_MAGNITUDE: u64 = 1 << 63;

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Split off the leading run of ASCII digits
fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a duration literal such as `300ms`, `-1.5h` or `2h45m`.
///
/// A literal is an optional sign followed by one or more decimal numbers,
/// each with a unit suffix. Valid units are `ns`, `us` (or `µs`), `ms`, `s`,
/// `m` and `h`. The lone literal `0` needs no unit.
pub fn parse_duration(literal: &str) -> Result<TimeDelta, DurationError> {
    let invalid = || DurationError::Invalid(literal.to_string());
    let overflow = || DurationError::Overflow(literal.to_string());

    let (negative, mut rest) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (int_digits, after_int) = split_digits(rest);
        let mut whole: u64 = 0;
        for digit in int_digits.bytes() {
            whole = whole
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit - b'0')))
                .filter(|v| *v <= MAX_MAGNITUDE)
                .ok_or_else(overflow)?;
        }
        rest = after_int;

        // Fraction digits beyond u64 precision are dropped rather than rejected
        let mut fraction: u64 = 0;
        let mut scale: f64 = 1.0;
        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after) = split_digits(after_dot);
            frac_digits = digits;
            for digit in digits.bytes() {
                if let Some(v) = fraction
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit - b'0')))
                    .filter(|v| *v <= MAX_MAGNITUDE)
                {
                    fraction = v;
                    scale *= 10.0;
                }
            }
            rest = after;
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_end);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(literal.to_string()));
        }
        let unit_nanos = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            literal: literal.to_string(),
        })?;
        rest = after_unit;

        let mut value = whole
            .checked_mul(unit_nanos)
            .filter(|v| *v <= MAX_MAGNITUDE)
            .ok_or_else(overflow)?;
        if fraction > 0 {
            let extra = (fraction as f64 * (unit_nanos as f64 / scale)) as u64;
            value = value
                .checked_add(extra)
                .filter(|v| *v <= MAX_MAGNITUDE)
                .ok_or_else(overflow)?;
        }
        total = total
            .checked_add(value)
            .filter(|v| *v <= MAX_MAGNITUDE)
            .ok_or_else(overflow)?;
    }

    let nanos = if negative {
        // -(1 << 63) is representable, so wrap through i128
        i64::try_from(-(i128::from(total))).map_err(|_| overflow())?
    } else {
        i64::try_from(total).map_err(|_| overflow())?
    };
    Ok(TimeDelta::nanoseconds(nanos))
}
