//! Token to `f32` conversion and the shared number formatting rule.
//!
//! Values are written with `f32`'s `Display` implementation, which prints the
//! shortest decimal string that parses back to the same bits (`1`, `0.1`,
//! `-2.5`, `NaN`, `inf`). Every text output in the crate goes through
//! [`format_value`] so reports stay reproducible.

use std::fmt;

use super::DecodeError;
use super::scanner::Token;

/// Sentinel for a missing reading.
pub const MISSING: f32 = f32::NAN;

/// Parse a token that must hold a number.
pub fn parse_value(token: &Token<'_>) -> Result<f32, DecodeError> {
    let text = token.trimmed();
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .ok_or_else(|| DecodeError::InvalidNumber {
            offset: token.offset,
            token: String::from_utf8_lossy(text).into_owned(),
        })
}

/// Parse a reading token; a blank token is a missing reading.
pub fn parse_reading(token: &Token<'_>) -> Result<f32, DecodeError> {
    if token.is_blank() {
        Ok(MISSING)
    } else {
        parse_value(token)
    }
}

/// Display adapter applying the crate's number formatting rule.
#[derive(Debug, Clone, Copy)]
pub struct FormattedValue(f32);

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[inline]
pub fn format_value(value: f32) -> FormattedValue {
    FormattedValue(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::scanner::Delimiter;

    fn token(text: &str) -> Token<'_> {
        Token {
            bytes: text.as_bytes(),
            offset: 7,
            delimiter: Delimiter::Field,
        }
    }

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_value(&token("1")).unwrap(), 1.0);
        assert_eq!(parse_value(&token("-2.5")).unwrap(), -2.5);
        assert_eq!(parse_value(&token(".5")).unwrap(), 0.5);
        assert_eq!(parse_value(&token("1e3")).unwrap(), 1000.0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_value(&token(" 4\r")).unwrap(), 4.0);
    }

    #[test]
    fn test_parse_reports_offset() {
        let err = parse_value(&token("12a")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNumber {
                offset: 7,
                token: "12a".to_string()
            }
        );
    }

    #[test]
    fn test_blank_reading_is_missing() {
        assert!(parse_reading(&token("")).unwrap().is_nan());
        assert!(parse_reading(&token("  ")).unwrap().is_nan());
        assert!(parse_value(&token("")).is_err());
    }

    #[test]
    fn test_explicit_nan_reading() {
        assert!(parse_reading(&token("NaN")).unwrap().is_nan());
    }

    #[test]
    fn test_format_is_shortest_roundtrip() {
        assert_eq!(format_value(1.0).to_string(), "1");
        assert_eq!(format_value(0.1).to_string(), "0.1");
        assert_eq!(format_value(-20.25).to_string(), "-20.25");
        assert_eq!(format_value(f32::NAN).to_string(), "NaN");

        let value = 1.0f32 / 3.0;
        let text = format_value(value).to_string();
        assert_eq!(text.parse::<f32>().unwrap().to_bits(), value.to_bits());
    }
}
