//! Decimal parsing for margin values ingested from legacy rows.
//!
//! Historical configuration rows store percentages as locale-formatted text
//! ("2,5" as often as "2.5"). Input contract: an optional sign, digits, and
//! at most one decimal separator, which may be `.` or `,`. Multiple
//! separators are rejected. Parsing happens once at the data-access
//! boundary and yields a `BigDecimal`, never a float.

use bigdecimal::BigDecimal;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecimalParseError {
    #[error("empty decimal value")]
    Empty,
    #[error("multiple decimal separators in {0:?}")]
    MultipleSeparators(String),
    #[error("invalid decimal value {0:?}")]
    Invalid(String),
}

pub fn parse_decimal(raw: &str) -> Result<BigDecimal, DecimalParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DecimalParseError::Empty);
    }

    let separators = trimmed.chars().filter(|c| *c == '.' || *c == ',').count();
    if separators > 1 {
        return Err(DecimalParseError::MultipleSeparators(raw.to_string()));
    }

    let normalized = trimmed.replace(',', ".");
    BigDecimal::from_str(&normalized).map_err(|_| DecimalParseError::Invalid(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_separators() {
        assert_eq!(parse_decimal("2.5").unwrap(), BigDecimal::from_str("2.5").unwrap());
        assert_eq!(parse_decimal("2,5").unwrap(), BigDecimal::from_str("2.5").unwrap());
        assert_eq!(parse_decimal("  0,15 ").unwrap(), BigDecimal::from_str("0.15").unwrap());
        assert_eq!(parse_decimal("100").unwrap(), BigDecimal::from(100));
        assert_eq!(parse_decimal("-1.25").unwrap(), BigDecimal::from_str("-1.25").unwrap());
    }

    #[test]
    fn test_reject_multiple_separators() {
        // Thousands-grouped values are ambiguous and rejected outright.
        assert_eq!(
            parse_decimal("1.234,56"),
            Err(DecimalParseError::MultipleSeparators("1.234,56".to_string()))
        );
        assert_eq!(
            parse_decimal("1,2,3"),
            Err(DecimalParseError::MultipleSeparators("1,2,3".to_string()))
        );
    }

    #[test]
    fn test_reject_garbage() {
        assert_eq!(parse_decimal(""), Err(DecimalParseError::Empty));
        assert_eq!(parse_decimal("   "), Err(DecimalParseError::Empty));
        assert!(matches!(parse_decimal("abc"), Err(DecimalParseError::Invalid(_))));
        assert!(matches!(parse_decimal("2.5%"), Err(DecimalParseError::Invalid(_))));
    }
}
