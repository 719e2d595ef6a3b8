use std::fmt;

use chrono::NaiveDate;

/// Input format accepted for a calendar day argument.
pub const DAY_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Display format for a day, e.g. "Tuesday, 05 March 2024".
pub const DAY_LABEL_FORMAT: &str = "%A, %d %B %Y";

/// Parse a `YYYY-MM-DD` day argument.
pub fn parse_day(input: &str) -> Result<NaiveDate, ParseDayError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseDayError::Missing);
    }

    NaiveDate::parse_from_str(input, DAY_INPUT_FORMAT)
        .map_err(|_| ParseDayError::InvalidFormat(input.to_string()))
}

/// Human-readable label for a calendar day.
pub fn day_label(day: NaiveDate) -> String {
    day.format(DAY_LABEL_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDayError {
    Missing,
    InvalidFormat(String),
}

impl fmt::Display for ParseDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDayError::Missing => write!(f, "date parameter is required"),
            ParseDayError::InvalidFormat(input) => {
                write!(f, "invalid date '{}', use YYYY-MM-DD", input)
            }
        }
    }
}

impl std::error::Error for ParseDayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        assert_eq!(
            parse_day("2024-03-05"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(
            parse_day(" 2024-12-31 "),
            Ok(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_parse_day_invalid() {
        assert_eq!(parse_day(""), Err(ParseDayError::Missing));
        assert!(matches!(
            parse_day("05/03/2024"),
            Err(ParseDayError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_day("2024-02-30"),
            Err(ParseDayError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_day("2024-03-05T10:00:00"),
            Err(ParseDayError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_day_label() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(day_label(day), "Tuesday, 05 March 2024");

        let day = NaiveDate::from_ymd_opt(2006, 1, 2).unwrap();
        assert_eq!(day_label(day), "Monday, 02 January 2006");
    }
}
