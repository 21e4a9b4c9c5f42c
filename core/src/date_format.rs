//! Validated strftime-style date format.

use std::fmt;
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors raised while building or applying a [`DateFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    /// The pattern contains an unknown or malformed specifier.
    #[error("invalid date format pattern: {0}")]
    InvalidPattern(String),
    /// The pattern needs data the value does not carry (e.g. a time zone).
    #[error("pattern {0} cannot format this value")]
    Unsupported(String),
    /// Input text does not match the pattern.
    #[error("\"{input}\" does not match {pattern}: {reason}")]
    Parse {
        input: String,
        pattern: String,
        reason: String,
    },
}

/// A date format pattern such as `%Y-%m-%d`, checked when created.
///
/// # Examples
///
/// ```
/// use argbind_core::DateFormat;
/// use chrono::NaiveDate;
///
/// let format = DateFormat::new("%d/%m/%Y").unwrap();
/// let date = format.parse_date("24/12/2025").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 24).unwrap());
///
/// assert!(DateFormat::new("%Q").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// # Errors
    ///
    /// Returns [`DateFormatError::InvalidPattern`] if any specifier in
    /// `pattern` is not understood.
    pub fn new(pattern: impl Into<String>) -> Result<Self, DateFormatError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(DateFormatError::InvalidPattern(pattern));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Formats a date-time with this pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DateFormatError::Unsupported`] when the pattern asks for
    /// fields a naive date-time does not have.
    pub fn format(&self, value: &NaiveDateTime) -> Result<String, DateFormatError> {
        let mut out = String::new();
        write!(out, "{}", value.format(&self.pattern))
            .map_err(|_| DateFormatError::Unsupported(self.pattern.clone()))?;
        Ok(out)
    }

    /// Parses a date-time.
    ///
    /// # Errors
    ///
    /// Returns [`DateFormatError::Parse`] if `input` does not match.
    pub fn parse(&self, input: &str) -> Result<NaiveDateTime, DateFormatError> {
        NaiveDateTime::parse_from_str(input, &self.pattern).map_err(|e| self.parse_error(input, e))
    }

    /// Parses a date without a time component.
    ///
    /// # Errors
    ///
    /// Returns [`DateFormatError::Parse`] if `input` does not match.
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate, DateFormatError> {
        NaiveDate::parse_from_str(input, &self.pattern).map_err(|e| self.parse_error(input, e))
    }

    fn parse_error(&self, input: &str, error: chrono::ParseError) -> DateFormatError {
        DateFormatError::Parse {
            input: input.to_string(),
            pattern: self.pattern.clone(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
