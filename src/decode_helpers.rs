use crate::constants::*;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Formats a date-only parameter as `DD-MM-YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a date-time parameter as `DD/MM/YYYY HH:MM` (24-hour, no seconds).
pub fn format_date_time(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_TIME_FORMAT).to_string()
}

/// Accepts `YYYY-MM-DD` or `DD-MM-YYYY`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, DATE_FORMAT))
        .map_err(|e| Error::InvalidRequest(format!("Invalid date '{}': {}", input, e)))
}

/// Accepts `DD/MM/YYYY HH:MM`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM`.
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .map_err(|e| Error::InvalidRequest(format!("Invalid timestamp '{}': {}", input, e)))
}

/// Splits one line of tabular output into fields with carriage returns removed.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_SEPARATOR)
        .map(|field| field.replace(CARRIAGE_RETURN, ""))
        .collect()
}

/// The historian writes decimals with a comma; turn them into periods.
pub fn normalize_decimal(field: &str) -> String {
    field.replace(',', ".")
}
