//! Sectioned key/value configuration source.

use std::str::FromStr;

use crate::domain::error::SigtraderError;

/// Lookups by `[section] key`.
///
/// The `get_*` getters fall back to `default` when the key is absent or
/// unparsable. The `checked_*` lookups return `Ok(None)` only when the key is
/// absent; a value that is present but does not parse is `ConfigInvalid`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    fn checked_int(&self, section: &str, key: &str) -> Result<Option<i64>, SigtraderError> {
        parse_present(self.get_string(section, key), section, key, "an integer")
    }

    fn checked_double(&self, section: &str, key: &str) -> Result<Option<f64>, SigtraderError> {
        match parse_present::<f64>(self.get_string(section, key), section, key, "a number")? {
            Some(v) if !v.is_finite() => {
                Err(not_parsable(section, key, &v.to_string(), "a finite number"))
            }
            other => Ok(other),
        }
    }

    fn checked_bool(&self, section: &str, key: &str) -> Result<Option<bool>, SigtraderError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => parse_bool(&raw)
                .map(Some)
                .ok_or_else(|| not_parsable(section, key, &raw, "true/false, yes/no or 1/0")),
        }
    }
}

/// Accepted boolean spellings, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_present<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, SigtraderError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| not_parsable(section, key, &raw, expected)),
    }
}

fn not_parsable(section: &str, key: &str, raw: &str, expected: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("'{}' is not {expected}", raw.trim()),
    }
}
