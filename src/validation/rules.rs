//! Field rules shared by the forms

use chrono::NaiveDate;
use url::Url;
use crate::utils::helpers::{is_valid_email, is_valid_phone};

pub fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(())
    }
}

pub fn max_length(value: &str, max: usize, label: &str) -> Result<(), String> {
    if value.trim().chars().count() > max {
        Err(format!("{} must be at most {} characters", label, max))
    } else {
        Ok(())
    }
}

pub fn min_length(value: &str, min: usize, label: &str) -> Result<(), String> {
    if value.trim().chars().count() < min {
        Err(format!("{} must be at least {} characters", label, min))
    } else {
        Ok(())
    }
}

/// Absolute http(s) URL with a host
pub fn valid_url(value: &str, label: &str) -> Result<(), String> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(format!("{} must be a valid URL", label)),
    }
}

pub fn valid_email(value: &str, label: &str) -> Result<(), String> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(format!("{} must be a valid email address", label))
    }
}

pub fn valid_phone(value: &str, label: &str) -> Result<(), String> {
    if is_valid_phone(value.trim()) {
        Ok(())
    } else {
        Err(format!("{} must be a valid phone number", label))
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", label))
}

/// Trimmed copy of an optional field; blank becomes `None`
pub fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
