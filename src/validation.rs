use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::AppError;

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap());

/// Field name -> messages, rendered as the `errors` object of a 422 response.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message overall, used as the top-level `message` of the response.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(String::as_str)
    }

    /// Ok when nothing was collected, otherwise the whole set as a validation error.
    pub fn finish(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    /// Required, non-blank string no longer than `max` characters. Returns the trimmed value.
    pub fn required_string(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.add(field, format!("The {} field is required.", label(field)));
                None
            }
            Some(v) => self.bounded(field, v, max),
        }
    }

    /// Optional string; blank is treated as absent.
    pub fn optional_string(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(v) => self.bounded(field, v, max),
        }
    }

    fn bounded(&mut self, field: &str, value: &str, max: usize) -> Option<String> {
        if value.chars().count() > max {
            self.add(
                field,
                format!("The {} field must not be greater than {} characters.", label(field), max),
            );
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> Option<f64> {
        if !value.is_finite() || value < 0.0 {
            self.add(field, format!("The {} field must be at least 0.", label(field)));
            None
        } else {
            Some(value)
        }
    }

    pub fn positive(&mut self, field: &str, value: i64) -> Option<i64> {
        if value < 1 {
            self.add(field, format!("The {} field must be at least 1.", label(field)));
            None
        } else {
            Some(value)
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let email = self.required_string(field, value, 255)?;
        if is_email(&email) {
            Some(email.to_lowercase())
        } else {
            self.add(field, format!("The {} field must be a valid email address.", label(field)));
            None
        }
    }

    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let raw = match value.map(str::trim) {
            None | Some("") => {
                self.add(field, format!("The {} field is required.", label(field)));
                return None;
            }
            Some(v) => v,
        };
        match parse_date(raw) {
            Some(d) => Some(d),
            None => {
                self.add(field, format!("The {} field must be a valid date.", label(field)));
                None
            }
        }
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, format!("The {} field is required.", label(field)));
        }
        value
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn is_email(value: &str) -> bool {
    RE_EMAIL.is_match(value)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part is kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
