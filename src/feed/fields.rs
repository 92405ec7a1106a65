//! Field access over a decoded JSON object.
//!
//! Every entity decodes by walking its object through [`Fields`]. A key
//! counts as present only when it exists and is not `null`. Required
//! accessors return [`DecodeError`] on absence or on a value of the wrong
//! shape; optional accessors never fail and substitute the default instead,
//! logging what was dropped.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

use super::codec::parse_date;
use super::error::DecodeError;

pub(crate) struct Fields<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(entity: &'static str, value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self { entity, map }),
            _ => Err(DecodeError::NotAnObject { entity }),
        }
    }

    fn present(&self, key: &'static str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn missing(&self, field: &'static str) -> DecodeError {
        DecodeError::MissingField {
            entity: self.entity,
            field,
        }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DecodeError {
        DecodeError::InvalidField {
            entity: self.entity,
            field,
            reason: reason.into(),
        }
    }

    fn ignore(&self, field: &'static str, value: &Value, reason: &str) {
        tracing::warn!(
            entity = self.entity,
            field = field,
            value = %preview(value),
            reason = reason,
            "Ignoring malformed optional field"
        );
    }

    // ------------------------------------------------------------------------
    // Required
    // ------------------------------------------------------------------------

    pub(crate) fn required(&self, key: &'static str) -> Result<&'a Value, DecodeError> {
        self.present(key).ok_or_else(|| self.missing(key))
    }

    pub(crate) fn required_str(&self, key: &'static str) -> Result<&'a str, DecodeError> {
        self.required(key)?
            .as_str()
            .ok_or_else(|| self.invalid(key, "expected a string"))
    }

    /// A string, or a number coerced to its decimal form.
    pub(crate) fn required_id(&self, key: &'static str) -> Result<String, DecodeError> {
        match self.required(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(self.invalid(key, "expected a string or number")),
        }
    }

    pub(crate) fn required_url(&self, key: &'static str) -> Result<Url, DecodeError> {
        let raw = self.required_str(key)?;
        Url::parse(raw).map_err(|e| self.invalid(key, e.to_string()))
    }

    pub(crate) fn required_array(&self, key: &'static str) -> Result<&'a [Value], DecodeError> {
        self.required(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.invalid(key, "expected an array"))
    }

    // ------------------------------------------------------------------------
    // Optional, strict once present
    // ------------------------------------------------------------------------

    /// Nested entity lists (`hubs`, `attachments`) default to empty when
    /// absent but must be arrays when present.
    pub(crate) fn optional_array(&self, key: &'static str) -> Result<&'a [Value], DecodeError> {
        match self.present(key) {
            None => Ok(&[]),
            Some(value) => value
                .as_array()
                .map(Vec::as_slice)
                .ok_or_else(|| self.invalid(key, "expected an array")),
        }
    }

    pub(crate) fn optional_value(&self, key: &'static str) -> Option<&'a Value> {
        self.present(key)
    }

    // ------------------------------------------------------------------------
    // Optional, lenient
    // ------------------------------------------------------------------------

    pub(crate) fn optional_string(&self, key: &'static str) -> Option<String> {
        let value = self.present(key)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.ignore(key, value, "expected a string");
                None
            }
        }
    }

    pub(crate) fn optional_url(&self, key: &'static str) -> Option<Url> {
        let value = self.present(key)?;
        let Some(raw) = value.as_str() else {
            self.ignore(key, value, "expected a string");
            return None;
        };
        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                self.ignore(key, value, &e.to_string());
                None
            }
        }
    }

    pub(crate) fn optional_bool(&self, key: &'static str) -> Option<bool> {
        let value = self.present(key)?;
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => {
                self.ignore(key, value, "expected a boolean");
                None
            }
        }
    }

    /// A non-negative whole number. Non-negative floats are truncated and
    /// numeric strings are parsed.
    pub(crate) fn optional_count(&self, key: &'static str) -> Option<u64> {
        let value = self.present(key)?;
        let count = match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f.trunc() as u64)
            }),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if count.is_none() {
            self.ignore(key, value, "expected a non-negative integer");
        }
        count
    }

    pub(crate) fn optional_date(&self, key: &'static str) -> Option<DateTime<Utc>> {
        let value = self.present(key)?;
        let parsed = value.as_str().and_then(parse_date);
        if parsed.is_none() {
            self.ignore(key, value, "expected an RFC 3339 timestamp");
        }
        parsed
    }

    /// A list of strings. Non-string elements are dropped; a value that is
    /// not an array yields an empty list.
    pub(crate) fn optional_strings(&self, key: &'static str) -> Vec<String> {
        let Some(value) = self.present(key) else {
            return Vec::new();
        };
        let Some(elements) = value.as_array() else {
            self.ignore(key, value, "expected an array of strings");
            return Vec::new();
        };
        elements
            .iter()
            .filter_map(|element| match element.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    self.ignore(key, element, "expected a string element");
                    None
                }
            })
            .collect()
    }
}

/// Longest rendering of a rejected value that goes into a log line.
const PREVIEW_CHARS: usize = 100;

fn preview(value: &Value) -> String {
    let rendered = value.to_string();
    match rendered.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &rendered[..cut]),
        None => rendered,
    }
}
