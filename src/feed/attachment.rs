use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use super::codec::MimeType;
use super::error::DecodeError;
use super::fields::Fields;

/// A related resource for an item, typically a podcast episode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Attachment {
    pub url: Url,
    pub mime_type: MimeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_seconds: Option<u64>,
}

impl Attachment {
    pub fn new(url: Url, mime_type: MimeType) -> Self {
        Self {
            url,
            mime_type,
            title: None,
            size_in_bytes: None,
            duration_in_seconds: None,
        }
    }

    /// # Errors
    ///
    /// Fails on a missing or malformed `url` or `mime_type`, and on a mime
    /// type outside [`MimeType`].
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("attachment", value)?;
        Ok(Self {
            url: fields.required_url("url")?,
            mime_type: fields.required_str("mime_type")?.parse()?,
            title: fields.optional_string("title"),
            size_in_bytes: fields.optional_count("size_in_bytes"),
            duration_in_seconds: fields.optional_count("duration_in_seconds"),
        })
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Title: {}", self.title.as_deref().unwrap_or("Not Provided"))?;
        writeln!(f, "Size in Bytes: {}", self.size_in_bytes.unwrap_or(0))?;
        write!(
            f,
            "Duration in seconds: {}",
            self.duration_in_seconds.unwrap_or(0)
        )
    }
}

/// Renders each attachment's description, separated by `separator`.
pub fn join_attachments(attachments: &[Attachment], separator: &str) -> String {
    attachments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
