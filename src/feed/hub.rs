use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use super::error::DecodeError;
use super::fields::Fields;

/// A real-time notification endpoint (for example WebSub) for a feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hub {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Url,
}

impl Hub {
    pub fn new(kind: impl Into<String>, url: Url) -> Self {
        Self {
            kind: kind.into(),
            url,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("hub", value)?;
        Ok(Self {
            kind: fields.required_str("type")?.to_string(),
            url: fields.required_url("url")?,
        })
    }
}

impl<'de> Deserialize<'de> for Hub {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
