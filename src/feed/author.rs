use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use super::error::{ConstructionError, DecodeError};
use super::fields::Fields;

/// The person or organization behind a feed or item.
///
/// At least one of `name`, `url` and `avatar` is always present, so an
/// author never serializes as an empty object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Author {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<Url>,
}

impl Author {
    /// # Errors
    ///
    /// [`ConstructionError::EmptyAuthor`] when all three fields are `None`.
    pub fn new(
        name: Option<String>,
        url: Option<Url>,
        avatar: Option<Url>,
    ) -> Result<Self, ConstructionError> {
        if name.is_none() && url.is_none() && avatar.is_none() {
            return Err(ConstructionError::EmptyAuthor);
        }
        Ok(Self { name, url, avatar })
    }

    /// An author known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: None,
            avatar: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The author's website.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn avatar(&self) -> Option<&Url> {
        self.avatar.as_ref()
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("author", value)?;
        let author = Self::new(
            fields.optional_string("name"),
            fields.optional_url("url"),
            fields.optional_url("avatar"),
        )?;
        Ok(author)
    }
}

impl<'de> Deserialize<'de> for Author {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name().unwrap_or("Not Provided"))?;
        writeln!(
            f,
            "Website: {}",
            self.url().map_or("Not Provided", Url::as_str)
        )?;
        write!(
            f,
            "Avatar URL: {}",
            self.avatar().map_or("Not Provided", Url::as_str)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_empty_author_not_constructible() {
        assert_eq!(
            Author::new(None, None, None),
            Err(ConstructionError::EmptyAuthor)
        );
    }

    #[test]
    fn test_any_single_field_is_enough() {
        assert!(Author::new(Some("Ann".into()), None, None).is_ok());
        assert!(Author::new(None, Some(url("https://ann.example/")), None).is_ok());
        assert!(Author::new(None, None, Some(url("https://ann.example/a.png"))).is_ok());
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let author = Author::named("Ann");
        assert_eq!(serde_json::to_value(&author).unwrap(), json!({ "name": "Ann" }));
    }

    #[test]
    fn test_encode_all_fields() {
        let author = Author::new(
            Some("Ann".into()),
            Some(url("https://ann.example/")),
            Some(url("https://ann.example/a.png")),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&author).unwrap(),
            json!({
                "name": "Ann",
                "url": "https://ann.example/",
                "avatar": "https://ann.example/a.png"
            })
        );
    }

    #[test]
    fn test_decode_partial() {
        let author = Author::from_value(&json!({ "url": "https://ann.example/" })).unwrap();
        assert_eq!(author.name(), None);
        assert_eq!(author.url().map(Url::as_str), Some("https://ann.example/"));
        assert_eq!(author.avatar(), None);
    }

    #[test]
    fn test_decode_empty_object_fails() {
        let err = Author::from_value(&json!({})).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Construction(ConstructionError::EmptyAuthor)
        ));
    }

    #[test]
    fn test_decode_only_malformed_fields_fails() {
        // Malformed optional fields fall away, leaving nothing.
        let err = Author::from_value(&json!({ "name": 12, "url": "nope" })).unwrap_err();
        assert!(matches!(err, DecodeError::Construction(_)));
    }

    #[test]
    fn test_serde_deserialize_delegates() {
        let author: Author = serde_json::from_str(r#"{"name":"Ann","extra":1}"#).unwrap();
        assert_eq!(author, Author::named("Ann"));
        assert!(serde_json::from_str::<Author>("{}").is_err());
    }

    #[test]
    fn test_display_placeholders() {
        let author = Author::named("Ann");
        assert_eq!(
            author.to_string(),
            "Name: Ann\nWebsite: Not Provided\nAvatar URL: Not Provided"
        );
    }
}
