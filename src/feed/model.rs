use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use url::Url;

use super::author::Author;
use super::error::{ConstructionError, DecodeError};
use super::fields::Fields;
use super::hub::Hub;
use super::item::Item;

/// The JSON Feed schema versions this crate reads and writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Version {
    #[default]
    V1,
}

impl Version {
    pub fn as_str(self) -> &'static str {
        match self {
            Version::V1 => "https://jsonfeed.org/version/1",
        }
    }
}

impl FromStr for Version {
    type Err = DecodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "https://jsonfeed.org/version/1" => Ok(Version::V1),
            other => Err(DecodeError::UnsupportedVersion(other.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A JSON Feed document: publication metadata plus its items.
///
/// The title is never empty. It is set through [`Feed::new`] or
/// [`Feed::set_title`], both of which check it; every other field is
/// plain data the caller may change freely.
///
/// Encoding is minimal: absent optional fields, `expired: false` and an
/// empty hub list are left out of the output. `items` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub version: Version,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<Url>,
    #[serde(rename = "icon", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<Url>,
    #[serde(rename = "favicon", skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<Url>,
    pub author: Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub expired: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hubs: Vec<Hub>,
    pub items: Vec<Item>,
}

impl Feed {
    /// # Errors
    ///
    /// [`ConstructionError::EmptyTitle`] when `title` is empty.
    pub fn new(title: impl Into<String>, author: Author) -> Result<Self, ConstructionError> {
        let title = title.into();
        if title.is_empty() {
            return Err(ConstructionError::EmptyTitle);
        }
        Ok(Self {
            version: Version::V1,
            title,
            home_page_url: None,
            feed_url: None,
            icon_url: None,
            favicon_url: None,
            author,
            description: None,
            user_comment: None,
            expired: false,
            hubs: Vec::new(),
            items: Vec::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// # Errors
    ///
    /// [`ConstructionError::EmptyTitle`] when `title` is empty; the current
    /// title is kept.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ConstructionError> {
        let title = title.into();
        if title.is_empty() {
            return Err(ConstructionError::EmptyTitle);
        }
        self.title = title;
        Ok(())
    }

    /// Looks an item up by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Decodes a feed object.
    ///
    /// All-or-nothing: the first item that fails to decode fails the whole
    /// feed, and the error names its index.
    ///
    /// # Errors
    ///
    /// Fails on a missing or unsupported `version`, a missing or empty
    /// `title`, a missing or invalid `author`, a missing `items` array, a
    /// malformed hub, or any item failure.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("feed", value)?;

        let version: Version = fields.required_str("version")?.parse()?;
        let title = fields.required_str("title")?;
        let author = Author::from_value(fields.required("author")?)?;

        let hubs = fields
            .optional_array("hubs")?
            .iter()
            .enumerate()
            .map(|(index, element)| Hub::from_value(element).map_err(|e| e.in_element("hubs", index)))
            .collect::<Result<Vec<_>, _>>()?;

        let items = fields
            .required_array("items")?
            .iter()
            .enumerate()
            .map(|(index, element)| Item::from_value(element).map_err(|e| e.in_element("items", index)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut feed = Self::new(title, author)?;
        feed.version = version;
        feed.home_page_url = fields.optional_url("home_page_url");
        feed.feed_url = fields.optional_url("feed_url");
        feed.icon_url = fields.optional_url("icon");
        feed.favicon_url = fields.optional_url("favicon");
        feed.description = fields.optional_string("description");
        feed.user_comment = fields.optional_string("user_comment");
        feed.expired = fields.optional_bool("expired").unwrap_or(false);
        feed.hubs = hubs;
        feed.items = items;
        Ok(feed)
    }
}

impl<'de> Deserialize<'de> for Feed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
