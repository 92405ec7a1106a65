use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use url::Url;

use super::attachment::Attachment;
use super::author::Author;
use super::codec::{serialize_date, serialize_optional_date};
use super::error::DecodeError;
use super::fields::Fields;
use crate::util::strip_html;

/// One entry of a feed.
///
/// Two items are equal when their ids are equal, whatever their content.
/// Compare fields explicitly to detect an edited item.
#[derive(Debug, Clone)]
pub struct Item {
    id: String,
    pub url: Option<Url>,
    pub external_url: Option<Url>,
    pub image: Option<Url>,
    pub banner_image: Option<Url>,
    pub title: Option<String>,
    pub content_html: String,
    pub summary: Option<String>,
    pub date_published: DateTime<Utc>,
    pub date_modified: Option<DateTime<Utc>>,
    pub author: Option<Author>,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        content_html: impl Into<String>,
        date_published: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            url: None,
            external_url: None,
            image: None,
            banner_image: None,
            title: None,
            content_html: content_html.into(),
            summary: None,
            date_published,
            date_modified: None,
            author: None,
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `content_html` with markup removed. Computed on every call.
    pub fn text_content(&self) -> String {
        strip_html(&self.content_html).into_owned()
    }

    /// Decodes one item object.
    ///
    /// A missing or unparsable `date_published` becomes the current time, so
    /// decoding the same malformed document twice yields different instants.
    /// Any `content_text` in the input is ignored.
    ///
    /// # Errors
    ///
    /// Fails when `id` or `content_html` is missing or mistyped, when a
    /// present `author` is not a valid author, or when any attachment fails
    /// to decode.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("item", value)?;

        let id = fields.required_id("id")?;
        let content_html = fields.required_str("content_html")?.to_string();

        // A malformed value is already logged by `optional_date`.
        let date_published = fields.optional_date("date_published").unwrap_or_else(|| {
            if fields.optional_value("date_published").is_none() {
                tracing::warn!(id = %id, "Item has no date_published, using current time");
            }
            Utc::now()
        });

        let author = fields
            .optional_value("author")
            .map(Author::from_value)
            .transpose()?;

        let attachments = fields
            .optional_array("attachments")?
            .iter()
            .enumerate()
            .map(|(index, element)| {
                Attachment::from_value(element).map_err(|e| e.in_element("attachments", index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            url: fields.optional_url("url"),
            external_url: fields.optional_url("external_url"),
            image: fields.optional_url("image"),
            banner_image: fields.optional_url("banner_image"),
            title: fields.optional_string("title"),
            content_html,
            summary: fields.optional_string("summary"),
            date_published,
            date_modified: fields.optional_date("date_modified"),
            author,
            tags: fields.optional_strings("tags"),
            attachments,
        })
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Wire shape of an item, borrowing from it plus the derived text.
#[derive(Serialize)]
struct ItemRecord<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<&'a Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    banner_image: Option<&'a Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    content_html: &'a str,
    content_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(serialize_with = "serialize_date")]
    date_published: DateTime<Utc>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_date"
    )]
    date_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a Author>,
    #[serde(skip_serializing_if = "is_empty")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    attachments: &'a [Attachment],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ItemRecord {
            id: &self.id,
            url: self.url.as_ref(),
            external_url: self.external_url.as_ref(),
            image: self.image.as_ref(),
            banner_image: self.banner_image.as_ref(),
            title: self.title.as_deref(),
            content_html: &self.content_html,
            content_text: self.text_content(),
            summary: self.summary.as_deref(),
            date_published: self.date_published,
            date_modified: self.date_modified,
            author: self.author.as_ref(),
            tags: &self.tags,
            attachments: &self.attachments,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
