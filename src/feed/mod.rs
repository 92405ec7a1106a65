//! The JSON Feed model and its wire mapping.
//!
//! Decoding is lenient and encoding is minimal:
//!
//! - Missing optional fields take their defaults; malformed optional scalars
//!   are dropped with a warning instead of failing the document
//! - Missing required fields, unknown attachment mime types and any failing
//!   item fail the whole document
//! - Encoding leaves out absent optionals, empty `tags`/`attachments`/`hubs`
//!   and `expired: false`, and always writes a freshly derived
//!   `content_text` for each item
//!
//! # Architecture
//!
//! - [`codec`] - timestamp and mime-type codecs
//! - `author`, `hub`, `attachment`, `item`, `model` - the entities
//! - [`document`] - bytes in and out, local files
//! - [`fetcher`] - remote documents over HTTP
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use jsonfeed::feed::{document, Author, Feed, Item};
//!
//! let mut feed = Feed::new("My Example Feed", Author::named("Ann")).unwrap();
//! feed.items.push(Item::new("1", "<p>Hello <b>World</b></p>", Utc::now()));
//!
//! let bytes = document::encode(&feed).unwrap();
//! let decoded = document::decode(&bytes).unwrap();
//! assert_eq!(decoded, feed);
//! ```

pub mod attachment;
mod author;
pub mod codec;
pub mod document;
mod error;
pub mod fetcher;
mod fields;
mod hub;
mod item;
mod model;

pub use attachment::{join_attachments, Attachment};
pub use author::Author;
pub use codec::MimeType;
pub use document::{LoadError, SaveError};
pub use error::{ConstructionError, DecodeError};
pub use fetcher::{FetchConfig, FetchError};
pub use hub::Hub;
pub use item::Item;
pub use model::{Feed, Version};
