//! Read and write [JSON Feed](https://jsonfeed.org/version/1) documents.
//!
//! Third-party feeds are decoded leniently: absent or malformed optional
//! data falls back to defaults, and only broken required data rejects a
//! document. Feeds built in code are encoded minimally, without `null`s or
//! empty placeholders.

pub mod config;
pub mod feed;
pub mod util;

pub use feed::{
    Attachment, Author, ConstructionError, DecodeError, Feed, Hub, Item, LoadError, MimeType,
    Version,
};
