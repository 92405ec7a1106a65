//! Helpers shared by the feed model and the command-line front end.
//!
//! - **Markup stripping**: derives plain text from `content_html`
//! - **URL validation**: decides which remote documents may be fetched

mod text;
mod url_validator;

pub use text::strip_html;
pub use url_validator::{validate_fetch_url, UrlValidationError};
