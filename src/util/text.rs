use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    // A literal pattern; compilation cannot fail.
    TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("static tag pattern"))
}

/// Removes markup tags from an HTML fragment.
///
/// Every substring matching `<[^>]+>` is dropped. Entity references such as
/// `&amp;` and all text between tags are left exactly as they are, so the
/// result is not HTML-decoded. A `<` with no later `>`, or an empty `<>`,
/// is not a tag and survives.
///
/// Returns `Cow::Borrowed` when the input contains no tags.
///
/// # Examples
///
/// ```
/// use jsonfeed::util::strip_html;
///
/// assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
/// assert_eq!(strip_html("Fish &amp; chips"), "Fish &amp; chips");
/// ```
pub fn strip_html(html: &str) -> Cow<'_, str> {
    if !html.contains('<') {
        return Cow::Borrowed(html);
    }
    tag_pattern().replace_all(html, "")
}
