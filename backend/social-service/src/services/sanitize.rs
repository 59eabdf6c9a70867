use once_cell::sync::Lazy;
use regex::Regex;

// A `<` followed by a letter, `/`, `!` or `?` opens a tag; an unterminated
// tag runs to the end of the input.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[a-zA-Z/!?][^>]*>?").expect("Invalid tag regex"));

/// Remove HTML tags, keeping their text content
pub fn strip_tags(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}
