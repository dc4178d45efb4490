//! HTML escaping for rendered markup.

use std::borrow::Cow;

/// Escape text for use inside an element or a double-quoted attribute.
#[must_use]
pub fn escape(input: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(input)
}

/// Decode entities in text lifted out of authored markup.
///
/// Named, decimal and hexadecimal references are all decoded.
#[must_use]
pub fn unescape(input: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(input)
}
