//! HTML escaping for text content and attribute values.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Escape `&`, `<`, `>` and `"` so the text can be emitted as element content
/// or inside a double-quoted attribute value.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Display text for an autolinked URL: percent-decoded when the result is valid UTF-8,
/// otherwise the URL as written.
pub fn url_display_text(url: &str) -> Cow<'_, str> {
    match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_url_display_text() {
        assert_eq!(url_display_text("http://example.com/a%20b"), "http://example.com/a b");
        assert_eq!(url_display_text("http://example.com/%ff"), "http://example.com/%ff");
    }
}
