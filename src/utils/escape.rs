/// Escape text for HTML element content and double-quoted attributes, appending into `out`.
/// Returns true if any escape was performed.
#[inline]
pub fn push_escaped_html(input: &str, out: &mut String) -> bool {
    let mut has_escape = false;
    let mut safe_start = 0usize;
    out.reserve(input.len());

    for (i, c) in input.char_indices() {
        let replacement = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#39;",
            _ => continue,
        };
        // flush the run before the special char
        out.push_str(&input[safe_start..i]);
        out.push_str(replacement);
        safe_start = i + c.len_utf8();
        has_escape = true;
    }

    out.push_str(&input[safe_start..]);
    has_escape
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escaped(input: &str) -> String {
        let mut out = String::new();
        push_escaped_html(input, &mut out);
        out
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let mut out = String::new();
        assert!(!push_escaped_html("main.magic (u32)", &mut out));
        assert_eq!(out, "main.magic (u32)");
    }

    #[test]
    fn test_appends_to_existing_text() {
        let mut out = String::from("<b>");
        assert!(push_escaped_html("a&b", &mut out));
        assert_eq!(out, "<b>a&amp;b");
    }

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            escaped(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_keeps_multibyte_chars() {
        assert_eq!(escaped("größe<1>"), "größe&lt;1&gt;");
    }
}
