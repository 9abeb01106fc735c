//! String escaping for quoted SQL literals and JSON payloads

/// Escape a string for use inside a single-quoted SQL literal
///
/// Escapes backslash, both quote characters, NUL, CR, LF and Ctrl-Z the way
/// MySQL's `real_escape_string` does.
pub fn db_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace HTML special characters with their entities
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Prefix quotes, backslashes and NUL with a backslash
pub fn add_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo one level of backslash escaping
///
/// Inverts [`db_escape`]: `\\` becomes `\`, `\0`, `\n`, `\r` and `\Z`
/// become NUL, LF, CR and Ctrl-Z. Any other escaped character loses its
/// backslash and a trailing lone backslash is dropped.
pub fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('Z') => out.push('\x1a'),
            Some(next) => out.push(next),
            None => {}
        }
    }
    out
}

/// Normalize escaping to exactly one level, whatever the input carried
///
/// The result is what [`db_escape`] produces for the unescaped text, so
/// serialized literals pass through unchanged.
pub fn reescape(input: &str) -> String {
    db_escape(&strip_slashes(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_escape() {
        assert_eq!(db_escape("it's"), "it\\'s");
        assert_eq!(db_escape("a\\b"), "a\\\\b");
        assert_eq!(db_escape("line\nbreak"), "line\\nbreak");
        assert_eq!(db_escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(db_escape("plain"), "plain");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_reescape_is_idempotent() {
        let once = reescape("O'Reilly");
        assert_eq!(once, "O\\'Reilly");
        assert_eq!(reescape(&once), once);

        let backslash = reescape("C:\\\\temp");
        assert_eq!(backslash, "C:\\\\temp");
        assert_eq!(reescape(&backslash), backslash);
    }

    #[test]
    fn test_add_slashes() {
        assert_eq!(add_slashes("O'Re\\illy \"x\""), "O\\'Re\\\\illy \\\"x\\\"");
        assert_eq!(add_slashes("a\nb"), "a\nb");
    }

    #[test]
    fn test_strip_slashes_edge_cases() {
        assert_eq!(strip_slashes("trailing\\"), "trailing");
        assert_eq!(strip_slashes("nul\\0"), "nul\0");
        assert_eq!(strip_slashes("\\q"), "q");
    }

    #[test]
    fn test_strip_slashes_inverts_db_escape() {
        let raw = "a\nb\r\x1a\0'\"\\c";
        assert_eq!(strip_slashes(&db_escape(raw)), raw);
    }

    #[test]
    fn test_reescape_keeps_control_characters() {
        let escaped = db_escape("line one\nline two\r\n");
        assert_eq!(escaped, "line one\\nline two\\r\\n");
        assert_eq!(reescape(&escaped), escaped);
        assert_eq!(reescape("raw\nbreak"), "raw\\nbreak");
    }
}
