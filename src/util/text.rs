use std::borrow::Cow;

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// User-entered text (comments, tag labels, objective edits) ends up rendered
/// in a terminal, so anything that could manipulate terminal state is removed:
///
/// - C0 control characters except tab, newline, and carriage return
/// - DEL (0x7f)
/// - CSI sequences (`ESC [` through the final byte)
/// - OSC sequences (`ESC ]` through BEL or `ESC \`)
/// - bare ESC bytes
///
/// Returns `Cow::Borrowed` when the input is already clean (the common case).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.peek() {
                Some('[') => {
                    // CSI: consume until a final byte in 0x40..=0x7e
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    // OSC: consume until BEL or the ST terminator (ESC \)
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{07}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {} // bare ESC, dropped
            }
        } else if !is_stripped(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c == '\u{7f}' || (c.is_control() && c != '\t' && c != '\n' && c != '\r')
}

/// Sanitize user-entered text: strip control characters, trim whitespace.
///
/// Returns `None` when nothing displayable remains, so callers can reject
/// empty or escape-only input with a single match.
pub fn clean_user_text(s: &str) -> Option<String> {
    let stripped = strip_control_chars(s);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        let input = "Reviewed the worked example twice.";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn preserves_tabs_and_newlines() {
        let input = "line one\n\tindented\r\nline two";
        assert_eq!(strip_control_chars(input), input);
    }

    #[test]
    fn drops_c0_controls_and_del() {
        let input = "no\x00te\x07 wi\x08th ju\x7fnk";
        assert_eq!(strip_control_chars(input), "note with junk");
    }

    #[test]
    fn drops_csi_sequences() {
        let input = "\x1b[31mred\x1b[0m plain";
        assert_eq!(strip_control_chars(input), "red plain");
    }

    #[test]
    fn drops_osc_sequences() {
        assert_eq!(strip_control_chars("\x1b]0;title\x07after"), "after");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\after"), "after");
    }

    #[test]
    fn drops_bare_esc() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
    }

    #[test]
    fn unicode_passes_through() {
        let input = "復習した \x1b[1m大事\x1b[0m ✅";
        assert_eq!(strip_control_chars(input), "復習した 大事 ✅");
    }

    #[test]
    fn clean_user_text_trims() {
        assert_eq!(clean_user_text("  padded  "), Some("padded".to_owned()));
    }

    #[test]
    fn clean_user_text_rejects_empty() {
        assert_eq!(clean_user_text(""), None);
        assert_eq!(clean_user_text("   "), None);
        assert_eq!(clean_user_text("\x1b[31m\x1b[0m"), None);
    }
}
