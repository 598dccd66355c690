/// RFC 5322 `atext`: ASCII alphanumerics plus the printable specials.
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// Dot-atom: `atext` runs separated by single dots, no leading/trailing dot.
pub(crate) fn is_local_strict(s: &str) -> bool {
    !s.is_empty()
        && s.split('.')
            .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

/// Also accepts a quoted string of printable ASCII where `"` and `\` only
/// appear escaped.
pub(crate) fn is_local_relaxed(s: &str) -> bool {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        is_quoted_content(&s[1..s.len() - 1])
    } else {
        is_local_strict(s)
    }
}

fn is_quoted_content(inner: &str) -> bool {
    let mut escaped = false;
    for c in inner.chars() {
        if !(c == ' ' || c.is_ascii_graphic()) {
            return false;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return false;
        }
    }
    !escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn strict_dots() {
        assert!(!is_local_strict(".abc"));
        assert!(!is_local_strict("abc."));
        assert!(!is_local_strict("a..b"));
        assert!(is_local_strict("a.b"));
    }

    #[test]
    fn strict_specials() {
        assert!(is_local_strict("first.last+tag"));
        assert!(is_local_strict("o'brien"));
        assert!(!is_local_strict("a b"));
        assert!(!is_local_strict("a(b)"));
    }

    #[test]
    fn relaxed_quoted() {
        assert!(is_local_relaxed("\"a b\""));
        assert!(is_local_relaxed("\"a\\\"b\""));
        assert!(!is_local_relaxed("\"a\"b\""));
        assert!(!is_local_relaxed("\"a\\\""));
    }
}
