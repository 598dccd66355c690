/// Checks the domain part: IDNA conversion, label rules and a usable top-level label.
/// Every violated rule is pushed to `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    if domain.is_empty() {
        reasons.push("domain is empty".to_string());
        return;
    }

    let domain_ascii = match idna::domain_to_ascii(domain) {
        Ok(d) => d,
        Err(_) => {
            reasons.push("domain punycode conversion failed".to_string());
            return;
        }
    };

    if domain_ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return;
    }

    if domain_ascii.len() > 253 {
        reasons.push(format!("domain length {} > 253", domain_ascii.len()));
    }

    if !domain_ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in domain_ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{}' length {} > 63",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    if let Some(tld) = domain_ascii.rsplit('.').next() {
        if domain_ascii.contains('.') && !tld.is_empty() {
            if tld.len() < 2 {
                reasons.push(format!("top-level label '{tld}' is too short"));
            }
            if tld.chars().all(|c| c.is_ascii_digit()) {
                reasons.push(format!("top-level label '{tld}' cannot be numeric"));
            }
        }
    }
}

/// Lowercased domain plus its ASCII (punycode) form. The ASCII form is empty
/// when IDNA conversion fails.
pub(crate) fn normalize_domain(domain: &str) -> (String, String) {
    let lower = domain.trim().to_lowercase();
    let ascii = idna::domain_to_ascii(&lower).unwrap_or_default();
    (lower, ascii)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn basic_domain_ok() {
        let mut reasons = vec![];
        check_domain("example.com", &mut reasons);
        assert!(reasons.is_empty(), "{:?}", reasons);
    }

    #[test]
    fn label_too_long() {
        let long = "a".repeat(64);
        let mut reasons = vec![];
        check_domain(&format!("{}.com", long), &mut reasons);
        assert!(!reasons.is_empty());
    }

    #[test]
    fn rejects_numeric_and_single_char_tld() {
        let mut reasons = vec![];
        check_domain("example.123", &mut reasons);
        assert!(reasons.iter().any(|r| r.contains("numeric")));

        let mut reasons = vec![];
        check_domain("example.c", &mut reasons);
        assert!(reasons.iter().any(|r| r.contains("too short")));
    }

    #[test]
    fn rejects_underscore() {
        let mut reasons = vec![];
        check_domain("ex_ample.com", &mut reasons);
        assert!(!reasons.is_empty());
    }

    #[test]
    fn normalize_lowercases_and_punycodes() {
        let (lower, ascii) = normalize_domain("ExÄmple.COM");
        assert_eq!(lower, "exämple.com");
        assert_eq!(ascii, "xn--exmple-cua.com");
    }
}
