//! Address syntax checks. Pure functions, no I/O.

mod domain;
mod local;
mod types;

pub use types::{NormalizedEmail, ValidationMode, ValidationReport};

use domain::{check_domain, normalize_domain};
use local::{is_local_relaxed, is_local_strict};

/// Gate used by the verification engine: strict rules, `true` when no rule is violated.
pub fn is_valid_email(email: &str) -> bool {
    validate_email(email, ValidationMode::Strict).ok
}

/// Validates `email` and lists every violated rule. Never fails; malformed
/// input simply produces `ok == false`.
pub fn validate_email(email: &str, mode: ValidationMode) -> ValidationReport {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let Some((local, domain)) = split_address(input) else {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport { ok: false, reasons };
    };

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }

    check_domain(domain, &mut reasons);

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local.is_empty() && !local_ok {
        reasons.push(match mode {
            ValidationMode::Strict => "invalid local part (strict rules)".into(),
            ValidationMode::Relaxed => "invalid local part (relaxed rules)".into(),
        });
    }

    ValidationReport {
        ok: reasons.is_empty(),
        reasons,
    }
}

/// Domain rules alone, as applied to the part after `@`.
pub(crate) fn is_valid_domain(domain: &str) -> bool {
    let mut reasons = Vec::new();
    check_domain(domain, &mut reasons);
    reasons.is_empty()
}

/// Validates and returns the parts of the address, domain lowercased and in ASCII form.
pub fn normalize_email(email: &str, mode: ValidationMode) -> NormalizedEmail {
    let input = email.trim();
    let (local, domain) = input.split_once('@').unwrap_or(("", ""));

    let ValidationReport { ok, reasons } = validate_email(email, mode);
    let (domain_lower, ascii_domain) = normalize_domain(domain);

    NormalizedEmail {
        original: email.to_string(),
        local: local.to_string(),
        domain: domain_lower,
        ascii_domain,
        mode,
        valid: ok,
        reasons,
    }
}

/// Lowercased ASCII domain of `email`, the key used for classification and DNS.
/// `None` when there is nothing after the last `@`.
pub fn domain_of(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return None;
    }
    Some(idna::domain_to_ascii(&domain).unwrap_or(domain))
}

/// Splits on the single `@`; `None` when there is none or more than one.
fn split_address(input: &str) -> Option<(&str, &str)> {
    let (local, domain) = input.split_once('@')?;
    if domain.contains('@') {
        return None;
    }
    Some((local, domain))
}
