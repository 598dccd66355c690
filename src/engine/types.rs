use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

pub const SYNTAX_MESSAGE: &str = "Invalid email syntax";
pub const DISPOSABLE_MESSAGE: &str = "Email is from a disposable email provider";
pub const MX_MESSAGE: &str = "Domain does not have valid MX records";
pub const RECEIVE_MESSAGE: &str = "Mail server did not accept a connection";

/// Outcome of one verification.
///
/// `can_receive_email` and `errors.receive_email` are only serialized when the
/// reachability probe is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_disposable: bool,
    pub has_mx_records: bool,
    pub ip_address: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_receive_email: Option<bool>,
    pub errors: VerificationErrors,
}

/// One message per failed check, `null` when the check passed or did not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationErrors {
    pub syntax: Option<String>,
    pub disposable_email: Option<String>,
    pub mx_records: Option<String>,
    /// Outer `None`: probe disabled, field omitted. `Some(None)`: probe enabled, no error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_email: Option<Option<String>>,
}

impl VerificationResult {
    /// Result for an address that failed the syntax gate; nothing else ran.
    pub fn invalid_syntax(probe_enabled: bool) -> Self {
        Self {
            can_receive_email: probe_enabled.then_some(false),
            errors: VerificationErrors {
                syntax: Some(SYNTAX_MESSAGE.to_string()),
                receive_email: probe_enabled.then_some(None),
                ..VerificationErrors::default()
            },
            ..Self::default()
        }
    }

    pub(crate) fn from_checks(
        is_disposable: bool,
        has_mx_records: bool,
        ip_address: Option<Ipv4Addr>,
        can_receive_email: Option<bool>,
    ) -> Self {
        Self {
            is_disposable,
            has_mx_records,
            ip_address,
            can_receive_email,
            errors: VerificationErrors {
                syntax: None,
                disposable_email: is_disposable.then(|| DISPOSABLE_MESSAGE.to_string()),
                mx_records: (!has_mx_records).then(|| MX_MESSAGE.to_string()),
                receive_email: can_receive_email
                    .map(|reachable| (!reachable).then(|| RECEIVE_MESSAGE.to_string())),
            },
        }
    }

    pub fn has_valid_syntax(&self) -> bool {
        self.errors.syntax.is_none()
    }

    /// No check reported a problem.
    pub fn passed(&self) -> bool {
        let e = &self.errors;
        e.syntax.is_none()
            && e.disposable_email.is_none()
            && e.mx_records.is_none()
            && !matches!(e.receive_email, Some(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn syntax_failure_shape() {
        let value = serde_json::to_value(VerificationResult::invalid_syntax(false)).unwrap();
        assert_eq!(
            value,
            json!({
                "is_disposable": false,
                "has_mx_records": false,
                "ip_address": null,
                "errors": {
                    "syntax": "Invalid email syntax",
                    "disposable_email": null,
                    "mx_records": null
                }
            })
        );
    }

    #[test]
    fn probe_fields_appear_only_when_enabled() {
        let reachable = VerificationResult::from_checks(false, true, None, Some(true));
        let value = serde_json::to_value(&reachable).unwrap();
        assert_eq!(value["can_receive_email"], json!(true));
        assert!(value["errors"]["receive_email"].is_null());
        assert!(value["errors"].as_object().unwrap().contains_key("receive_email"));
        assert!(reachable.passed());

        let unreachable = VerificationResult::from_checks(false, true, None, Some(false));
        assert_eq!(
            unreachable.errors.receive_email,
            Some(Some(RECEIVE_MESSAGE.to_string()))
        );
        assert!(!unreachable.passed());

        let value = serde_json::to_value(VerificationResult::invalid_syntax(true)).unwrap();
        assert_eq!(value["can_receive_email"], json!(false));
        assert!(value["errors"].as_object().unwrap().contains_key("receive_email"));
    }

    #[test]
    fn ip_address_serializes_as_string() {
        let result = VerificationResult::from_checks(
            false,
            true,
            Some(Ipv4Addr::new(203, 0, 113, 7)),
            None,
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ip_address"], json!("203.0.113.7"));
        assert!(value.get("can_receive_email").is_none());
    }
}
