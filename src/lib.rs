#![forbid(unsafe_code)]
//! mailverify_lib: email address verification covering syntax, disposable providers,
//! MX records and an optional SMTP reachability probe.

pub mod api;
pub mod config;
pub mod disposable;
pub mod dns;
pub mod engine;
pub mod error;
pub mod smtp_verify;
pub mod validator;

pub use config::{Config, ConfigError};
pub use disposable::{
    ClassificationSource, ClassifierOptions, DisposableClassifier, FailurePolicy, StaticDenylist,
};
pub use dns::{MailDns, MxRecord, MxStatus};
pub use engine::{EnabledChecks, EngineBuilder, VerificationEngine, VerificationErrors, VerificationResult};
pub use error::{Error, Result};
pub use smtp_verify::{MailServerProber, ProbeOptions};
pub use validator::{
    NormalizedEmail, ValidationMode, ValidationReport, domain_of, is_valid_email, normalize_email,
    validate_email,
};
