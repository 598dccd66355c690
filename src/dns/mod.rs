//! MX and A record resolution for the verification engine.
//!
//! [`MailResolver`] is the raw lookup seam ([`SystemResolver`] talks to real DNS);
//! [`MailDns`] adds the timeout and the fail-closed policy on top of it.

mod adapter;
mod error;
mod resolver;
mod types;

pub use adapter::MailDns;
pub use error::DnsError;
pub use resolver::{MailResolver, SystemResolver};
pub use types::{LookupFailure, MxRecord, MxStatus};
