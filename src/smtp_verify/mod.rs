//! Optional SMTP reachability probe.
//!
//! [`MailServerProber`] connects to the primary MX host of a domain and runs a
//! greeting exchange without sending mail. The transport is behind
//! [`SmtpConnector`] so the dialogue can be exercised without a network.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::ProbeError;
pub use options::ProbeOptions;
pub use probe::MailServerProber;
pub use session::{SmtpConnector, SmtpStream, TcpConnector};
pub use types::{ProbeReport, ProbeStage, SmtpReply};
