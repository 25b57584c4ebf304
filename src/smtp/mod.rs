//! SMTP recipient-acceptance probing.
//!
//! A probe session connects to one mail-exchange host, announces itself,
//! sets an envelope sender and then only ever asks `RCPT TO` questions.
//! Message content is never transmitted.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::ProbeError;
pub use options::{DEFAULT_MAIL_FROM, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT, SmtpProbeOptions};
pub use probe::{ConnectProbe, RecipientProbe, SmtpProbe};
pub use session::ProbeSession;
pub use types::{SmtpReply, Stage};
