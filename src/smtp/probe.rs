use super::error::ProbeError;
use super::options::SmtpProbeOptions;
use super::session::ProbeSession;
use super::types::SmtpReply;

/// Opens probe sessions against a mail-exchange host.
pub trait ConnectProbe {
    type Session: RecipientProbe;

    /// Connects to `host` and completes the handshake up to `MAIL FROM`.
    fn connect(&self, host: &str) -> Result<Self::Session, ProbeError>;
}

/// The only operation an open probe session exposes.
pub trait RecipientProbe {
    fn check_recipient(&mut self, address: &str) -> Result<SmtpReply, ProbeError>;
}

/// Network-backed [`ConnectProbe`] speaking plain SMTP over TCP.
#[derive(Debug, Clone, Default)]
pub struct SmtpProbe {
    options: SmtpProbeOptions,
}

impl SmtpProbe {
    pub fn new(options: SmtpProbeOptions) -> Self {
        Self { options }
    }
}

impl ConnectProbe for SmtpProbe {
    type Session = ProbeSession;

    fn connect(&self, host: &str) -> Result<ProbeSession, ProbeError> {
        ProbeSession::open(host, &self.options)
    }
}

impl RecipientProbe for ProbeSession {
    fn check_recipient(&mut self, address: &str) -> Result<SmtpReply, ProbeError> {
        ProbeSession::check_recipient(self, address)
    }
}
