use std::borrow::Cow;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAIL_FROM: &str = "verifier@example.com";
pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity and network knobs for [`SmtpProbe`](super::SmtpProbe).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    /// Name announced in `EHLO`/`HELO`. Empty means the local host name.
    pub helo_domain: String,
    /// Envelope sender for `MAIL FROM`. Empty means the null sender `<>`.
    pub mail_from: String,
    pub port: u16,
    /// Applied to the TCP connect and to every read and write.
    pub timeout: Duration,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            helo_domain: String::new(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            port: DEFAULT_SMTP_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SmtpProbeOptions {
    pub fn helo_name(&self) -> Cow<'_, str> {
        if self.helo_domain.trim().is_empty() {
            Cow::Owned(local_host_name())
        } else {
            Cow::Borrowed(self.helo_domain.trim())
        }
    }

    pub fn envelope_sender(&self) -> String {
        if self.mail_from.trim().is_empty() {
            "MAIL FROM:<>".to_string()
        } else {
            format!("MAIL FROM:<{}>", self.mail_from.trim())
        }
    }
}

fn local_host_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
