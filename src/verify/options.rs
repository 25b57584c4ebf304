use std::time::Duration;

use crate::smtp::SmtpProbeOptions;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_CATCH_ALL_LOCAL_LEN: usize = 20;

/// Controls how [`Verifier`](super::Verifier) probes an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierOptions {
    pub smtp: SmtpProbeOptions,
    /// Total session attempts when the local host runs out of network resources.
    pub max_attempts: u32,
    /// Delay after attempt `n` is `retry_backoff[n - 1]`; the last entry is
    /// reused for later attempts.
    pub retry_backoff: Vec<Duration>,
    /// Length of the random local part used for catch-all detection.
    pub catch_all_local_len: usize,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            smtp: SmtpProbeOptions::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: vec![Duration::from_secs(5), Duration::from_secs(10)],
            catch_all_local_len: DEFAULT_CATCH_ALL_LOCAL_LEN,
        }
    }
}

impl VerifierOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.smtp.timeout = timeout;
        self
    }

    pub fn with_mail_from(mut self, mail_from: impl Into<String>) -> Self {
        self.smtp.mail_from = mail_from.into();
        self
    }

    pub fn with_helo_domain(mut self, helo: impl Into<String>) -> Self {
        self.smtp.helo_domain = helo.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp.port = port;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Vec<Duration>) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Delay to wait after the 1-based `attempt` failed.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let idx = (attempt.max(1) - 1) as usize;
        self.retry_backoff
            .get(idx)
            .or_else(|| self.retry_backoff.last())
            .copied()
            .unwrap_or_default()
    }
}
