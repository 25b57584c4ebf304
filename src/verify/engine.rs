use std::thread;

use rand::Rng;
use tracing::{debug, warn};

use crate::classify::{is_disposable_domain, is_role_account};
use crate::mx::{LookupMx, MxError, SystemResolver, resolve_with};
use crate::smtp::{ConnectProbe, ProbeError, RecipientProbe, SmtpProbe};
use crate::validator::{AddressParts, parse_address};

use super::options::VerifierOptions;
use super::types::{
    REASON_CATCH_ALL, REASON_CONFIRMED, REASON_INVALID_SYNTAX, REASON_NO_MX, VerificationResult,
    VerificationStatus as Status,
};

const DECOY_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Anything that turns one address into a [`VerificationResult`].
pub trait Verify {
    /// Never fails: every failure mode is folded into `status` and `reason`.
    fn verify(&self, email: &str) -> VerificationResult;
}

/// Syntax → classification → MX → SMTP probe (with retry) → catch-all pipeline.
#[derive(Debug, Clone)]
pub struct Verifier<R, C> {
    resolver: R,
    connector: C,
    options: VerifierOptions,
}

impl Verifier<SystemResolver, SmtpProbe> {
    /// Verifier backed by the system DNS configuration and real SMTP sessions.
    pub fn system(options: VerifierOptions) -> Result<Self, MxError> {
        let resolver = SystemResolver::new(options.smtp.timeout)?;
        let connector = SmtpProbe::new(options.smtp.clone());
        Ok(Self::new(resolver, connector, options))
    }
}

impl<R, C> Verifier<R, C>
where
    R: LookupMx,
    C: ConnectProbe,
{
    pub fn new(resolver: R, connector: C, options: VerifierOptions) -> Self {
        Self {
            resolver,
            connector,
            options,
        }
    }

    pub fn verify(&self, email: &str) -> VerificationResult {
        let email = email.trim();
        let Some(parts) = parse_address(email) else {
            debug!(email, "syntax check failed");
            return VerificationResult::new(email, Status::Invalid, REASON_INVALID_SYNTAX);
        };

        let (status, reason) = self.probe_address(&parts);
        debug!(email, %status, reason = reason.as_str(), "verification finished");
        VerificationResult {
            email: email.to_string(),
            status,
            reason,
            is_disposable: is_disposable_domain(&parts.domain),
            is_role_account: is_role_account(&parts.local),
        }
    }

    fn probe_address(&self, parts: &AddressParts) -> (Status, String) {
        let mx = match resolve_with(&self.resolver, &parts.domain) {
            Ok(mx) => mx,
            Err(err) => {
                warn!(domain = parts.domain.as_str(), error = %err, "MX lookup failed");
                return (Status::Invalid, format!("{REASON_NO_MX} (lookup failed: {err})"));
            }
        };
        let Some(primary) = mx.primary() else {
            return (Status::Invalid, REASON_NO_MX.to_string());
        };
        debug!(
            domain = parts.domain.as_str(),
            exchange = primary.exchange.as_str(),
            preference = primary.preference,
            "probing primary exchange"
        );
        self.probe_with_retry(&primary.exchange, parts)
    }

    fn probe_with_retry(&self, host: &str, parts: &AddressParts) -> (Status, String) {
        let max_attempts = self.options.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match self.probe_once(host, parts) {
                Ok(outcome) => return outcome,
                Err(err) => err,
            };
            if !err.is_retryable() {
                return (Status::Unknown, format!("SMTP connection failed: {err}"));
            }
            if attempt >= max_attempts {
                return (
                    Status::Unknown,
                    format!("SMTP connection failed after {attempt} attempts: {err}"),
                );
            }
            let delay = self.options.backoff_after(attempt);
            warn!(host, attempt, ?delay, error = %err, "transient network failure, retrying");
            thread::sleep(delay);
            attempt += 1;
        }
    }

    fn probe_once(&self, host: &str, parts: &AddressParts) -> Result<(Status, String), ProbeError> {
        let mut session = self.connector.connect(host)?;

        let reply = session.check_recipient(&parts.address())?;
        if reply.is_permanent_failure() {
            return Ok((
                Status::Invalid,
                format!("SMTP rejected address: {}", reply.message),
            ));
        }
        if !reply.is_positive_completion() {
            return Ok((
                Status::Unknown,
                format!("SMTP Error (Code: {}): {}", reply.code, reply.message),
            ));
        }

        let decoy = decoy_local_part(&parts.local, self.options.catch_all_local_len);
        let decoy_reply = session.check_recipient(&format!("{decoy}@{}", parts.domain))?;
        if decoy_reply.is_positive_completion() {
            Ok((Status::CatchAll, REASON_CATCH_ALL.to_string()))
        } else {
            Ok((Status::Valid, REASON_CONFIRMED.to_string()))
        }
    }
}

impl<R, C> Verify for Verifier<R, C>
where
    R: LookupMx,
    C: ConnectProbe,
{
    fn verify(&self, email: &str) -> VerificationResult {
        Verifier::verify(self, email)
    }
}

/// Random lower-case alphanumeric local part that differs from `local`.
pub(crate) fn decoy_local_part(local: &str, len: usize) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate: String = (0..len.clamp(8, 64))
            .map(|_| DECOY_CHARSET[rng.gen_range(0..DECOY_CHARSET.len())] as char)
            .collect();
        if !candidate.eq_ignore_ascii_case(local) {
            return candidate;
        }
    }
}
