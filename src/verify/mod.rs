//! Single-address verification engine.
//!
//! [`Verifier::verify`] runs, in order and stopping at the first verdict:
//! syntax check, disposable/role classification, MX resolution, an SMTP
//! `RCPT TO` probe against the highest-priority exchange (retried only on
//! local resource exhaustion) and catch-all detection with a random local
//! part on the same session.

mod engine;
mod options;
mod types;

pub use engine::{Verifier, Verify};
pub use options::{DEFAULT_CATCH_ALL_LOCAL_LEN, DEFAULT_MAX_ATTEMPTS, VerifierOptions};
pub use types::{VerificationResult, VerificationStatus};

#[cfg(test)]
mod tests;
