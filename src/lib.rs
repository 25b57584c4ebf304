#![forbid(unsafe_code)]
//! Email deliverability verification (syntax, MX, SMTP probe, catch-all)
//! and bounded-concurrency bulk verification.

pub mod bulk;
pub mod classify;
pub mod mx;
pub mod smtp;
pub mod validator;
pub mod verify;

pub use bulk::{BulkProgress, BulkSummary, bulk_verify, bulk_verify_with_progress};
pub use classify::{is_disposable_domain, is_role_account};
pub use mx::{LookupMx, MxError, MxRecord, MxStatus, SystemResolver, check_mx};
pub use smtp::{ConnectProbe, ProbeError, RecipientProbe, SmtpProbe, SmtpProbeOptions, SmtpReply};
pub use validator::{AddressParts, is_valid_syntax, parse_address};
pub use verify::{VerificationResult, VerificationStatus, Verifier, VerifierOptions, Verify};
