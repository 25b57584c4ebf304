//! DNS MX resolution.
//!
//! The public entry point is [`check_mx`], which performs a blocking lookup
//! using the system resolver and returns a [`MxStatus`] describing the outcome.
//! [`resolve_with`] accepts any [`LookupMx`] implementation.

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{DEFAULT_DNS_TIMEOUT, LookupMx, SystemResolver, check_mx, resolve_with};
pub use types::{MxRecord, MxStatus};
