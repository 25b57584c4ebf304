use std::fmt;

pub(crate) const REASON_INVALID_SYNTAX: &str = "Invalid email syntax";
pub(crate) const REASON_NO_MX: &str = "No MX records found for domain";
pub(crate) const REASON_CATCH_ALL: &str = "Domain accepts all emails";
pub(crate) const REASON_CONFIRMED: &str = "SMTP server confirmed address exists";

/// Final classification of one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    /// The mail server accepted the address and rejected a random one.
    Valid,
    /// Bad syntax, no mail route, or an explicit permanent rejection.
    Invalid,
    /// The server accepts any recipient, so the address cannot be confirmed.
    CatchAll,
    /// The probe could not reach a verdict (timeouts, temporary errors, ...).
    Unknown,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::CatchAll => "catch-all",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a caller may send to an address with this status.
    pub fn permits_sending(&self) -> bool {
        matches!(self, Self::Valid | Self::CatchAll)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying one address. `reason` is always populated and
/// explains any non-`valid` status.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub status: VerificationStatus,
    pub reason: String,
    pub is_disposable: bool,
    pub is_role_account: bool,
}

impl VerificationResult {
    pub fn new(
        email: impl Into<String>,
        status: VerificationStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            status,
            reason: reason.into(),
            is_disposable: false,
            is_role_account: false,
        }
    }

    pub fn permits_sending(&self) -> bool {
        self.status.permits_sending()
    }
}
