/// An address that passed the syntax check, split at its single `@`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParts {
    /// Local part, kept verbatim (SMTP local parts may be case-sensitive).
    pub local: String,
    /// Domain, lower-cased.
    pub domain: String,
}

impl AddressParts {
    /// Envelope form used in `RCPT TO`.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local, self.domain)
    }
}
