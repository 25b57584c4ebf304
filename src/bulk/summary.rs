use std::fmt;

use crate::verify::{VerificationResult, VerificationStatus};

/// Per-status counts over a finished batch.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub catch_all: usize,
    pub unknown: usize,
    pub disposable: usize,
    pub role_accounts: usize,
}

impl BulkSummary {
    pub fn from_results(results: &[VerificationResult]) -> Self {
        results.iter().collect()
    }

    pub fn count(&self, status: VerificationStatus) -> usize {
        match status {
            VerificationStatus::Valid => self.valid,
            VerificationStatus::Invalid => self.invalid,
            VerificationStatus::CatchAll => self.catch_all,
            VerificationStatus::Unknown => self.unknown,
        }
    }

    fn record(mut self, result: &VerificationResult) -> Self {
        self.total += 1;
        match result.status {
            VerificationStatus::Valid => self.valid += 1,
            VerificationStatus::Invalid => self.invalid += 1,
            VerificationStatus::CatchAll => self.catch_all += 1,
            VerificationStatus::Unknown => self.unknown += 1,
        }
        if result.is_disposable {
            self.disposable += 1;
        }
        if result.is_role_account {
            self.role_accounts += 1;
        }
        self
    }
}

impl<'a> FromIterator<&'a VerificationResult> for BulkSummary {
    fn from_iter<I: IntoIterator<Item = &'a VerificationResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::record)
    }
}

impl fmt::Display for BulkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} valid={} invalid={} catch-all={} unknown={} disposable={} role={}",
            self.total,
            self.valid,
            self.invalid,
            self.catch_all,
            self.unknown,
            self.disposable,
            self.role_accounts
        )
    }
}
