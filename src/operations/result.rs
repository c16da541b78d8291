//! Normalized outcome of a finished operation

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Succeeded,
    /// Succeeded, but the system must restart to finish
    NeedsRestart,
    /// Nothing to update; treated as success
    NoApplicableUpdateFound,
    /// Retry elevated
    NeedsElevation,
    /// Retry with a backend-specific scope flag (e.g. pip `--user`)
    NeedsBackendScopeRetry,
    /// Installer hash mismatch; only the user may choose to skip the check
    IncorrectHash,
    Failed,
}

impl ResultCode {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::NeedsRestart | Self::NoApplicableUpdateFound
        )
    }

    /// Recoverable by an automatic retry with adjusted options
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NeedsElevation | Self::NeedsBackendScopeRetry)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Succeeded => "succeeded",
            Self::NeedsRestart => "succeeded, restart required",
            Self::NoApplicableUpdateFound => "no applicable update found",
            Self::NeedsElevation => "administrator rights required",
            Self::NeedsBackendScopeRetry => "scope retry required",
            Self::IncorrectHash => "installer hash mismatch",
            Self::Failed => "failed",
        };
        write!(f, "{}", text)
    }
}

/// Terminal report of one operation, as delivered to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub code: ResultCode,
    pub exit_code: Option<i32>,
    /// Full console output of the last attempt
    pub output: String,
    pub cancelled: bool,
    /// Number of times the driver was invoked
    pub attempts: usize,
}

impl OperationOutcome {
    pub fn cancelled(output: String, attempts: usize) -> Self {
        Self {
            code: ResultCode::Failed,
            exit_code: None,
            output,
            cancelled: true,
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.code.is_success()
    }

    /// One-line message for the user; cancellation is not reported as a failure.
    pub fn summary(&self) -> String {
        if self.cancelled {
            return "cancelled".to_string();
        }
        match (self.code, self.exit_code) {
            (ResultCode::Failed, Some(code)) => format!("failed with exit code {}", code),
            (ResultCode::IncorrectHash, _) => {
                "installer hash mismatch; retry with --skip-hash to bypass the integrity check".to_string()
            }
            (code, _) => code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_family() {
        assert!(ResultCode::Succeeded.is_success());
        assert!(ResultCode::NeedsRestart.is_success());
        assert!(ResultCode::NoApplicableUpdateFound.is_success());
        assert!(!ResultCode::IncorrectHash.is_success());
        assert!(!ResultCode::IncorrectHash.is_recoverable());
        assert!(ResultCode::NeedsElevation.is_recoverable());
    }

    #[test]
    fn cancelled_is_not_success_and_not_failure_text() {
        let outcome = OperationOutcome::cancelled(String::new(), 1);
        assert!(!outcome.is_success());
        assert_eq!(outcome.summary(), "cancelled");
    }

    #[test]
    fn hash_summary_offers_skip() {
        let outcome = OperationOutcome {
            code: ResultCode::IncorrectHash,
            exit_code: Some(-1978335215),
            output: String::new(),
            cancelled: false,
            attempts: 1,
        };
        assert!(outcome.summary().contains("--skip-hash"));
    }
}
