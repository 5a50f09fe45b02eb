//! Reason codes attached to every challenge update and verdict

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // V001: Presence
    // =========================================================================
    /// No face in frame, engine not consulted
    V001_NO_FACE,

    // =========================================================================
    // V002: Challenge progress
    // =========================================================================
    /// Active challenge not satisfied this frame
    V002_CHALLENGE_PENDING,
    /// Challenge satisfied, debounce still accumulating
    V002_DEBOUNCE_ACCUMULATING,
    /// Debounce reached, waiting out the advance cooldown
    V002_COOLDOWN_PENDING,

    // =========================================================================
    // V003: Transitions
    // =========================================================================
    /// Moved to the next challenge
    V003_CHALLENGE_ADVANCED,
    /// Last challenge passed, subject verified
    V003_VERIFIED,
    /// Already verified, nothing evaluated
    V003_VERIFIED_MAINTAINED,

    // =========================================================================
    // V004: Risk
    // =========================================================================
    /// Verified, latest audio risk at or below the limit
    V004_RISK_CLEAR,
    /// Verified, latest audio risk above the limit
    V004_RISK_ELEVATED,
    /// Verified, but no classification could be made yet
    V004_RISK_UNKNOWN,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::V001_NO_FACE => "V001_NO_FACE",
            Self::V002_CHALLENGE_PENDING => "V002_CHALLENGE_PENDING",
            Self::V002_DEBOUNCE_ACCUMULATING => "V002_DEBOUNCE_ACCUMULATING",
            Self::V002_COOLDOWN_PENDING => "V002_COOLDOWN_PENDING",
            Self::V003_CHALLENGE_ADVANCED => "V003_CHALLENGE_ADVANCED",
            Self::V003_VERIFIED => "V003_VERIFIED",
            Self::V003_VERIFIED_MAINTAINED => "V003_VERIFIED_MAINTAINED",
            Self::V004_RISK_CLEAR => "V004_RISK_CLEAR",
            Self::V004_RISK_ELEVATED => "V004_RISK_ELEVATED",
            Self::V004_RISK_UNKNOWN => "V004_RISK_UNKNOWN",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::V001_NO_FACE => "No face detected",
            Self::V002_CHALLENGE_PENDING => "Waiting for challenge action",
            Self::V002_DEBOUNCE_ACCUMULATING => "Action seen, holding",
            Self::V002_COOLDOWN_PENDING => "Action matched, cooldown running",
            Self::V003_CHALLENGE_ADVANCED => "Next challenge",
            Self::V003_VERIFIED => "All challenges passed",
            Self::V003_VERIFIED_MAINTAINED => "Verified",
            Self::V004_RISK_CLEAR => "No scam risk detected",
            Self::V004_RISK_ELEVATED => "Scam risk above limit",
            Self::V004_RISK_UNKNOWN => "Scam risk could not be assessed",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
