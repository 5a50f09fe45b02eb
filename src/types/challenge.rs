//! Challenge catalog and session phases

use serde::{Deserialize, Serialize};
use crate::config::LivenessSettings;
use crate::types::GeometrySignals;

/// One physical action the subject must perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Challenge {
    Blink,
    TurnLeft,
    TurnRight,
}

/// Fixed challenge order for every session
pub const CHALLENGE_CATALOG: [Challenge; 3] =
    [Challenge::Blink, Challenge::TurnLeft, Challenge::TurnRight];

impl Challenge {
    /// Does this frame satisfy the challenge?
    pub fn passes(&self, signals: &GeometrySignals, thresholds: &LivenessSettings) -> bool {
        match self {
            Challenge::Blink => signals.blink_ratio < thresholds.blink_threshold,
            Challenge::TurnLeft => signals.facing_ratio < thresholds.turn_left_max,
            Challenge::TurnRight => signals.facing_ratio > thresholds.turn_right_min,
        }
    }

    /// Instruction shown to the subject
    pub fn label(&self) -> &'static str {
        match self {
            Challenge::Blink => "BLINK EYES",
            Challenge::TurnLeft => "TURN LEFT",
            Challenge::TurnRight => "TURN RIGHT",
        }
    }

    /// Catalog entry at `index`, or None past the end
    pub fn at(index: usize) -> Option<Challenge> {
        CHALLENGE_CATALOG.get(index).copied()
    }
}

impl std::fmt::Display for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a session stands, as seen by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "phase", content = "index")]
pub enum SessionPhase {
    /// No face in this frame
    Scanning,
    /// Working on catalog entry `index`
    Challenge(usize),
    /// Every challenge passed; terminal
    Verified,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Scanning => write!(f, "SCANNING"),
            SessionPhase::Challenge(i) => write!(f, "CHALLENGE[{}]", i),
            SessionPhase::Verified => write!(f, "VERIFIED"),
        }
    }
}
