//! Challenge engine output for one frame

use serde::{Deserialize, Serialize};
use crate::types::{Challenge, ReasonCode, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChallengeOutput {
    pub phase: SessionPhase,
    /// Active challenge; None once verified
    pub challenge: Option<Challenge>,
    /// Catalog index after this update
    pub index: usize,
    /// Predicate held on this frame
    pub passed: bool,
    /// Debounce threshold exceeded on this frame
    pub matched: bool,
    /// This frame moved the session forward
    pub advanced: bool,
    pub consecutive_pass_frames: u32,
    /// Progress through the catalog, 0.0-1.0
    pub liveness_confidence: f64,
    pub reason: ReasonCode,
}

impl ChallengeOutput {
    pub fn is_verified(&self) -> bool {
        self.phase == SessionPhase::Verified
    }
}
