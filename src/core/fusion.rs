//! Fusion: challenge state + latest risk snapshot → one Verdict
//!
//! - no face      → SCANNING, Neutral, ~15%
//! - challenging  → ACTION: <label>, Warn, 20% + 30% per passed challenge
//! - verified     → SAFE (99%) or SCAM DETECTED (12%) depending on the risk limit

use chrono::Utc;
use rand::Rng;

use crate::config::Settings;
use crate::types::{
    ChallengeOutput, ColorCategory, FaceBox, GeometrySignals, ReasonCode, RiskLevel, RiskSnapshot,
    SessionPhase, Verdict,
};
use crate::{
    LIVENESS_CHALLENGE_BASE, LIVENESS_CHALLENGE_STEP, LIVENESS_SCAM, LIVENESS_SCANNING,
    LIVENESS_VERIFIED, NEUTRAL_FACING_RATIO,
};

pub const STATUS_SCANNING: &str = "SCANNING SUBJECT...";
pub const STATUS_SAFE: &str = "IDENTITY CONFIRMED [SAFE]";
pub const STATUS_SCAM: &str = "!!! SCAM DETECTED !!!";

/// Everything the composer needs from a frame that had a face
#[derive(Debug, Clone, Copy)]
pub struct FrameObservation {
    pub signals: GeometrySignals,
    pub face_box: FaceBox,
    pub challenge: ChallengeOutput,
}

#[derive(Debug, Clone)]
pub struct VerdictComposer {
    scam_score_limit: u8,
    jitter: bool,
}

impl VerdictComposer {
    pub fn new(scam_score_limit: u8, jitter: bool) -> Self {
        Self { scam_score_limit, jitter }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.risk.scam_score_limit, settings.liveness.jitter)
    }

    pub fn compose(&self, observation: Option<&FrameObservation>, risk: &RiskSnapshot) -> Verdict {
        let risk_level = risk.level(self.scam_score_limit);
        let mut verdict = Verdict {
            timestamp: Utc::now(),
            phase: SessionPhase::Scanning,
            status_text: STATUS_SCANNING.to_string(),
            color: ColorCategory::Neutral,
            liveness_percent: self.wobble(LIVENESS_SCANNING, -2, 3),
            debug_value: NEUTRAL_FACING_RATIO,
            human_verified: false,
            risk_score: risk.latest_score,
            risk_level,
            challenge: None,
            challenge_matched: false,
            transcript: risk.latest_transcript.clone(),
            face_box: None,
            reason: ReasonCode::V001_NO_FACE,
        };

        let Some(obs) = observation else {
            return verdict;
        };
        verdict.phase = obs.challenge.phase;
        verdict.debug_value = obs.signals.facing_ratio;
        verdict.face_box = Some(obs.face_box);
        verdict.challenge = obs.challenge.challenge;
        verdict.challenge_matched = obs.challenge.matched;

        if !obs.challenge.is_verified() {
            let label = obs.challenge.challenge.map(|c| c.label()).unwrap_or("-");
            verdict.status_text = format!("ACTION: {}", label);
            verdict.color = ColorCategory::Warn;
            verdict.liveness_percent = self.wobble(challenge_baseline(obs.challenge.index), -2, 2);
            verdict.reason = obs.challenge.reason;
            return verdict;
        }

        verdict.human_verified = true;
        if risk_level == RiskLevel::Elevated {
            verdict.status_text = STATUS_SCAM.to_string();
            verdict.color = ColorCategory::Danger;
            verdict.liveness_percent = LIVENESS_SCAM;
            verdict.reason = ReasonCode::V004_RISK_ELEVATED;
        } else {
            verdict.status_text = STATUS_SAFE.to_string();
            verdict.color = ColorCategory::Safe;
            verdict.liveness_percent = LIVENESS_VERIFIED;
            verdict.reason = if risk_level == RiskLevel::Unknown {
                ReasonCode::V004_RISK_UNKNOWN
            } else {
                ReasonCode::V004_RISK_CLEAR
            };
        }
        verdict
    }

    fn wobble(&self, base: u8, low: i16, high: i16) -> u8 {
        if !self.jitter {
            return base;
        }
        let delta = rand::thread_rng().gen_range(low..=high);
        (base as i16 + delta).clamp(0, 100) as u8
    }
}

impl Default for VerdictComposer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Liveness shown while challenge `index` is active
pub fn challenge_baseline(index: usize) -> u8 {
    let boosted = LIVENESS_CHALLENGE_BASE as usize + index * LIVENESS_CHALLENGE_STEP as usize;
    boosted.min(100) as u8
}

// =============================================================================
// TESTS
// =============================================================================
