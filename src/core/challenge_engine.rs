//! Challenge engine: debounced challenge-response state machine
//!
//! Per frame, while not verified:
//! - predicate holds → hold counter += 1, else counter = 0
//! - counter > debounce AND cooldown elapsed since last advance → next challenge
//! - index == catalog length → VERIFIED (terminal, never reset)
//!
//! Frames without a face never reach the engine.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::LivenessSettings;
use crate::types::{
    Challenge, ChallengeOutput, GeometrySignals, ReasonCode, SessionPhase, CHALLENGE_CATALOG,
};

/// Mutable session state, owned by the engine
#[derive(Debug, Clone)]
pub struct ChallengeSession {
    pub current_index: usize,
    pub consecutive_pass_frames: u32,
    pub last_advance: Instant,
    pub verified: bool,
}

impl ChallengeSession {
    pub fn new(now: Instant) -> Self {
        Self {
            current_index: 0,
            consecutive_pass_frames: 0,
            last_advance: now,
            verified: false,
        }
    }

    /// Progress through the catalog, 0.0-1.0
    pub fn liveness_confidence(&self) -> f64 {
        if self.verified {
            1.0
        } else {
            self.current_index as f64 / CHALLENGE_CATALOG.len() as f64
        }
    }
}

/// Challenge state machine engine
#[derive(Debug)]
pub struct ChallengeEngine {
    session: ChallengeSession,
    thresholds: LivenessSettings,
    cooldown: Duration,
    /// Frames evaluated (verified frames excluded)
    update_count: u64,
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new(LivenessSettings::default())
    }
}

impl ChallengeEngine {
    /// Create new engine; the cooldown clock starts now
    pub fn new(thresholds: LivenessSettings) -> Self {
        Self::new_at(thresholds, Instant::now())
    }

    pub fn new_at(thresholds: LivenessSettings, now: Instant) -> Self {
        let cooldown = thresholds.cooldown();
        Self {
            session: ChallengeSession::new(now),
            thresholds,
            cooldown,
            update_count: 0,
        }
    }

    /// Update with this frame's signals
    pub fn update(&mut self, signals: &GeometrySignals) -> ChallengeOutput {
        self.update_at(signals, Instant::now())
    }

    /// Update with an explicit frame time
    pub fn update_at(&mut self, signals: &GeometrySignals, now: Instant) -> ChallengeOutput {
        if self.session.verified {
            return self.output(false, false, false, ReasonCode::V003_VERIFIED_MAINTAINED);
        }
        self.update_count += 1;

        let challenge = CHALLENGE_CATALOG[self.session.current_index];
        let passed = challenge.passes(signals, &self.thresholds);

        if passed {
            self.session.consecutive_pass_frames = self.session.consecutive_pass_frames.saturating_add(1);
        } else {
            self.session.consecutive_pass_frames = 0;
        }

        let matched = self.session.consecutive_pass_frames > self.thresholds.debounce_frames;
        if !matched {
            let reason = if passed {
                ReasonCode::V002_DEBOUNCE_ACCUMULATING
            } else {
                ReasonCode::V002_CHALLENGE_PENDING
            };
            return self.output(passed, false, false, reason);
        }

        // Elapsed is measured against the engine clock, saturating on out-of-order frames
        let elapsed = now.saturating_duration_since(self.session.last_advance);
        if elapsed <= self.cooldown {
            debug!(challenge = %challenge, ?elapsed, "challenge matched, cooldown pending");
            return self.output(passed, true, false, ReasonCode::V002_COOLDOWN_PENDING);
        }

        self.session.current_index += 1;
        self.session.consecutive_pass_frames = 0;
        self.session.last_advance = now;

        if self.session.current_index >= CHALLENGE_CATALOG.len() {
            self.session.verified = true;
            info!(frames = self.update_count, "all challenges passed, subject verified");
            return self.output(passed, true, true, ReasonCode::V003_VERIFIED);
        }

        info!(
            passed = %challenge,
            next = %CHALLENGE_CATALOG[self.session.current_index],
            "challenge advanced"
        );
        self.output(passed, true, true, ReasonCode::V003_CHALLENGE_ADVANCED)
    }

    fn output(&self, passed: bool, matched: bool, advanced: bool, reason: ReasonCode) -> ChallengeOutput {
        ChallengeOutput {
            phase: self.phase(),
            challenge: self.active_challenge(),
            index: self.session.current_index,
            passed,
            matched,
            advanced,
            consecutive_pass_frames: self.session.consecutive_pass_frames,
            liveness_confidence: self.session.liveness_confidence(),
            reason,
        }
    }

    /// Phase as seen by a frame that has a face
    pub fn phase(&self) -> SessionPhase {
        if self.session.verified {
            SessionPhase::Verified
        } else {
            SessionPhase::Challenge(self.session.current_index)
        }
    }

    /// Challenge the subject should perform now
    pub fn active_challenge(&self) -> Option<Challenge> {
        if self.session.verified {
            None
        } else {
            Challenge::at(self.session.current_index)
        }
    }

    pub fn session(&self) -> &ChallengeSession {
        &self.session
    }

    pub fn is_verified(&self) -> bool {
        self.session.verified
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Current output without updating
    pub fn current_output(&self) -> ChallengeOutput {
        let reason = if self.session.verified {
            ReasonCode::V003_VERIFIED_MAINTAINED
        } else {
            ReasonCode::V002_CHALLENGE_PENDING
        };
        self.output(false, false, false, reason)
    }
}

// =============================================================================
// TESTS
// =============================================================================
