//! Per-frame driver: landmarks → geometry → challenge engine → verdict
//!
//! Synchronous and single-threaded. Reads the risk snapshot without waiting
//! on the audio task.

use std::time::Instant;

use tracing::info;

use crate::config::Settings;
use crate::core::challenge_engine::ChallengeEngine;
use crate::core::fusion::{FrameObservation, VerdictComposer};
use crate::core::geometry;
use crate::core::risk::RiskReader;
use crate::types::{ColorCategory, LandmarkSet, SessionPhase, Verdict};

pub struct LivenessMonitor {
    engine: ChallengeEngine,
    composer: VerdictComposer,
    risk: RiskReader,
    frames: u64,
    last_color: Option<ColorCategory>,
}

impl LivenessMonitor {
    pub fn new(settings: &Settings, risk: RiskReader) -> Self {
        Self::new_at(settings, risk, Instant::now())
    }

    pub fn new_at(settings: &Settings, risk: RiskReader, now: Instant) -> Self {
        Self {
            engine: ChallengeEngine::new_at(settings.liveness.clone(), now),
            composer: VerdictComposer::from_settings(settings),
            risk,
            frames: 0,
            last_color: None,
        }
    }

    /// Process one frame captured now
    pub fn process(&mut self, face: Option<&LandmarkSet>) -> Verdict {
        self.process_at(face, Instant::now())
    }

    /// Process one frame with an explicit capture time
    pub fn process_at(&mut self, face: Option<&LandmarkSet>, now: Instant) -> Verdict {
        self.frames += 1;
        let risk = self.risk.snapshot();

        let observation = face.map(|landmarks| {
            let signals = geometry::extract(landmarks);
            FrameObservation {
                signals,
                face_box: geometry::face_box(landmarks),
                challenge: self.engine.update_at(&signals, now),
            }
        });

        let verdict = self.composer.compose(observation.as_ref(), &risk);
        if self.last_color != Some(verdict.color) {
            info!(
                status = %verdict.status_text,
                color = ?verdict.color,
                risk = verdict.risk_score,
                frame = self.frames,
                "verdict changed"
            );
            self.last_color = Some(verdict.color);
        }
        verdict
    }

    pub fn phase(&self) -> SessionPhase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &ChallengeEngine {
        &self.engine
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
