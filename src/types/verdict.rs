//! Per-frame verdict handed to the renderer

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use crate::types::{Challenge, FaceBox, ReasonCode, RiskLevel, SessionPhase};

/// Color family for the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorCategory {
    Safe,
    Warn,
    Danger,
    /// HUD color while scanning
    Neutral,
}

impl ColorCategory {
    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            ColorCategory::Safe => text.green(),
            ColorCategory::Warn => text.yellow(),
            ColorCategory::Danger => text.red().bold(),
            ColorCategory::Neutral => text.cyan(),
        }
    }

    /// HUD color for a liveness percentage
    pub fn for_liveness(percent: u8) -> Self {
        if percent > 80 {
            ColorCategory::Safe
        } else if percent < 30 {
            ColorCategory::Danger
        } else {
            ColorCategory::Warn
        }
    }

    /// HUD color for a scam score
    pub fn for_risk(score: u8, limit: u8) -> Self {
        if score > limit {
            ColorCategory::Danger
        } else {
            ColorCategory::Safe
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub timestamp: DateTime<Utc>,
    pub phase: SessionPhase,
    pub status_text: String,
    pub color: ColorCategory,
    /// Display value; after verification it also reflects scam risk
    pub liveness_percent: u8,
    /// Facing ratio of this frame (0.5 when no face)
    pub debug_value: f64,
    /// Liveness alone, independent of risk
    pub human_verified: bool,
    /// Risk alone, independent of liveness
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub challenge: Option<Challenge>,
    /// Debounce threshold exceeded this frame
    pub challenge_matched: bool,
    pub transcript: String,
    pub face_box: Option<FaceBox>,
    pub reason: ReasonCode,
}

impl Verdict {
    pub fn liveness_color(&self) -> ColorCategory {
        ColorCategory::for_liveness(self.liveness_percent)
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self, scam_score_limit: u8) -> String {
        let matched = if self.challenge_matched { " MATCH!" } else { "" };
        format!(
            "{} | REALNESS {} | SCAM {} | DIR {:.2} | AUDIO: {}{}",
            self.color.paint(&self.status_text),
            self.liveness_color().paint(&format!("{}%", self.liveness_percent)),
            ColorCategory::for_risk(self.risk_score, scam_score_limit)
                .paint(&format!("{}%", self.risk_score)),
            self.debug_value,
            self.transcript,
            ColorCategory::Safe.paint(matched),
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "status={} | color={:?} | liveness={} | risk={} | level={:?} | dir={:.2} | reason={}",
            self.status_text,
            self.color,
            self.liveness_percent,
            self.risk_score,
            self.risk_level,
            self.debug_value,
            self.reason.code()
        )
    }
}
