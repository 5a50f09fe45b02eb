//! Veritas: live proof-of-human verification
//!
//! Frame path: landmarks → geometry signals → ChallengeEngine → VerdictComposer
//! Audio path: utterance → transcript → TextRiskClassifier → RiskWriter (watch)

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::{Result, VeritasError};

// =============================================================================
// LIVENESS THRESHOLDS [C] - physical calibration, tuned against webcam footage
// =============================================================================

/// Blink passes when the averaged eyelid gap drops below this
pub const BLINK_THRESHOLD: f64 = 0.012;

/// Turn-left passes when the facing ratio drops below this
pub const TURN_LEFT_MAX_RATIO: f64 = 0.25;

/// Turn-right passes when the facing ratio rises above this
pub const TURN_RIGHT_MIN_RATIO: f64 = 0.75;

/// Facing ratio reported when the ear span is degenerate
pub const NEUTRAL_FACING_RATIO: f64 = 0.5;

/// Consecutive passing frames required (strictly more than this)
pub const DEBOUNCE_FRAMES: u32 = 5;

/// Minimum time between two challenge advances (milliseconds)
/// 1.5 seconds - one sustained gesture must not count twice
pub const ADVANCE_COOLDOWN_MS: u64 = 1500;

// =============================================================================
// RISK [C]
// =============================================================================

/// Scores strictly above this raise the scam alarm
pub const SCAM_SCORE_LIMIT: u8 = 40;

/// Inclusive range for a keyword fast-path hit
pub const KEYWORD_SCORE_MIN: u8 = 85;
pub const KEYWORD_SCORE_MAX: u8 = 99;

// =============================================================================
// AUDIO [C]
// =============================================================================

/// Seconds to wait for speech to start
pub const LISTEN_TIMEOUT_SECS: u64 = 3;

/// Maximum seconds captured per phrase
pub const PHRASE_TIME_LIMIT_SECS: u64 = 5;

/// Pause between failed audio iterations (milliseconds)
pub const AUDIO_RETRY_DELAY_MS: u64 = 100;

// =============================================================================
// DISPLAY [C] - liveness percentages shown on the HUD
// =============================================================================

pub const LIVENESS_SCANNING: u8 = 15;
pub const LIVENESS_CHALLENGE_BASE: u8 = 20;
pub const LIVENESS_CHALLENGE_STEP: u8 = 30;
pub const LIVENESS_VERIFIED: u8 = 99;
pub const LIVENESS_SCAM: u8 = 12;

/// Transcript shown before the first utterance arrives
pub const INITIAL_TRANSCRIPT: &str = "Listening...";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
