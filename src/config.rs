//! Runtime settings
//!
//! Defaults come from the constants in the crate root. A JSON file can
//! override any subset; CLI flags are applied on top by the binary.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeritasError};
use crate::{
    ADVANCE_COOLDOWN_MS, AUDIO_RETRY_DELAY_MS, BLINK_THRESHOLD, DEBOUNCE_FRAMES,
    LISTEN_TIMEOUT_SECS, PHRASE_TIME_LIMIT_SECS, SCAM_SCORE_LIMIT, TURN_LEFT_MAX_RATIO,
    TURN_RIGHT_MIN_RATIO,
};

/// Placeholder key shipped in sample configs; treated as "no credential"
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub liveness: LivenessSettings,
    pub risk: RiskSettings,
    pub audio: AudioSettings,
    pub classifier: ClassifierSettings,
}

/// Challenge predicates, debounce and display jitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessSettings {
    pub blink_threshold: f64,
    pub turn_left_max: f64,
    pub turn_right_min: f64,
    pub debounce_frames: u32,
    pub cooldown_ms: u64,
    /// Cosmetic +-few-percent wobble on the liveness display
    pub jitter: bool,
}

impl Default for LivenessSettings {
    fn default() -> Self {
        Self {
            blink_threshold: BLINK_THRESHOLD,
            turn_left_max: TURN_LEFT_MAX_RATIO,
            turn_right_min: TURN_RIGHT_MIN_RATIO,
            debounce_frames: DEBOUNCE_FRAMES,
            cooldown_ms: ADVANCE_COOLDOWN_MS,
            jitter: true,
        }
    }
}

impl LivenessSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub scam_score_limit: u8,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self { scam_score_limit: SCAM_SCORE_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub listen_timeout_secs: u64,
    pub phrase_time_limit_secs: u64,
    pub retry_delay_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            listen_timeout_secs: LISTEN_TIMEOUT_SECS,
            phrase_time_limit_secs: PHRASE_TIME_LIMIT_SECS,
            retry_delay_ms: AUDIO_RETRY_DELAY_MS,
        }
    }
}

impl AudioSettings {
    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }

    pub fn phrase_time_limit(&self) -> Duration {
        Duration::from_secs(self.phrase_time_limit_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Hard cap for one listen call, in case a source ignores its timeouts
    pub fn listen_deadline(&self) -> Duration {
        self.listen_timeout() + self.phrase_time_limit() + Duration::from_secs(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub endpoint: String,
    pub model: String,
    pub request_timeout_ms: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            request_timeout_ms: 10_000,
            api_key: None,
        }
    }
}

impl ClassifierSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Usable credential, if any. Blank and placeholder keys count as none.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

impl Settings {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let l = &self.liveness;
        for (name, value) in [
            ("blink_threshold", l.blink_threshold),
            ("turn_left_max", l.turn_left_max),
            ("turn_right_min", l.turn_right_min),
        ] {
            if !value.is_finite() {
                return Err(VeritasError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if l.turn_left_max >= l.turn_right_min {
            return Err(VeritasError::InvalidConfig(format!(
                "turn_left_max ({}) must be below turn_right_min ({})",
                l.turn_left_max, l.turn_right_min
            )));
        }
        if l.debounce_frames == 0 && l.cooldown_ms == 0 {
            return Err(VeritasError::InvalidConfig(
                "debounce_frames and cooldown_ms cannot both be zero".to_string(),
            ));
        }
        if self.risk.scam_score_limit > 100 {
            return Err(VeritasError::InvalidConfig(
                "scam_score_limit must be within 0-100".to_string(),
            ));
        }
        if self.classifier.endpoint.trim().is_empty() {
            return Err(VeritasError::InvalidConfig("classifier endpoint is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let s = Settings::default();
        assert_eq!(s.liveness.blink_threshold, BLINK_THRESHOLD);
        assert_eq!(s.liveness.debounce_frames, 5);
        assert_eq!(s.liveness.cooldown(), Duration::from_millis(1500));
        assert_eq!(s.risk.scam_score_limit, 40);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s: Settings = serde_json::from_str(r#"{"risk": {"scam_score_limit": 60}}"#).unwrap();
        assert_eq!(s.risk.scam_score_limit, 60);
        assert_eq!(s.liveness, LivenessSettings::default());
    }

    #[test]
    fn test_placeholder_key_is_no_credential() {
        let mut c = ClassifierSettings::default();
        assert_eq!(c.credential(), None);
        c.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert_eq!(c.credential(), None);
        c.api_key = Some("  ".to_string());
        assert_eq!(c.credential(), None);
        c.api_key = Some("abc123".to_string());
        assert_eq!(c.credential(), Some("abc123"));
    }

    #[test]
    fn test_inverted_turn_thresholds_rejected() {
        let mut s = Settings::default();
        s.liveness.turn_left_max = 0.8;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut s = Settings::default();
        s.classifier.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("secret"));
    }
}
