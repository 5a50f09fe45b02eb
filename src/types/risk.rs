//! Audio-derived risk values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::INITIAL_TRANSCRIPT;

/// Where a score came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScoreSource {
    /// Denylisted term matched; no remote call made
    Keyword { term: String },
    /// Remote classifier answered
    Remote,
    /// No usable classification; score is the fail-open 0
    Unavailable { reason: String },
}

/// Result of classifying one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// 0-100
    pub score: u8,
    pub source: ScoreSource,
}

impl Classification {
    pub fn keyword(score: u8, term: impl Into<String>) -> Self {
        Self { score, source: ScoreSource::Keyword { term: term.into() } }
    }

    pub fn remote(score: u8) -> Self {
        Self { score, source: ScoreSource::Remote }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { score: 0, source: ScoreSource::Unavailable { reason: reason.into() } }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.source, ScoreSource::Unavailable { .. })
    }
}

/// Display-facing risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Nothing could be assessed; distinct from Low
    Unknown,
    Low,
    Elevated,
}

/// Latest published audio state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    /// Sticky: only a later non-zero score replaces it
    pub latest_score: u8,
    pub latest_transcript: String,
    pub last_update: Option<DateTime<Utc>>,
    /// Source of the most recent classification (zero or not)
    pub last_source: Option<ScoreSource>,
    /// Utterances transcribed so far
    pub utterances: u64,
}

impl Default for RiskSnapshot {
    fn default() -> Self {
        Self {
            latest_score: 0,
            latest_transcript: INITIAL_TRANSCRIPT.to_string(),
            last_update: None,
            last_source: None,
            utterances: 0,
        }
    }
}

impl RiskSnapshot {
    /// Category for `limit`, keeping "could not tell" apart from "low"
    pub fn level(&self, limit: u8) -> RiskLevel {
        if self.latest_score > limit {
            RiskLevel::Elevated
        } else if self.latest_score == 0
            && matches!(self.last_source, None | Some(ScoreSource::Unavailable { .. }))
        {
            RiskLevel::Unknown
        } else {
            RiskLevel::Low
        }
    }
}
