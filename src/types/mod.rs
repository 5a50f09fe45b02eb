//! Core types for Veritas

mod audio;
mod challenge;
mod landmarks;
mod output;
mod reason;
mod risk;
mod signals;
mod verdict;

pub use audio::AudioClip;
pub use challenge::{Challenge, SessionPhase, CHALLENGE_CATALOG};
pub use landmarks::{
    KeyPoints, LandmarkSet, Point, LEFT_EAR_EDGE, LEFT_LOWER_LID, LEFT_UPPER_LID,
    MESH_POINT_COUNT, MIN_POINT_COUNT, NOSE_TIP, RIGHT_EAR_EDGE, RIGHT_LOWER_LID,
    RIGHT_UPPER_LID,
};
pub use output::ChallengeOutput;
pub use reason::ReasonCode;
pub use risk::{Classification, RiskLevel, RiskSnapshot, ScoreSource};
pub use signals::{FaceBox, GeometrySignals};
pub use verdict::{ColorCategory, Verdict};
