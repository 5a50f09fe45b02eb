//! Core modules for Veritas

pub mod audio;
pub mod challenge_engine;
pub mod classifier;
pub mod frames;
pub mod fusion;
pub mod geometry;
pub mod monitor;
pub mod risk;

pub use audio::{spawn_audio_pipeline, AudioRiskPipeline, PipelineStats, ScriptedUtterances, SilentSource, StepOutcome, UtteranceSource};
pub use challenge_engine::{ChallengeEngine, ChallengeSession};
pub use classifier::{GeminiScorer, RemoteScorer, TextRiskClassifier};
pub use frames::{Frame, FrameSource, LandmarkProvider, ReplayDetector, MAX_FRAME_OFFSET_MS};
pub use fusion::{FrameObservation, VerdictComposer};
pub use monitor::LivenessMonitor;
pub use risk::{risk_channel, RiskReader, RiskWriter};
