//! Audio risk pipeline: listen → transcribe → classify → publish, forever
//!
//! Runs as one background tokio task. Every failure is logged and retried;
//! nothing here ever reaches the frame loop except through `RiskWriter`.
//! A watch shutdown signal stops it between (or during) iterations.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::core::classifier::TextRiskClassifier;
use crate::core::risk::RiskWriter;
use crate::error::{ListenError, Result, TranscribeError};
use crate::types::{AudioClip, Classification};

/// Speech capture + speech-to-text
#[async_trait]
pub trait UtteranceSource: Send {
    /// Wait up to `timeout` for speech to start, capture at most `max_phrase`
    async fn listen(&mut self, timeout: Duration, max_phrase: Duration) -> std::result::Result<AudioClip, ListenError>;

    async fn transcribe(&mut self, clip: AudioClip) -> std::result::Result<String, TranscribeError>;
}

// =============================================================================
// SOURCES
// =============================================================================

/// A microphone that never hears anything
#[derive(Debug, Default)]
pub struct SilentSource;

#[async_trait]
impl UtteranceSource for SilentSource {
    async fn listen(&mut self, timeout: Duration, _max_phrase: Duration) -> std::result::Result<AudioClip, ListenError> {
        tokio::time::sleep(timeout).await;
        Err(ListenError::Timeout(timeout.as_secs()))
    }

    async fn transcribe(&mut self, _clip: AudioClip) -> std::result::Result<String, TranscribeError> {
        Err(TranscribeError::Unintelligible)
    }
}

/// Replays a fixed list of utterances, one per `listen`.
///
/// Empty entries behave as silence. Once exhausted it acts like `SilentSource`.
#[derive(Debug, Default)]
pub struct ScriptedUtterances {
    script: VecDeque<String>,
    pending: Option<String>,
    pace: Duration,
}

impl ScriptedUtterances {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: lines.into_iter().map(Into::into).collect(),
            pending: None,
            pace: Duration::ZERO,
        }
    }

    /// One utterance per line; `#` lines are comments
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(
            raw.lines()
                .filter(|l| !l.trim_start().starts_with('#'))
                .map(|l| l.trim().to_string()),
        ))
    }

    /// Simulated speaking time before each utterance is returned
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl UtteranceSource for ScriptedUtterances {
    async fn listen(&mut self, timeout: Duration, max_phrase: Duration) -> std::result::Result<AudioClip, ListenError> {
        let Some(line) = self.script.pop_front() else {
            tokio::time::sleep(timeout).await;
            return Err(ListenError::Timeout(timeout.as_secs()));
        };
        if !self.pace.is_zero() {
            tokio::time::sleep(self.pace.min(max_phrase)).await;
        }
        if line.is_empty() {
            return Err(ListenError::NoSpeech);
        }
        self.pending = Some(line);
        Ok(AudioClip::new(Vec::new(), 16_000))
    }

    async fn transcribe(&mut self, _clip: AudioClip) -> std::result::Result<String, TranscribeError> {
        self.pending.take().ok_or(TranscribeError::Unintelligible)
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// What one iteration ended with
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Classified(Classification),
    ListenFailed(ListenError),
    TranscribeFailed(TranscribeError),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, StepOutcome::Classified(_))
    }
}

/// Counters reported when the task stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub iterations: u64,
    pub classified: u64,
    pub listen_failures: u64,
    pub transcribe_failures: u64,
    /// Classifications that fell back to 0
    pub unavailable: u64,
}

impl PipelineStats {
    fn record(&mut self, outcome: &StepOutcome) {
        self.iterations += 1;
        match outcome {
            StepOutcome::Classified(c) => {
                self.classified += 1;
                if c.is_unavailable() {
                    self.unavailable += 1;
                }
            }
            StepOutcome::ListenFailed(_) => self.listen_failures += 1,
            StepOutcome::TranscribeFailed(_) => self.transcribe_failures += 1,
        }
    }
}

pub struct AudioRiskPipeline<S> {
    source: S,
    classifier: TextRiskClassifier,
    writer: RiskWriter,
    settings: AudioSettings,
    stats: PipelineStats,
}

impl<S: UtteranceSource> AudioRiskPipeline<S> {
    pub fn new(source: S, classifier: TextRiskClassifier, writer: RiskWriter, settings: AudioSettings) -> Self {
        Self {
            source,
            classifier,
            writer,
            settings,
            stats: PipelineStats::default(),
        }
    }

    /// One listen/transcribe/classify/publish pass
    pub async fn step(&mut self) -> StepOutcome {
        let listen = self
            .source
            .listen(self.settings.listen_timeout(), self.settings.phrase_time_limit());
        let clip = match tokio::time::timeout(self.settings.listen_deadline(), listen).await {
            Ok(Ok(clip)) => clip,
            Ok(Err(e)) => {
                debug!(error = %e, "listen failed");
                return StepOutcome::ListenFailed(e);
            }
            Err(_) => {
                warn!(deadline = ?self.settings.listen_deadline(), "listen overran its deadline");
                return StepOutcome::ListenFailed(ListenError::Timeout(self.settings.listen_timeout_secs));
            }
        };

        let text = match self.source.transcribe(clip).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                debug!("transcription came back empty");
                return StepOutcome::TranscribeFailed(TranscribeError::Unintelligible);
            }
            Err(e) => {
                debug!(error = %e, "transcription failed");
                return StepOutcome::TranscribeFailed(e);
            }
        };

        debug!(transcript = %text, "heard");
        let classification = self.classifier.classify(&text).await;
        self.writer.record(&text, &classification);
        StepOutcome::Classified(classification)
    }

    /// `step`, then back off briefly if it failed
    async fn iterate(&mut self) -> StepOutcome {
        let outcome = self.step().await;
        if outcome.is_failure() {
            tokio::time::sleep(self.settings.retry_delay()).await;
        }
        outcome
    }

    /// Loop until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> PipelineStats {
        info!("audio risk pipeline started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                outcome = self.iterate() => {
                    self.stats.record(&outcome);
                }
            }
        }
        info!(
            iterations = self.stats.iterations,
            classified = self.stats.classified,
            "audio risk pipeline stopped"
        );
        self.stats
    }
}

/// Start the pipeline on the current runtime
pub fn spawn_audio_pipeline<S>(
    source: S,
    classifier: TextRiskClassifier,
    writer: RiskWriter,
    settings: AudioSettings,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<PipelineStats>
where
    S: UtteranceSource + 'static,
{
    let pipeline = AudioRiskPipeline::new(source, classifier, writer, settings);
    tokio::spawn(pipeline.run(shutdown))
}

// =============================================================================
// TESTS
// =============================================================================
