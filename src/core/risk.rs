//! Shared risk state: one writer (audio task), any number of readers
//!
//! Updates are applied to the `RiskSnapshot` inside a watch channel under its
//! write lock, so a reader always sees score and transcript from the same update.

use chrono::Utc;
use tokio::sync::watch;

use crate::types::{Classification, RiskSnapshot};

/// Create the writer/reader pair
pub fn risk_channel() -> (RiskWriter, RiskReader) {
    let (tx, rx) = watch::channel(RiskSnapshot::default());
    (RiskWriter { tx }, RiskReader { rx })
}

/// Sole writer. Not Clone.
#[derive(Debug)]
pub struct RiskWriter {
    tx: watch::Sender<RiskSnapshot>,
}

impl RiskWriter {
    /// Publish a transcript together with its classification.
    ///
    /// The score only moves on a non-zero result; zero never clears an alarm.
    pub fn record(&self, text: &str, classification: &Classification) {
        self.tx.send_modify(|snap| {
            apply_transcript(snap, text);
            apply_classification(snap, classification);
        });
    }
}

fn apply_transcript(snap: &mut RiskSnapshot, text: &str) {
    snap.latest_transcript = format!("'{}'", text);
    snap.utterances += 1;
    snap.last_update = Some(Utc::now());
}

fn apply_classification(snap: &mut RiskSnapshot, classification: &Classification) {
    if classification.score > 0 {
        snap.latest_score = classification.score;
    }
    snap.last_source = Some(classification.source.clone());
    snap.last_update = Some(Utc::now());
}

/// Reader handle; cheap to clone, never blocks on the writer
#[derive(Debug, Clone)]
pub struct RiskReader {
    rx: watch::Receiver<RiskSnapshot>,
}

impl RiskReader {
    /// Latest consistent snapshot
    pub fn snapshot(&self) -> RiskSnapshot {
        self.rx.borrow().clone()
    }

    /// Has anything been published since the last `mark_seen`?
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn mark_seen(&mut self) {
        let _ = self.rx.borrow_and_update();
    }

    /// Wait for the next publish. Errors once the writer is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

// =============================================================================
// TESTS
// =============================================================================
