//! Frame acquisition and landmark detection adapters
//!
//! The replay format is JSON lines, one frame per line:
//!   {"t_ms": 33, "landmarks": [[x, y], ...]}   full face mesh
//!   {"t_ms": 66, "key_points": {"nose": [x, y], ...}}
//!   {"t_ms": 99}                               no face

use std::io::BufRead;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, VeritasError};
use crate::types::{KeyPoints, LandmarkSet};

/// Largest accepted capture offset (one day)
pub const MAX_FRAME_OFFSET_MS: u64 = 24 * 60 * 60 * 1000;

/// One captured frame as the core sees it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time relative to the first frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<KeyPoints>,
}

impl Frame {
    pub fn empty(t_ms: u64) -> Self {
        Self { t_ms: Some(t_ms), ..Self::default() }
    }

    pub fn with_keys(t_ms: u64, keys: KeyPoints) -> Self {
        Self { t_ms: Some(t_ms), key_points: Some(keys), ..Self::default() }
    }

    /// Capture instant relative to `start`; None without `t_ms` or when it is out of range
    pub fn captured_at(&self, start: Instant) -> Option<Instant> {
        self.t_ms
            .filter(|&t| t <= MAX_FRAME_OFFSET_MS)
            .and_then(|t| start.checked_add(Duration::from_millis(t)))
    }
}

/// External face-mesh detector
pub trait LandmarkProvider {
    /// At most one face; None when nobody is in frame
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet>;
}

/// Uses landmarks already attached to replayed frames
#[derive(Debug, Default)]
pub struct ReplayDetector;

impl LandmarkProvider for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet> {
        frame
            .landmarks
            .clone()
            .or_else(|| frame.key_points.map(LandmarkSet::from_key_points))
    }
}

/// Reads frames from JSON lines
pub struct FrameSource<R> {
    reader: R,
    line_no: usize,
    skipped: usize,
    strict: bool,
}

impl<R: BufRead> FrameSource<R> {
    /// Lenient source: malformed lines are logged and skipped
    pub fn new(reader: R) -> Self {
        Self { reader, line_no: 0, skipped: 0, strict: false }
    }

    /// Malformed lines become errors
    pub fn strict(reader: R) -> Self {
        Self { strict: true, ..Self::new(reader) }
    }

    /// Next frame, or None at end of input
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<Frame>(trimmed) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) if self.strict => {
                    return Err(VeritasError::MalformedFrame { line: self.line_no, message: e.to_string() });
                }
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "skipping malformed frame");
                    self.skipped += 1;
                }
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for FrameSource<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

// =============================================================================
// TESTS
// =============================================================================
