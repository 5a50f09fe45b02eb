//! Captured audio handed from `listen` to `transcribe`

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Mono PCM; may be empty for sources that transcribe out of band
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub captured_at: DateTime<Utc>,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self { samples, sample_rate, captured_at: Utc::now() }
    }
}
