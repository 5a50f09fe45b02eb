//! Per-frame geometric signals

use serde::{Deserialize, Serialize};

/// Scalars derived from one landmark set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometrySignals {
    /// Nose position between the ear edges: ~0 = turned left, ~1 = turned right
    pub facing_ratio: f64,
    /// Mean vertical eyelid gap of both eyes
    pub blink_ratio: f64,
}

impl GeometrySignals {
    pub const fn new(facing_ratio: f64, blink_ratio: f64) -> Self {
        Self { facing_ratio, blink_ratio }
    }
}

/// Normalized bounding box of a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl FaceBox {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }
}
