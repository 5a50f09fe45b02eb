//! Geometry extractor: landmark set → facing ratio, blink ratio, face box
//!
//! Pure functions. Degenerate geometry falls back to neutral values.

use crate::NEUTRAL_FACING_RATIO;
use crate::types::{
    FaceBox, GeometrySignals, LandmarkSet, LEFT_EAR_EDGE, LEFT_LOWER_LID, LEFT_UPPER_LID,
    NOSE_TIP, RIGHT_EAR_EDGE, RIGHT_LOWER_LID, RIGHT_UPPER_LID,
};

/// Both signals for one frame
pub fn extract(landmarks: &LandmarkSet) -> GeometrySignals {
    GeometrySignals::new(facing_ratio(landmarks), blink_ratio(landmarks))
}

/// Where the nose sits between the ear edges.
///
/// 0.5 exactly when the ears share an x coordinate.
pub fn facing_ratio(landmarks: &LandmarkSet) -> f64 {
    let nose_x = landmarks.point(NOSE_TIP).x;
    let left_x = landmarks.point(LEFT_EAR_EDGE).x;
    let right_x = landmarks.point(RIGHT_EAR_EDGE).x;

    let width = right_x - left_x;
    if width == 0.0 {
        return NEUTRAL_FACING_RATIO;
    }
    (nose_x - left_x) / width
}

/// Mean vertical gap between upper and lower eyelids
pub fn blink_ratio(landmarks: &LandmarkSet) -> f64 {
    let right = (landmarks.point(RIGHT_UPPER_LID).y - landmarks.point(RIGHT_LOWER_LID).y).abs();
    let left = (landmarks.point(LEFT_UPPER_LID).y - landmarks.point(LEFT_LOWER_LID).y).abs();
    (right + left) / 2.0
}

/// Min/max over every point
pub fn face_box(landmarks: &LandmarkSet) -> FaceBox {
    let mut b = FaceBox {
        x_min: f64::INFINITY,
        y_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_max: f64::NEG_INFINITY,
    };
    for p in landmarks.points() {
        b.x_min = b.x_min.min(p.x);
        b.y_min = b.y_min.min(p.y);
        b.x_max = b.x_max.max(p.x);
        b.y_max = b.y_max.max(p.y);
    }
    b
}

// =============================================================================
// TESTS
// =============================================================================
