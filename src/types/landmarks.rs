//! Face landmark sets as produced by the external face-mesh detector

use serde::{Deserialize, Serialize};
use crate::error::{Result, VeritasError};

// Face-mesh indices read by the geometry extractor
pub const NOSE_TIP: usize = 1;
pub const LEFT_EAR_EDGE: usize = 234;
pub const RIGHT_EAR_EDGE: usize = 454;
pub const RIGHT_UPPER_LID: usize = 386;
pub const RIGHT_LOWER_LID: usize = 374;
pub const LEFT_UPPER_LID: usize = 159;
pub const LEFT_LOWER_LID: usize = 145;

/// Points in a standard face mesh (478 with iris refinement)
pub const MESH_POINT_COUNT: usize = 468;

/// Smallest point count that covers every index above
pub const MIN_POINT_COUNT: usize = RIGHT_EAR_EDGE + 1;

/// Normalized image coordinate, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// The seven points the core actually reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPoints {
    pub nose: Point,
    pub left_ear: Point,
    pub right_ear: Point,
    pub right_upper_lid: Point,
    pub right_lower_lid: Point,
    pub left_upper_lid: Point,
    pub left_lower_lid: Point,
}

/// One detected face, immutable for the frame it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Wrap a full mesh. Fails if any required index is missing.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < MIN_POINT_COUNT {
            return Err(VeritasError::InvalidLandmarks {
                required: MIN_POINT_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Build a mesh from just the key points.
    ///
    /// Unused slots repeat the nose tip so the bounding box stays tight
    /// around the key points.
    pub fn from_key_points(keys: KeyPoints) -> Self {
        let mut points = vec![keys.nose; MESH_POINT_COUNT];
        points[NOSE_TIP] = keys.nose;
        points[LEFT_EAR_EDGE] = keys.left_ear;
        points[RIGHT_EAR_EDGE] = keys.right_ear;
        points[RIGHT_UPPER_LID] = keys.right_upper_lid;
        points[RIGHT_LOWER_LID] = keys.right_lower_lid;
        points[LEFT_UPPER_LID] = keys.left_upper_lid;
        points[LEFT_LOWER_LID] = keys.left_lower_lid;
        Self { points }
    }

    /// Point at a mesh index (always present for the named indices)
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = VeritasError;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Point> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

impl From<KeyPoints> for LandmarkSet {
    fn from(keys: KeyPoints) -> Self {
        Self::from_key_points(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_mesh_rejected() {
        let err = LandmarkSet::new(vec![Point::default(); MIN_POINT_COUNT - 1]).unwrap_err();
        assert!(matches!(
            err,
            VeritasError::InvalidLandmarks { required: 455, actual: 454 }
        ));
    }

    #[test]
    fn test_key_points_land_on_mesh_indices() {
        let keys = KeyPoints {
            nose: Point::new(0.5, 0.5),
            left_ear: Point::new(0.3, 0.5),
            right_ear: Point::new(0.7, 0.5),
            right_upper_lid: Point::new(0.55, 0.40),
            right_lower_lid: Point::new(0.55, 0.43),
            left_upper_lid: Point::new(0.45, 0.40),
            left_lower_lid: Point::new(0.45, 0.43),
        };
        let set = LandmarkSet::from(keys);
        assert_eq!(set.len(), MESH_POINT_COUNT);
        assert_eq!(set.point(LEFT_EAR_EDGE), keys.left_ear);
        assert_eq!(set.point(RIGHT_LOWER_LID), keys.right_lower_lid);
        assert_eq!(set.point(0), keys.nose);
    }

    #[test]
    fn test_deserialize_validates_length() {
        let short = serde_json::to_string(&vec![[0.1, 0.2]; 10]).unwrap();
        assert!(serde_json::from_str::<LandmarkSet>(&short).is_err());

        let full = serde_json::to_string(&vec![[0.1, 0.2]; MESH_POINT_COUNT]).unwrap();
        let set: LandmarkSet = serde_json::from_str(&full).unwrap();
        assert_eq!(set.point(NOSE_TIP), Point::new(0.1, 0.2));
    }
}
