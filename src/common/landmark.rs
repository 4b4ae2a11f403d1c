use serde::{Deserialize, Serialize};

/// A normalized 3D coordinate: x and y in [0, 1] image space, z a relative
/// depth offset around the hip midpoint (smaller y is higher on screen).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// The fixed 33-point body schema of the upstream pose model, named so the
/// rest of the crate never touches raw indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

pub const BODY_LANDMARK_COUNT: usize = 33;

impl BodyLandmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Landmark pairs renderers connect when drawing a stick figure.
pub const SKELETON_EDGES: [(BodyLandmark, BodyLandmark); 12] = [
    (BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow),
    (BodyLandmark::LeftElbow, BodyLandmark::LeftWrist),
    (BodyLandmark::RightShoulder, BodyLandmark::RightElbow),
    (BodyLandmark::RightElbow, BodyLandmark::RightWrist),
    (BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder),
    (BodyLandmark::LeftHip, BodyLandmark::RightHip),
    (BodyLandmark::LeftHip, BodyLandmark::LeftKnee),
    (BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
    (BodyLandmark::RightHip, BodyLandmark::RightKnee),
    (BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
    (BodyLandmark::LeftAnkle, BodyLandmark::LeftFootIndex),
    (BodyLandmark::RightAnkle, BodyLandmark::RightFootIndex),
];

/// One frame's worth of landmarks, index-addressed by [`BodyLandmark`] for
/// body frames or positionally for the variable-length hand schema.
/// Immutable once produced; detectors borrow it for the duration of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    points: Vec<Point3>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<Point3> {
        self.points.get(landmark.index()).copied()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the frame carries the full fixed body schema.
    pub fn is_complete_body(&self) -> bool {
        self.points.len() == BODY_LANDMARK_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_indices_match_upstream_schema() {
        assert_eq!(BodyLandmark::LeftShoulder.index(), 11);
        assert_eq!(BodyLandmark::RightShoulder.index(), 12);
        assert_eq!(BodyLandmark::LeftWrist.index(), 15);
        assert_eq!(BodyLandmark::RightWrist.index(), 16);
        assert_eq!(BodyLandmark::LeftHip.index(), 23);
        assert_eq!(BodyLandmark::RightHip.index(), 24);
        assert_eq!(BodyLandmark::RightFootIndex.index(), 32);
    }

    #[test]
    fn get_is_none_for_short_frame() {
        let frame = LandmarkFrame::new(vec![Point3::new(0.5, 0.5, 0.0); 5]);
        assert!(frame.get(BodyLandmark::Nose).is_some());
        assert!(frame.get(BodyLandmark::LeftShoulder).is_none());
        assert!(!frame.is_complete_body());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < f32::EPSILON);
    }
}
