pub mod cascade;

pub use cascade::CascadeDetector;

use crate::decoder::FrameData;
use crate::shared::PrepError;

/// Face bounding box in frame pixel coordinates, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedFace {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl DetectedFace {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn area(&self) -> i64 {
        (self.x2 as i64 - self.x1 as i64) * (self.y2 as i64 - self.y1 as i64)
    }
}

/// Pluggable face detection backend.
pub trait FaceDetector {
    /// Detect faces in an RGB frame. Order of the result carries no meaning.
    fn detect(&mut self, frame: &FrameData) -> Result<Vec<DetectedFace>, PrepError>;
}

impl<D: FaceDetector + ?Sized> FaceDetector for Box<D> {
    fn detect(&mut self, frame: &FrameData) -> Result<Vec<DetectedFace>, PrepError> {
        (**self).detect(frame)
    }
}

/// Picks the face with the largest positive area.
///
/// Equal areas resolve to the lowest `x1`, then the lowest `y1`, so the
/// choice never depends on the detector's output order.
pub fn select_largest(faces: &[DetectedFace]) -> Option<DetectedFace> {
    faces
        .iter()
        .copied()
        .filter(|f| f.area() > 0)
        .min_by(|a, b| {
            b.area()
                .cmp(&a.area())
                .then(a.x1.cmp(&b.x1))
                .then(a.y1.cmp(&b.y1))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_largest_by_area() {
        let faces = [
            DetectedFace::new(0, 0, 10, 10),
            DetectedFace::new(50, 50, 90, 80),
            DetectedFace::new(5, 5, 25, 25),
        ];
        assert_eq!(select_largest(&faces), Some(DetectedFace::new(50, 50, 90, 80)));
    }

    #[test]
    fn test_select_largest_empty() {
        assert_eq!(select_largest(&[]), None);
    }

    #[test]
    fn test_select_largest_ignores_degenerate_boxes() {
        let faces = [DetectedFace::new(10, 10, 10, 40), DetectedFace::new(30, 30, 20, 20)];
        assert_eq!(select_largest(&faces), None);
    }

    #[test]
    fn test_tie_break_is_order_independent() {
        let a = DetectedFace::new(40, 0, 60, 20);
        let b = DetectedFace::new(10, 30, 30, 50);
        let c = DetectedFace::new(10, 5, 30, 25);

        let expected = Some(c);
        assert_eq!(select_largest(&[a, b, c]), expected);
        assert_eq!(select_largest(&[c, b, a]), expected);
        assert_eq!(select_largest(&[b, a, c]), expected);
    }
}
