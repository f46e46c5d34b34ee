// src/landmarks.rs - Hand skeleton samples handed over by the external tracker
use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// MediaPipe hand landmark indices
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// The tracker reports the middle-finger knuckle as the palm reference point.
pub const PALM_CENTER: usize = MIDDLE_MCP;

pub const LANDMARK_COUNT: usize = 21;

/// Fingertips in thumb-to-pinky order.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 hand landmarks, got {0}")]
    WrongCount(usize),
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// Pixel dimensions of the camera frame a sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// One frame's worth of hand landmarks. x/y are normalized to the frame,
/// z is the tracker's relative depth.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSample {
    points: [Vector3<f64>; LANDMARK_COUNT],
}

impl LandmarkSample {
    pub fn new(points: [Vector3<f64>; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Builds a sample from the raw `[x, y, z]` triples a tracker emits.
    pub fn from_raw(raw: &[[f64; 3]]) -> Result<Self, LandmarkError> {
        if raw.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount(raw.len()));
        }

        let mut points = [Vector3::zeros(); LANDMARK_COUNT];
        for (i, lm) in raw.iter().enumerate() {
            if lm.iter().any(|c| !c.is_finite()) {
                return Err(LandmarkError::NonFinite { index: i });
            }
            points[i] = Vector3::new(lm[0], lm[1], lm[2]);
        }

        Ok(Self::new(points))
    }

    pub fn point(&self, index: usize) -> &Vector3<f64> {
        &self.points[index]
    }

    pub fn palm(&self) -> &Vector3<f64> {
        &self.points[PALM_CENTER]
    }

    /// Landmark position in frame pixels.
    pub fn pixel_position(&self, index: usize, frame: FrameSize) -> Point2<f64> {
        let lm = &self.points[index];
        Point2::new(lm.x * frame.width as f64, lm.y * frame.height as f64)
    }
}
