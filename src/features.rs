// src/features.rs - Pairwise landmark distances used by the pose classifier
use crate::landmarks::{
    LandmarkSample, INDEX_TIP, MIDDLE_TIP, PALM_CENTER, PINKY_TIP, RING_TIP, THUMB_TIP,
};

/// Fingertip-to-palm distances plus the thumb-to-index gap for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureSet {
    pub thumb_palm: f64,
    pub index_palm: f64,
    pub middle_palm: f64,
    pub ring_palm: f64,
    pub pinky_palm: f64,
    pub thumb_index: f64,
}

impl FeatureSet {
    pub fn extract(sample: &LandmarkSample) -> Self {
        let dist = |a: usize, b: usize| (sample.point(a) - sample.point(b)).norm();

        Self {
            thumb_palm: dist(THUMB_TIP, PALM_CENTER),
            index_palm: dist(INDEX_TIP, PALM_CENTER),
            middle_palm: dist(MIDDLE_TIP, PALM_CENTER),
            ring_palm: dist(RING_TIP, PALM_CENTER),
            pinky_palm: dist(PINKY_TIP, PALM_CENTER),
            thumb_index: dist(THUMB_TIP, INDEX_TIP),
        }
    }

    /// Fingertip-to-palm distances in thumb-to-pinky order.
    pub fn fingertip_distances(&self) -> [f64; 5] {
        [
            self.thumb_palm,
            self.index_palm,
            self.middle_palm,
            self.ring_palm,
            self.pinky_palm,
        ]
    }

    pub fn mean_fingertip_distance(&self) -> f64 {
        self.fingertip_distances().iter().sum::<f64>() / 5.0
    }

    pub fn max_fingertip_distance(&self) -> f64 {
        self.fingertip_distances()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LANDMARK_COUNT;

    #[test]
    fn test_extract_measures_3d_distance() {
        let mut raw = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
        raw[THUMB_TIP] = [0.5, 0.5, 0.0];
        raw[INDEX_TIP] = [0.53, 0.54, 0.0];
        raw[PINKY_TIP] = [0.5, 0.5, 0.2];
        let sample = LandmarkSample::from_raw(&raw).unwrap();

        let features = FeatureSet::extract(&sample);
        assert!((features.thumb_index - 0.05).abs() < 1e-9);
        assert!((features.pinky_palm - 0.2).abs() < 1e-9);
        assert_eq!(features.thumb_palm, 0.0);
    }

    #[test]
    fn test_mean_and_max() {
        let features = FeatureSet {
            thumb_palm: 0.1,
            index_palm: 0.2,
            middle_palm: 0.3,
            ring_palm: 0.4,
            pinky_palm: 0.5,
            thumb_index: 0.0,
        };
        assert!((features.mean_fingertip_distance() - 0.3).abs() < 1e-12);
        assert_eq!(features.max_fingertip_distance(), 0.5);
    }
}
