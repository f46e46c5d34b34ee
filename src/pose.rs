// src/pose.rs - Static hand pose classification from fingertip distances
use std::fmt;

use crate::config::ClassifierConfig;
use crate::features::FeatureSet;

/// Single-frame hand shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoseLabel {
    /// Thumb and index fingertips touching.
    Pinch,
    /// All fingertips folded onto the palm.
    Fist,
    /// Index extended, middle/ring/pinky curled.
    IndexOnly,
    /// Thumb and index spread apart, not pinching.
    ThumbIndexOpen,
    /// All five fingers extended.
    OpenHand,
    #[default]
    Idle,
}

impl PoseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::Fist => "fist",
            Self::IndexOnly => "index-only",
            Self::ThumbIndexOpen => "thumb-index-open",
            Self::OpenHand => "open-hand",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PoseClassifier {
    config: ClassifierConfig,
}

impl PoseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// First matching rule wins: Pinch, Fist, IndexOnly, ThumbIndexOpen, OpenHand, Idle.
    pub fn classify(&self, features: &FeatureSet) -> PoseLabel {
        if self.is_pinch(features) {
            PoseLabel::Pinch
        } else if self.is_fist(features) {
            PoseLabel::Fist
        } else if self.is_index_only(features) {
            PoseLabel::IndexOnly
        } else if self.is_thumb_index_open(features) {
            PoseLabel::ThumbIndexOpen
        } else if self.is_open_hand(features) {
            PoseLabel::OpenHand
        } else {
            PoseLabel::Idle
        }
    }

    fn is_pinch(&self, f: &FeatureSet) -> bool {
        f.thumb_index < self.config.pinch_threshold
    }

    fn is_fist(&self, f: &FeatureSet) -> bool {
        let c = &self.config;
        f.mean_fingertip_distance() < c.fist_threshold
            && f.max_fingertip_distance() < c.fist_threshold * 2.0
            // an extended thumb or index is never a fist
            && f.thumb_palm < c.fist_finger_bound
            && f.index_palm < c.fist_finger_bound
    }

    fn is_index_only(&self, f: &FeatureSet) -> bool {
        let c = &self.config;
        f.index_palm > c.index_extended
            && f.middle_palm < c.finger_curled
            && f.ring_palm < c.finger_curled
            && f.pinky_palm < c.finger_curled
    }

    fn is_thumb_index_open(&self, f: &FeatureSet) -> bool {
        let c = &self.config;
        let both_extended = f.thumb_palm > c.thumb_open_extended && f.index_palm > c.index_open_extended;
        let not_pinching = f.thumb_index > c.pinch_threshold;
        // with the other three fingers out as well it is an open hand
        both_extended && not_pinching && !self.rest_extended(f)
    }

    fn is_open_hand(&self, f: &FeatureSet) -> bool {
        let c = &self.config;
        f.thumb_palm > c.open_thumb_extended
            && f.index_palm > c.open_index_extended
            && self.rest_extended(f)
    }

    fn rest_extended(&self, f: &FeatureSet) -> bool {
        let bound = self.config.open_finger_extended;
        f.middle_palm > bound && f.ring_palm > bound && f.pinky_palm > bound
    }
}
