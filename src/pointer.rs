// src/pointer.rs - Frame-to-screen coordinate mapping with exponential smoothing
use nalgebra::{Point2, Vector2};

use crate::config::PointerConfig;
use crate::landmarks::FrameSize;

/// Integer pixel position on the target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Last smoothed position, absent until the first mapped sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothingState {
    prev: Option<Vector2<f64>>,
}

impl SmoothingState {
    pub fn previous(&self) -> Option<(f64, f64)> {
        self.prev.map(|p| (p.x, p.y))
    }

    pub fn is_empty(&self) -> bool {
        self.prev.is_none()
    }

    pub fn clear(&mut self) {
        self.prev = None;
    }
}

pub struct PointerMapper {
    config: PointerConfig,
    surface: SurfaceSize,
    smoothing: SmoothingState,
}

impl PointerMapper {
    pub fn new(config: PointerConfig, surface: SurfaceSize) -> Self {
        Self {
            config,
            surface,
            smoothing: SmoothingState::default(),
        }
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    /// Frames that do not move the pointer must call this so the next
    /// movement starts from a fresh sample instead of a stale anchor.
    pub fn reset(&mut self) {
        self.smoothing.clear();
    }

    /// Maps a frame-pixel position into padded screen space, clamped to the surface.
    pub fn map(&self, position: Point2<f64>, frame: FrameSize) -> Vector2<f64> {
        let norm_x = position.x / frame.width.max(1) as f64;
        let norm_y = position.y / frame.height.max(1) as f64;

        let pad = self.config.edge_padding as f64;
        let w = self.surface.width as f64;
        let h = self.surface.height as f64;

        let x = pad + norm_x * (w - 2.0 * pad);
        let y = pad + norm_y * (h - 2.0 * pad);

        let x = x.clamp(0.0, (w - 1.0).max(0.0)).trunc();
        let y = y.clamp(0.0, (h - 1.0).max(0.0)).trunc();

        Vector2::new(x, y)
    }

    /// Maps and smooths one sample, updating the smoothing state.
    ///
    /// A sample from an empty frame carries no position: the pointer stays
    /// at the last smoothed point and the state is left alone.
    pub fn update(&mut self, position: Point2<f64>, frame: FrameSize) -> ScreenPoint {
        let current = self.map(position, frame);
        if frame.is_empty() {
            let held = self.smoothing.prev.unwrap_or(current);
            return ScreenPoint::new(held.x as i32, held.y as i32);
        }

        let factor = self.config.smoothing_factor;

        let smoothed = match self.smoothing.prev {
            Some(prev) => prev * factor + current * (1.0 - factor),
            None => current,
        };
        self.smoothing.prev = Some(smoothed);

        ScreenPoint::new(smoothed.x as i32, smoothed.y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PointerMapper {
        PointerMapper::new(PointerConfig::default(), SurfaceSize::new(1920, 1080))
    }

    const FRAME: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    #[test]
    fn test_map_applies_padding() {
        let m = mapper();
        assert_eq!(m.map(Point2::new(0.0, 0.0), FRAME), Vector2::new(50.0, 50.0));
        assert_eq!(
            m.map(Point2::new(320.0, 240.0), FRAME),
            Vector2::new(960.0, 540.0)
        );
        assert_eq!(
            m.map(Point2::new(640.0, 480.0), FRAME),
            Vector2::new(1870.0, 1030.0)
        );
    }

    #[test]
    fn test_map_clamps_to_surface() {
        let m = mapper();
        assert_eq!(
            m.map(Point2::new(-200.0, 900.0), FRAME),
            Vector2::new(0.0, 1079.0)
        );
    }

    #[test]
    fn test_first_sample_is_unsmoothed() {
        let mut m = mapper();
        assert!(m.smoothing().is_empty());
        let p = m.update(Point2::new(320.0, 240.0), FRAME);
        assert_eq!(p, ScreenPoint::new(960, 540));
        assert_eq!(m.smoothing().previous(), Some((960.0, 540.0)));
    }

    #[test]
    fn test_smoothing_blends_with_previous() {
        let mut m = mapper();
        m.update(Point2::new(0.0, 0.0), FRAME);
        let p = m.update(Point2::new(320.0, 240.0), FRAME);
        assert_eq!(p, ScreenPoint::new(505, 295));
    }

    #[test]
    fn test_reset_drops_anchor() {
        let mut m = mapper();
        m.update(Point2::new(0.0, 0.0), FRAME);
        m.reset();
        let p = m.update(Point2::new(320.0, 240.0), FRAME);
        assert_eq!(p, ScreenPoint::new(960, 540));
    }

    #[test]
    fn test_repeated_sample_is_stable() {
        let mut m = mapper();
        let first = m.update(Point2::new(123.0, 321.0), FRAME);
        for _ in 0..5 {
            assert_eq!(m.update(Point2::new(123.0, 321.0), FRAME), first);
        }
    }

    #[test]
    fn test_empty_frame_leaves_state_alone() {
        let mut m = mapper();
        let held = m.update(Point2::new(0.0, 240.0), FrameSize::new(0, 480));
        assert!(m.smoothing().is_empty());
        assert_eq!(held, ScreenPoint::new(50, 540));

        assert_eq!(m.update(Point2::new(320.0, 240.0), FRAME), ScreenPoint::new(960, 540));
        assert_eq!(
            m.update(Point2::new(0.0, 240.0), FrameSize::new(640, 0)),
            ScreenPoint::new(960, 540)
        );
        assert_eq!(m.smoothing().previous(), Some((960.0, 540.0)));
    }
}
