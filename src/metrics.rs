// src/metrics.rs - Rolling per-frame processing time
use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 30;

#[derive(Debug, Clone)]
pub struct FrameMetrics {
    pub avg_fps: f32,
    pub avg_processing_time: f32,
    pub frames: u64,
    frame_times: VecDeque<f32>,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            frames: 0,
            frame_times: VecDeque::with_capacity(WINDOW),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.frame_times.push_front(elapsed.as_secs_f32());
        if self.frame_times.len() > WINDOW {
            self.frame_times.pop_back();
        }

        self.avg_processing_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.avg_fps = if self.avg_processing_time > 0.0 {
            1.0 / self.avg_processing_time
        } else {
            0.0
        };
    }

    /// True once every `WINDOW` frames, for periodic reporting.
    pub fn window_complete(&self) -> bool {
        self.frames > 0 && self.frames % WINDOW as u64 == 0
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average() {
        let mut m = FrameMetrics::new();
        m.record(Duration::from_millis(10));
        m.record(Duration::from_millis(30));
        assert!((m.avg_processing_time - 0.02).abs() < 1e-6);
        assert!((m.avg_fps - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_window_drops_old_frames() {
        let mut m = FrameMetrics::new();
        m.record(Duration::from_secs(1));
        for _ in 0..WINDOW {
            m.record(Duration::from_millis(10));
        }
        assert!((m.avg_processing_time - 0.01).abs() < 1e-6);
        assert!(!m.window_complete());
        for _ in 0..WINDOW - 1 {
            m.record(Duration::from_millis(10));
        }
        assert!(m.window_complete());
    }
}
