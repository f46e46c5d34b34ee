// src/replay.rs - JSON-lines recordings of tracker output
//
// One frame per line:
//   {"t": 0.033, "frame": [640, 480], "landmarks": [[x, y, z], ...]}
// `landmarks` is null (or absent) when no hand was detected. `frame` is
// optional and falls back to the caller's default size.
use std::io::BufRead;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use crate::landmarks::{FrameSize, LandmarkError, LandmarkSample};

/// Longest recording offset accepted, one week.
pub const MAX_OFFSET_SECS: f64 = 7.0 * 24.0 * 3600.0;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: {source}")]
    Landmarks {
        line: usize,
        #[source]
        source: LandmarkError,
    },
    #[error("line {line}: timestamp {t} is out of range or goes backwards")]
    Timestamp { line: usize, t: f64 },
    #[error("line {line}: frame size must be non-zero (got {width}x{height})")]
    EmptyFrame { line: usize, width: u32, height: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    t: f64,
    #[serde(default)]
    frame: Option<(u32, u32)>,
    #[serde(default)]
    landmarks: Option<Vec<[f64; 3]>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    /// Offset from the start of the recording.
    pub offset: Duration,
    pub frame: FrameSize,
    pub sample: Option<LandmarkSample>,
}

impl RecordedFrame {
    /// `None` if the offset does not fit after `base` on this platform's clock.
    pub fn timestamp(&self, base: Instant) -> Option<Instant> {
        base.checked_add(self.offset)
    }
}

/// Streams frames from a reader, skipping blank lines and `#` comments.
pub struct ReplayReader<R> {
    reader: R,
    default_frame: FrameSize,
    line: usize,
    last_t: f64,
    buf: String,
}

impl<R: BufRead> ReplayReader<R> {
    pub fn new(reader: R, default_frame: FrameSize) -> Self {
        Self {
            reader,
            default_frame,
            line: 0,
            last_t: 0.0,
            buf: String::new(),
        }
    }

    fn parse_line(&mut self, text: &str) -> Result<RecordedFrame, ReplayError> {
        let line = self.line;
        let raw: RawFrame =
            serde_json::from_str(text).map_err(|source| ReplayError::Parse { line, source })?;

        if !raw.t.is_finite() || raw.t < self.last_t || raw.t > MAX_OFFSET_SECS {
            return Err(ReplayError::Timestamp { line, t: raw.t });
        }
        let offset = Duration::try_from_secs_f64(raw.t)
            .map_err(|_| ReplayError::Timestamp { line, t: raw.t })?;
        self.last_t = raw.t;

        let frame = raw
            .frame
            .map_or(self.default_frame, |(w, h)| FrameSize::new(w, h));
        if frame.is_empty() {
            return Err(ReplayError::EmptyFrame {
                line,
                width: frame.width,
                height: frame.height,
            });
        }

        let sample = raw
            .landmarks
            .map(|lms| LandmarkSample::from_raw(&lms))
            .transpose()
            .map_err(|source| ReplayError::Landmarks { line, source })?;

        Ok(RecordedFrame {
            offset,
            frame,
            sample,
        })
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = Result<RecordedFrame, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = self.buf.trim().to_string();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some(self.parse_line(&text));
        }
    }
}
