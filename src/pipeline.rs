// src/pipeline.rs - Single-sample entry point tying the stages together
//
// Each call to `GesturePipeline::process` runs one frame through feature
// extraction, pose classification, the gesture state machine, pointer
// mapping and dispatch. There is no loop here; whoever owns the camera
// decides when the next sample arrives.

use std::time::Instant;

use tracing::{debug, error, warn};

use crate::config::{ConfigError, GestureConfig};
use crate::dispatch::{BackendError, CommandDispatcher, PointerBackend};
use crate::features::FeatureSet;
use crate::gesture::{Command, GestureEngine, GestureSession, GestureStatus, HandObservation};
use crate::landmarks::{FrameSize, LandmarkSample};
use crate::pointer::PointerMapper;
use crate::pose::{PoseClassifier, PoseLabel};

/// Outcome of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// `None` when no hand was tracked.
    pub pose: Option<PoseLabel>,
    pub command: Command,
    pub status: GestureStatus,
    /// A non-fatal backend failure; the session carried on regardless.
    pub backend_error: Option<BackendError>,
}

pub struct GesturePipeline<B> {
    classifier: PoseClassifier,
    engine: GestureEngine,
    session: GestureSession,
    mapper: PointerMapper,
    dispatcher: CommandDispatcher<B>,
    last_pose: Option<PoseLabel>,
}

impl<B: PointerBackend> GesturePipeline<B> {
    /// Fails if `config` does not pass [`GestureConfig::validate`].
    pub fn new(config: &GestureConfig, backend: B) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = backend.surface_size();
        Ok(Self {
            classifier: PoseClassifier::new(config.classifier.clone()),
            engine: GestureEngine::new(config.timing.clone())?,
            session: GestureSession::new(),
            mapper: PointerMapper::new(config.pointer.clone(), surface),
            dispatcher: CommandDispatcher::new(backend, config.pointer.scroll_step),
            last_pose: None,
        })
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn mapper(&self) -> &PointerMapper {
        &self.mapper
    }

    pub fn backend(&self) -> &B {
        self.dispatcher.backend()
    }

    pub fn into_backend(self) -> B {
        self.dispatcher.into_backend()
    }

    pub fn classify(&self, sample: &LandmarkSample) -> PoseLabel {
        self.classifier.classify(&FeatureSet::extract(sample))
    }

    /// Runs one frame. Only a backend safety stop is returned as an error;
    /// the caller should end its frame loop on it.
    pub fn process(
        &mut self,
        sample: Option<&LandmarkSample>,
        frame: FrameSize,
        now: Instant,
    ) -> Result<FrameReport, BackendError> {
        let pose = sample.map(|s| self.classify(s));
        if pose != self.last_pose {
            debug!(
                "Pose changed: {} -> {}",
                self.last_pose.map_or("no hand", |p| p.as_str()),
                pose.map_or("no hand", |p| p.as_str())
            );
            self.last_pose = pose;
        }

        let observation = sample
            .zip(pose)
            .map(|(s, p)| HandObservation::from_sample(p, s, frame));
        let gesture = self
            .engine
            .step(&mut self.session, observation.as_ref(), now);

        if !gesture.moves_pointer() {
            self.mapper.reset();
        }
        let mapper = &mut self.mapper;
        let command = gesture.map_position(|p| mapper.update(p, frame));

        let backend_error = match self.dispatcher.dispatch(&command) {
            Ok(()) => None,
            Err(e) if e.is_fatal() => {
                error!("{}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("{}", e);
                Some(e)
            }
        };

        Ok(FrameReport {
            pose,
            command,
            status: self.session.status(),
            backend_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{BackendCall, RecordingBackend};
    use crate::landmarks::{INDEX_TIP, LANDMARK_COUNT, MIDDLE_TIP, PALM_CENTER, PINKY_TIP, RING_TIP, THUMB_TIP};
    use crate::pointer::{ScreenPoint, SurfaceSize};
    use std::time::Duration;

    fn index_only_hand(x: f64, y: f64) -> LandmarkSample {
        let mut raw = vec![[x, y + 0.2, 0.0]; LANDMARK_COUNT];
        raw[PALM_CENTER] = [x, y + 0.2, 0.0];
        raw[INDEX_TIP] = [x, y, 0.0];
        raw[THUMB_TIP] = [x + 0.05, y + 0.2, 0.0];
        for tip in [MIDDLE_TIP, RING_TIP, PINKY_TIP] {
            raw[tip] = [x, y + 0.15, 0.0];
        }
        LandmarkSample::from_raw(&raw).unwrap()
    }

    fn pipeline() -> GesturePipeline<RecordingBackend> {
        GesturePipeline::new(
            &GestureConfig::default(),
            RecordingBackend::new(SurfaceSize::new(1920, 1080)),
        )
        .unwrap()
    }

    #[test]
    fn test_index_only_hand_moves_pointer() {
        let mut p = pipeline();
        let sample = index_only_hand(0.5, 0.5);
        assert_eq!(p.classify(&sample), PoseLabel::IndexOnly);

        let report = p
            .process(Some(&sample), FrameSize::default(), Instant::now())
            .unwrap();
        assert_eq!(report.command, Command::Move(ScreenPoint::new(960, 540)));
        assert_eq!(report.status, GestureStatus::Move);
        assert_eq!(
            p.backend().calls(),
            &[BackendCall::MoveTo(ScreenPoint::new(960, 540))]
        );
    }

    #[test]
    fn test_no_hand_clears_smoothing() {
        let mut p = pipeline();
        let t0 = Instant::now();
        p.process(Some(&index_only_hand(0.2, 0.2)), FrameSize::default(), t0)
            .unwrap();
        assert!(!p.mapper().smoothing().is_empty());

        let report = p
            .process(None, FrameSize::default(), t0 + Duration::from_millis(33))
            .unwrap();
        assert_eq!(report.pose, None);
        assert_eq!(report.command, Command::None);
        assert!(p.mapper().smoothing().is_empty());
    }

    #[test]
    fn test_transient_failure_is_reported() {
        let mut p = pipeline();
        p.dispatcher.backend_mut().fail_next(BackendError::Failed {
            action: "move",
            reason: "display busy".into(),
        });

        let report = p
            .process(Some(&index_only_hand(0.5, 0.5)), FrameSize::default(), Instant::now())
            .unwrap();
        assert!(report.backend_error.is_some());
        assert_eq!(report.status, GestureStatus::Move);
    }

    #[test]
    fn test_safety_stop_is_fatal() {
        let mut p = pipeline();
        p.dispatcher
            .backend_mut()
            .fail_next(BackendError::SafetyStop("corner".into()));

        let err = p
            .process(Some(&index_only_hand(0.5, 0.5)), FrameSize::default(), Instant::now())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_rejects_out_of_range_timing() {
        let mut config = GestureConfig::default();
        config.timing.click_cooldown = 1e20;
        let result = GesturePipeline::new(&config, RecordingBackend::new(SurfaceSize::new(1920, 1080)));
        assert!(matches!(
            result.err(),
            Some(ConfigError::DurationOutOfRange {
                field: "click_cooldown",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_frame_does_not_poison_smoothing() {
        let mut p = pipeline();
        let t0 = Instant::now();
        let sample = index_only_hand(0.5, 0.5);

        p.process(Some(&sample), FrameSize::new(0, 480), t0).unwrap();
        for i in 1..3 {
            let report = p
                .process(Some(&sample), FrameSize::default(), t0 + Duration::from_millis(i * 33))
                .unwrap();
            assert_eq!(report.command, Command::Move(ScreenPoint::new(960, 540)));
        }
        assert_eq!(p.mapper().smoothing().previous(), Some((960.0, 540.0)));
    }
}
