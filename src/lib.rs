// src/lib.rs - Hand-gesture pointer control
//
// Converts per-frame hand landmark samples into pointer commands (move,
// press/release, click, drag, scroll) using geometric thresholds and
// elapsed-time bookkeeping. Camera capture, landmark estimation and OS
// pointer injection stay outside; landmarks come in and commands go out.

pub mod config;
pub mod dispatch;
pub mod features;
pub mod gesture;
pub mod landmarks;
pub mod metrics;
pub mod pipeline;
pub mod pointer;
pub mod pose;
pub mod replay;

pub use config::GestureConfig;
pub use dispatch::{BackendError, CommandDispatcher, PointerBackend};
pub use features::FeatureSet;
pub use gesture::{Command, GestureEngine, GestureSession, GestureStatus, ScrollDirection};
pub use landmarks::{FrameSize, LandmarkSample};
pub use pipeline::{FrameReport, GesturePipeline};
pub use pointer::{PointerMapper, ScreenPoint, SurfaceSize};
pub use pose::{PoseClassifier, PoseLabel};
