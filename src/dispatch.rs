// src/dispatch.rs - Routes pointer commands to an OS pointer backend
use thiserror::Error;
use tracing::{info, warn};

use crate::gesture::{Command, ScrollDirection};
use crate::pointer::{ScreenPoint, SurfaceSize};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend refuses to continue; the frame loop must stop.
    #[error("pointer safety stop: {0}")]
    SafetyStop(String),
    #[error("pointer {action} failed: {reason}")]
    Failed { action: &'static str, reason: String },
}

impl BackendError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SafetyStop(_))
    }
}

/// The OS-facing side of pointer control.
pub trait PointerBackend {
    fn surface_size(&self) -> SurfaceSize;
    fn move_to(&mut self, point: ScreenPoint) -> Result<(), BackendError>;
    fn left_down(&mut self) -> Result<(), BackendError>;
    fn left_up(&mut self) -> Result<(), BackendError>;
    fn right_click(&mut self) -> Result<(), BackendError>;
    /// Positive scrolls up, negative scrolls down.
    fn scroll(&mut self, clicks: i32) -> Result<(), BackendError>;
}

pub struct CommandDispatcher<B> {
    backend: B,
    scroll_step: i32,
}

impl<B: PointerBackend> CommandDispatcher<B> {
    pub fn new(backend: B, scroll_step: i32) -> Self {
        Self {
            backend,
            scroll_step,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn dispatch(&mut self, command: &Command) -> Result<(), BackendError> {
        match *command {
            Command::Move(p) | Command::Drag(p) => self.backend.move_to(p),
            Command::LeftPress => self.backend.left_down(),
            Command::LeftRelease => self.backend.left_up(),
            Command::RightClick => self.backend.right_click(),
            Command::Scroll(ScrollDirection::Up) => self.backend.scroll(self.scroll_step),
            Command::Scroll(ScrollDirection::Down) => {
                self.backend.scroll(self.scroll_step.saturating_neg())
            }
            // the button is already down, nothing to send
            Command::LeftHold | Command::None => Ok(()),
        }
    }
}

/// Raises a safety stop when the pointer is driven into a screen corner.
pub struct CornerGuard<B> {
    inner: B,
    margin: u32,
}

impl<B: PointerBackend> CornerGuard<B> {
    pub fn new(inner: B, margin: u32) -> Self {
        Self { inner, margin }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn in_corner(&self, p: ScreenPoint) -> bool {
        let size = self.inner.surface_size();
        let m = self.margin as i64;
        let (x, y) = (p.x as i64, p.y as i64);
        let right = size.width as i64 - 1;
        let bottom = size.height as i64 - 1;

        let near_left = x <= m;
        let near_right = x >= right - m;
        let near_top = y <= m;
        let near_bottom = y >= bottom - m;

        (near_left || near_right) && (near_top || near_bottom)
    }
}

impl<B: PointerBackend> PointerBackend for CornerGuard<B> {
    fn surface_size(&self) -> SurfaceSize {
        self.inner.surface_size()
    }

    fn move_to(&mut self, point: ScreenPoint) -> Result<(), BackendError> {
        if self.in_corner(point) {
            return Err(BackendError::SafetyStop(format!(
                "pointer reached screen corner at ({}, {})",
                point.x, point.y
            )));
        }
        self.inner.move_to(point)
    }

    fn left_down(&mut self) -> Result<(), BackendError> {
        self.inner.left_down()
    }

    fn left_up(&mut self) -> Result<(), BackendError> {
        self.inner.left_up()
    }

    fn right_click(&mut self) -> Result<(), BackendError> {
        self.inner.right_click()
    }

    fn scroll(&mut self, clicks: i32) -> Result<(), BackendError> {
        self.inner.scroll(clicks)
    }
}

impl<B: PointerBackend + ?Sized> PointerBackend for Box<B> {
    fn surface_size(&self) -> SurfaceSize {
        (**self).surface_size()
    }

    fn move_to(&mut self, point: ScreenPoint) -> Result<(), BackendError> {
        (**self).move_to(point)
    }

    fn left_down(&mut self) -> Result<(), BackendError> {
        (**self).left_down()
    }

    fn left_up(&mut self) -> Result<(), BackendError> {
        (**self).left_up()
    }

    fn right_click(&mut self) -> Result<(), BackendError> {
        (**self).right_click()
    }

    fn scroll(&mut self, clicks: i32) -> Result<(), BackendError> {
        (**self).scroll(clicks)
    }
}

/// Backend call as observed by [`RecordingBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    MoveTo(ScreenPoint),
    LeftDown,
    LeftUp,
    RightClick,
    Scroll(i32),
}

/// Keeps every call in memory. Used for dry runs and tests; can be told to
/// fail the next call.
pub struct RecordingBackend {
    surface: SurfaceSize,
    calls: Vec<BackendCall>,
    fail_next: Option<BackendError>,
}

impl RecordingBackend {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            calls: Vec::new(),
            fail_next: None,
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn fail_next(&mut self, error: BackendError) {
        self.fail_next = Some(error);
    }

    fn record(&mut self, call: BackendCall) -> Result<(), BackendError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl PointerBackend for RecordingBackend {
    fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    fn move_to(&mut self, point: ScreenPoint) -> Result<(), BackendError> {
        self.record(BackendCall::MoveTo(point))
    }

    fn left_down(&mut self) -> Result<(), BackendError> {
        self.record(BackendCall::LeftDown)
    }

    fn left_up(&mut self) -> Result<(), BackendError> {
        self.record(BackendCall::LeftUp)
    }

    fn right_click(&mut self) -> Result<(), BackendError> {
        self.record(BackendCall::RightClick)
    }

    fn scroll(&mut self, clicks: i32) -> Result<(), BackendError> {
        self.record(BackendCall::Scroll(clicks))
    }
}

/// Writes every discrete action to the log instead of touching the OS pointer.
pub struct LogBackend {
    surface: SurfaceSize,
}

impl LogBackend {
    pub fn new(surface: SurfaceSize) -> Self {
        Self { surface }
    }
}

impl PointerBackend for LogBackend {
    fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    fn move_to(&mut self, point: ScreenPoint) -> Result<(), BackendError> {
        tracing::trace!("move to ({}, {})", point.x, point.y);
        Ok(())
    }

    fn left_down(&mut self) -> Result<(), BackendError> {
        info!("left button down");
        Ok(())
    }

    fn left_up(&mut self) -> Result<(), BackendError> {
        info!("left button up");
        Ok(())
    }

    fn right_click(&mut self) -> Result<(), BackendError> {
        info!("right click");
        Ok(())
    }

    fn scroll(&mut self, clicks: i32) -> Result<(), BackendError> {
        if clicks == 0 {
            warn!("ignoring zero-length scroll");
        } else {
            info!("scroll {} {}", if clicks > 0 { "up" } else { "down" }, clicks.abs());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SurfaceSize {
        SurfaceSize::new(1920, 1080)
    }

    #[test]
    fn test_dispatch_routes_commands() {
        let mut d = CommandDispatcher::new(RecordingBackend::new(surface()), 24);
        let commands = [
            Command::Move(ScreenPoint::new(10, 20)),
            Command::LeftPress,
            Command::LeftHold,
            Command::Drag(ScreenPoint::new(30, 40)),
            Command::LeftRelease,
            Command::RightClick,
            Command::Scroll(ScrollDirection::Up),
            Command::Scroll(ScrollDirection::Down),
            Command::None,
        ];
        for cmd in &commands {
            d.dispatch(cmd).unwrap();
        }

        assert_eq!(
            d.backend().calls(),
            &[
                BackendCall::MoveTo(ScreenPoint::new(10, 20)),
                BackendCall::LeftDown,
                BackendCall::MoveTo(ScreenPoint::new(30, 40)),
                BackendCall::LeftUp,
                BackendCall::RightClick,
                BackendCall::Scroll(24),
                BackendCall::Scroll(-24),
            ]
        );
    }

    #[test]
    fn test_transient_failure_is_not_fatal() {
        let mut d = CommandDispatcher::new(RecordingBackend::new(surface()), 24);
        d.backend_mut().fail_next(BackendError::Failed {
            action: "right_click",
            reason: "busy".into(),
        });
        let err = d.dispatch(&Command::RightClick).unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "pointer right_click failed: busy");
        d.dispatch(&Command::RightClick).unwrap();
        assert_eq!(d.backend().calls(), &[BackendCall::RightClick]);
    }

    #[test]
    fn test_corner_guard_stops_in_corners() {
        let mut guard = CornerGuard::new(RecordingBackend::new(surface()), 0);
        let err = guard.move_to(ScreenPoint::new(0, 0)).unwrap_err();
        assert!(err.is_fatal());
        assert!(guard.move_to(ScreenPoint::new(1919, 1079)).unwrap_err().is_fatal());
        // edges away from corners are fine
        guard.move_to(ScreenPoint::new(0, 500)).unwrap();
        guard.move_to(ScreenPoint::new(900, 1079)).unwrap();
        assert_eq!(guard.inner().calls().len(), 2);
    }

    #[test]
    fn test_corner_guard_margin() {
        let mut guard = CornerGuard::new(RecordingBackend::new(surface()), 5);
        assert!(guard.move_to(ScreenPoint::new(1915, 3)).is_err());
        assert!(guard.move_to(ScreenPoint::new(1913, 3)).is_ok());
    }
}
