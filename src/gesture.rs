// src/gesture.rs - Temporal gesture recognition
//
// Turns the per-frame `PoseLabel` stream into pointer `Command`s. The pinch
// press/hold/drag lifecycle, per-action cooldowns and open-hand swipe
// tracking live in a `GestureSession` that the caller owns and hands to
// `GestureEngine::step` once per frame.

use std::fmt;
use std::time::{Duration, Instant};

use nalgebra::Point2;
use tracing::debug;

use crate::config::{ConfigError, TimingConfig};
use crate::landmarks::{FrameSize, LandmarkSample, INDEX_TIP};
use crate::pointer::ScreenPoint;
use crate::pose::PoseLabel;

/// Position in source-frame pixels.
pub type FramePoint = Point2<f64>;

// ── Commands ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One pointer action per frame. `P` is the coordinate space carried by
/// `Move` and `Drag`: frame pixels coming out of the state machine, screen
/// pixels once the pointer mapper has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command<P = ScreenPoint> {
    Move(P),
    LeftPress,
    LeftHold,
    LeftRelease,
    RightClick,
    Drag(P),
    Scroll(ScrollDirection),
    None,
}

impl<P> Command<P> {
    pub fn map_position<Q>(self, f: impl FnOnce(P) -> Q) -> Command<Q> {
        match self {
            Self::Move(p) => Command::Move(f(p)),
            Self::Drag(p) => Command::Drag(f(p)),
            Self::LeftPress => Command::LeftPress,
            Self::LeftHold => Command::LeftHold,
            Self::LeftRelease => Command::LeftRelease,
            Self::RightClick => Command::RightClick,
            Self::Scroll(dir) => Command::Scroll(dir),
            Self::None => Command::None,
        }
    }

    pub fn position(&self) -> Option<&P> {
        match self {
            Self::Move(p) | Self::Drag(p) => Some(p),
            _ => None,
        }
    }

    pub fn moves_pointer(&self) -> bool {
        self.position().is_some()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::LeftPress => "left_press",
            Self::LeftHold => "left_hold",
            Self::LeftRelease => "left_release",
            Self::RightClick => "right_click",
            Self::Drag(_) => "drag",
            Self::Scroll(_) => "scroll",
            Self::None => "none",
        }
    }
}

// ── Status ─────────────────────────────────────────────────

/// What the state machine decided on the latest frame, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureStatus {
    #[default]
    NoHand,
    PinchStart,
    PinchHold,
    PinchDrag,
    PinchCooldown,
    PinchRelease,
    RightClick,
    FistCooldown,
    Move,
    ThumbIndexOpen,
    ScrollUp,
    ScrollDown,
    OpenHandReady,
    Idle,
}

impl fmt::Display for GestureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoHand => "None",
            Self::PinchStart => "Pinch Start (Left Press)",
            Self::PinchHold => "Pinch Hold (Holding)",
            Self::PinchDrag => "Pinch Hold + Move (Dragging)",
            Self::PinchCooldown => "Pinch (Cooldown)",
            Self::PinchRelease => "Pinch Release",
            Self::RightClick => "Fist (Right Click)",
            Self::FistCooldown => "Fist (Cooldown)",
            Self::Move => "Move (Index Only)",
            Self::ThumbIndexOpen => "Thumb + Index Open (No Action)",
            Self::ScrollUp => "Open Hand Swipe Down (Scroll UP)",
            Self::ScrollDown => "Open Hand Swipe Up (Scroll DOWN)",
            Self::OpenHandReady => "Open Hand Ready",
            Self::Idle => "Idle",
        };
        f.write_str(text)
    }
}

// ── Session ────────────────────────────────────────────────

/// Everything the state machine remembers between frames.
#[derive(Debug, Clone, Default)]
pub struct GestureSession {
    pinch_active: bool,
    pinch_started: Option<Instant>,
    last_left_click: Option<Instant>,
    last_right_click: Option<Instant>,
    last_scroll: Option<Instant>,
    /// Palm Y (normalized) the current swipe is measured from.
    open_hand_ref_y: Option<f64>,
    status: GestureStatus,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pinch_active(&self) -> bool {
        self.pinch_active
    }

    pub fn pinch_started(&self) -> Option<Instant> {
        self.pinch_started
    }

    pub fn last_left_click(&self) -> Option<Instant> {
        self.last_left_click
    }

    pub fn last_right_click(&self) -> Option<Instant> {
        self.last_right_click
    }

    pub fn last_scroll(&self) -> Option<Instant> {
        self.last_scroll
    }

    pub fn open_hand_ref_y(&self) -> Option<f64> {
        self.open_hand_ref_y
    }

    pub fn status(&self) -> GestureStatus {
        self.status
    }

    /// Drops in-progress gestures. Cooldown timers survive.
    fn reset_tracking(&mut self) {
        self.pinch_active = false;
        self.pinch_started = None;
        self.open_hand_ref_y = None;
    }
}

// ── Per-frame input ────────────────────────────────────────

/// The parts of a tracked hand the state machine looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandObservation {
    pub pose: PoseLabel,
    /// Index fingertip in frame pixels; drives move and drag.
    pub pointer: FramePoint,
    /// Palm-center Y, normalized to the frame height; drives swipes.
    pub palm_y: f64,
}

impl HandObservation {
    pub fn from_sample(pose: PoseLabel, sample: &LandmarkSample, frame: FrameSize) -> Self {
        Self {
            pose,
            pointer: sample.pixel_position(INDEX_TIP, frame),
            palm_y: sample.palm().y,
        }
    }
}

// ── Engine ─────────────────────────────────────────────────

fn cooled_down(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    last.map_or(true, |t| now.saturating_duration_since(t) > cooldown)
}

pub struct GestureEngine {
    timing: TimingConfig,
    click_cooldown: Duration,
    scroll_cooldown: Duration,
    drag_activation: Duration,
}

impl GestureEngine {
    pub fn new(timing: TimingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            click_cooldown: timing.click_cooldown()?,
            scroll_cooldown: timing.scroll_cooldown()?,
            drag_activation: timing.drag_activation()?,
            timing,
        })
    }

    /// Advances the session by one frame. `None` for `hand` means the
    /// tracker found no hand; that ends any gesture in progress.
    pub fn step(
        &self,
        session: &mut GestureSession,
        hand: Option<&HandObservation>,
        now: Instant,
    ) -> Command<FramePoint> {
        let Some(hand) = hand else {
            if session.pinch_active {
                debug!("Hand lost during pinch, dropping gesture state");
            }
            session.reset_tracking();
            session.status = GestureStatus::NoHand;
            return Command::None;
        };

        if hand.pose != PoseLabel::OpenHand {
            session.open_hand_ref_y = None;
        }

        if hand.pose == PoseLabel::Pinch {
            return self.pinch(session, hand, now);
        }

        if session.pinch_active {
            session.pinch_active = false;
            session.pinch_started = None;
            session.status = GestureStatus::PinchRelease;
            debug!("Pinch released ({})", hand.pose);
            return Command::LeftRelease;
        }

        match hand.pose {
            PoseLabel::Fist => {
                if cooled_down(session.last_right_click, now, self.click_cooldown) {
                    session.last_right_click = Some(now);
                    session.status = GestureStatus::RightClick;
                    debug!("Fist detected, right click");
                    Command::RightClick
                } else {
                    session.status = GestureStatus::FistCooldown;
                    Command::None
                }
            }
            PoseLabel::IndexOnly => {
                session.status = GestureStatus::Move;
                Command::Move(hand.pointer)
            }
            PoseLabel::ThumbIndexOpen => {
                session.status = GestureStatus::ThumbIndexOpen;
                Command::None
            }
            PoseLabel::OpenHand => self.swipe(session, hand.palm_y, now),
            PoseLabel::Idle | PoseLabel::Pinch => {
                session.status = GestureStatus::Idle;
                Command::None
            }
        }
    }

    fn pinch(
        &self,
        session: &mut GestureSession,
        hand: &HandObservation,
        now: Instant,
    ) -> Command<FramePoint> {
        if session.pinch_active {
            let held = session
                .pinch_started
                .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));

            if held > self.drag_activation {
                if session.status != GestureStatus::PinchDrag {
                    debug!("Pinch held {:.2}s, dragging", held.as_secs_f64());
                }
                session.status = GestureStatus::PinchDrag;
                Command::Drag(hand.pointer)
            } else {
                session.status = GestureStatus::PinchHold;
                Command::LeftHold
            }
        } else if cooled_down(session.last_left_click, now, self.click_cooldown) {
            session.pinch_active = true;
            session.pinch_started = Some(now);
            session.last_left_click = Some(now);
            session.status = GestureStatus::PinchStart;
            debug!("Pinch started, left press");
            Command::LeftPress
        } else {
            session.status = GestureStatus::PinchCooldown;
            Command::None
        }
    }

    fn swipe(&self, session: &mut GestureSession, palm_y: f64, now: Instant) -> Command<FramePoint> {
        session.status = GestureStatus::OpenHandReady;

        let Some(ref_y) = session.open_hand_ref_y else {
            session.open_hand_ref_y = Some(palm_y);
            return Command::None;
        };

        // image Y grows downward, so a positive delta means the palm rose
        let delta = ref_y - palm_y;
        if delta.abs() <= self.timing.swipe_threshold {
            return Command::None;
        }

        // the reference follows the hand so one long swipe scrolls repeatedly
        session.open_hand_ref_y = Some(palm_y);

        if !cooled_down(session.last_scroll, now, self.scroll_cooldown) {
            return Command::None;
        }
        session.last_scroll = Some(now);

        // inverted: palm rising scrolls down, palm falling scrolls up
        let direction = if delta > 0.0 {
            session.status = GestureStatus::ScrollDown;
            ScrollDirection::Down
        } else {
            session.status = GestureStatus::ScrollUp;
            ScrollDirection::Up
        };
        debug!("Swipe delta {:.3}, scroll {}", delta, direction.as_str());
        Command::Scroll(direction)
    }
}

// ── Tests ──────────────────────────────────────────────────
