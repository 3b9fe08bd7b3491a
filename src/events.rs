// WaveCtl — System Events & Data Types

use crate::config::SENSOR_COUNT;

// ---------------------------------------------------------------------------
// Sensor Data (one ranging tick across all three ToF sensors)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeSample {
    /// Monotonic milliseconds since boot; non-decreasing across samples.
    pub t_ms: u32,
    /// Per-sensor distance in mm; `None` = no reading this tick.
    pub mm: [Option<u16>; SENSOR_COUNT],
}

// ---------------------------------------------------------------------------
// Gesture Classification
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureDir {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
    Tap,
}

impl GestureDir {
    /// Human-readable label (kept for debugging/logging purposes).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Tap => "tap",
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline status — returned by the detector, surfaced by the control task
// ---------------------------------------------------------------------------

/// Why `finalize` refused to promote an episode to a gesture candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Fewer than two accepted samples.
    TooFewSamples,
    /// Episode span below the minimum duration.
    TooShort,
    /// Neither the swing floor nor the velocity floor was cleared.
    WeakMotion,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooFewSamples => "sample count < 2",
            Self::TooShort => "duration too short",
            Self::WeakMotion => "weak swing + weak velocity",
        }
    }
}

/// Observable side effects of one detector step. The detector returns these
/// instead of touching the LED or the log itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Idle-state tick — drive the passive idle indicator.
    Idle,
    /// An episode just started tracking.
    Busy,
    /// An episode was discarded at finalization.
    EpisodeRejected(RejectReason),
}

// ---------------------------------------------------------------------------
// Control Events — sent to the control task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
pub enum ControlEvent {
    /// A finalized episode classified to a real gesture.
    Gesture(GestureDir),
    /// Pipeline status change worth surfacing.
    Status(StatusEvent),
}

// ---------------------------------------------------------------------------
// Transport Commands — what gestures mean to the (external) audio player
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    PlayPause,
    PreviousTrack,
    NextTrack,
    VolumeUp,
    VolumeDown,
}

impl TransportCommand {
    /// Map a classified gesture to a transport action. `GestureDir::None`
    /// maps to nothing and is never dispatched.
    pub fn from_gesture(dir: GestureDir) -> Option<Self> {
        match dir {
            GestureDir::Tap => Some(Self::PlayPause),
            GestureDir::Left => Some(Self::PreviousTrack),
            GestureDir::Right => Some(Self::NextTrack),
            GestureDir::Up => Some(Self::VolumeUp),
            GestureDir::Down => Some(Self::VolumeDown),
            GestureDir::None => None,
        }
    }
}
