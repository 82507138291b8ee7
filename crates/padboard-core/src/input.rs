use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InputError;
use crate::geometry::Axis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Decodes a `(dx, dy)` step. Horizontal wins when both are set; `(0, 0)`
    /// is no direction.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (1, _) => Some(Direction::Right),
            (-1, _) => Some(Direction::Left),
            (_, 1) => Some(Direction::Down),
            (_, -1) => Some(Direction::Up),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Axis of travel.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// +1 when travelling towards larger coordinates.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Right | Direction::Down => 1.0,
            Direction::Left | Direction::Up => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Down,
    Repeat,
    Up,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Down => "down",
            Phase::Repeat => "repeat",
            Phase::Up => "up",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalKey {
    Arrow(Direction),
    Enter,
    ToggleLayout,
}

impl LocalKey {
    /// Maps a DOM-style key name; keys the keyboard does not react to give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "ArrowUp" => LocalKey::Arrow(Direction::Up),
            "ArrowDown" => LocalKey::Arrow(Direction::Down),
            "ArrowLeft" => LocalKey::Arrow(Direction::Left),
            "ArrowRight" => LocalKey::Arrow(Direction::Right),
            "Enter" => LocalKey::Enter,
            "CapsLock" => LocalKey::ToggleLayout,
            _ => return None,
        })
    }
}

/// A key event from the window hosting the keyboard. OS auto-repeat arrives
/// as further `Down`s and is absorbed by the gesture debounce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalKeyEvent {
    pub key: LocalKey,
    pub phase: Phase,
    /// Whether the platform focus target is a keyboard button. Enter on
    /// anything else is ignored.
    pub on_grid: bool,
}

impl LocalKeyEvent {
    pub fn down(key: LocalKey) -> Self {
        Self {
            key,
            phase: Phase::Down,
            on_grid: true,
        }
    }

    pub fn up(key: LocalKey) -> Self {
        Self {
            key,
            phase: Phase::Up,
            on_grid: true,
        }
    }

    pub fn off_grid(mut self) -> Self {
        self.on_grid = false;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteEvent {
    Move {
        phase: Phase,
        direction: Option<Direction>,
    },
    Select {
        phase: Phase,
    },
    Shift,
}

#[derive(Deserialize)]
struct MovePayload {
    phase: Phase,
    #[serde(default)]
    dx: i32,
    #[serde(default)]
    dy: i32,
}

#[derive(Deserialize)]
struct SelectPayload {
    phase: Phase,
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

impl RemoteEvent {
    pub const MOVE: &'static str = "nav:move";
    pub const SELECT: &'static str = "nav:select";
    pub const SHIFT: &'static str = "nav:shift";

    pub fn name(&self) -> &'static str {
        match self {
            RemoteEvent::Move { .. } => Self::MOVE,
            RemoteEvent::Select { .. } => Self::SELECT,
            RemoteEvent::Shift => Self::SHIFT,
        }
    }

    pub fn moving(phase: Phase, dx: i32, dy: i32) -> Self {
        RemoteEvent::Move {
            phase,
            direction: Direction::from_delta(dx, dy),
        }
    }

    /// Decodes a named event as delivered by the event bridge. The `osk:`
    /// prefix used by the native side is accepted.
    pub fn from_named(name: &str, payload: Value) -> Result<Self, InputError> {
        let bare = name.strip_prefix("osk:").unwrap_or(name);
        let payload_err = |source| InputError::Payload {
            event: bare.to_string(),
            source,
        };
        match bare {
            Self::MOVE => {
                let p: MovePayload = serde_json::from_value(payload).map_err(payload_err)?;
                Ok(Self::moving(p.phase, p.dx, p.dy))
            }
            Self::SELECT => {
                let p: SelectPayload = serde_json::from_value(payload).map_err(payload_err)?;
                Ok(RemoteEvent::Select { phase: p.phase })
            }
            Self::SHIFT => Ok(RemoteEvent::Shift),
            other => Err(InputError::UnknownEvent(other.to_string())),
        }
    }

    /// Decodes one `{"event": ..., "payload": ...}` line.
    pub fn parse_line(line: &str) -> Result<Self, InputError> {
        let env: Envelope = serde_json::from_str(line)?;
        Self::from_named(&env.event, env.payload)
    }
}
