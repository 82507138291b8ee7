//! Gamepad buttons and the left stick turned into keyboard navigation.

use padboard_core::{Phase, RemoteEvent};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    South,
    East,
    North,
    West,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Select,
    Start,
    LeftTrigger,
    RightTrigger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickAxis {
    LeftX,
    LeftY,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadEvent {
    Button { button: Button, pressed: bool },
    /// Raw axis value in -1.0..=1.0. Positive Y is up.
    Axis { axis: StickAxis, value: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadAction {
    Remote(RemoteEvent),
    /// Start: shows a hidden overlay, hides a shown one.
    ToggleOverlay,
    CloseOverlay,
    /// Start and Select held together.
    ToggleActive,
}

pub type PadActions = SmallVec<[PadAction; 2]>;

/// Stateful mapper. The stick is quantized per axis; crossing into a new
/// direction releases the old one before pressing the new one.
///
/// Pressing Start while Select is held (or the other way round) reports
/// `ToggleActive` once and swallows the press; the combo fires again only
/// after one of the two is let go.
#[derive(Debug)]
pub struct GamepadMapper {
    threshold: f32,
    stick_x: i32,
    stick_y: i32,
    start: bool,
    select: bool,
    combo_latched: bool,
}

impl GamepadMapper {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            stick_x: 0,
            stick_y: 0,
            start: false,
            select: false,
            combo_latched: false,
        }
    }

    /// Quantized stick direction as `(dx, dy)` in screen terms.
    pub fn stick(&self) -> (i32, i32) {
        (self.stick_x, self.stick_y)
    }

    pub fn map(&mut self, event: PadEvent) -> PadActions {
        match event {
            PadEvent::Button { button, pressed } => match self.combo(button, pressed) {
                Some(actions) => actions,
                None => map_button(button, pressed).into_iter().collect(),
            },
            PadEvent::Axis { axis, value } => {
                let dir = quantize(value, self.threshold);
                match axis {
                    StickAxis::LeftX => edge(&mut self.stick_x, dir, |d| (d, 0)),
                    // screen y grows downwards
                    StickAxis::LeftY => edge(&mut self.stick_y, -dir, |d| (0, d)),
                }
            }
        }
    }

    /// `Some` when the event is part of the Start+Select combo.
    fn combo(&mut self, button: Button, pressed: bool) -> Option<PadActions> {
        match button {
            Button::Start => self.start = pressed,
            Button::Select => self.select = pressed,
            _ => return None,
        }
        if !(self.start && self.select) {
            self.combo_latched = false;
            return None;
        }
        let mut out = PadActions::new();
        if !self.combo_latched {
            self.combo_latched = true;
            log::debug!("start+select combo");
            out.push(PadAction::ToggleActive);
        }
        Some(out)
    }
}

fn map_button(button: Button, pressed: bool) -> Option<PadAction> {
    let phase = if pressed { Phase::Down } else { Phase::Up };
    let step = |dx, dy| Some(PadAction::Remote(RemoteEvent::moving(phase, dx, dy)));
    match button {
        Button::Start if pressed => Some(PadAction::ToggleOverlay),
        Button::East if !pressed => Some(PadAction::CloseOverlay),
        Button::Select if pressed => Some(PadAction::Remote(RemoteEvent::Shift)),
        Button::South => Some(PadAction::Remote(RemoteEvent::Select { phase })),
        Button::DPadUp => step(0, -1),
        Button::DPadDown => step(0, 1),
        Button::DPadLeft => step(-1, 0),
        Button::DPadRight => step(1, 0),
        _ => None,
    }
}

fn quantize(value: f32, threshold: f32) -> i32 {
    if value > threshold {
        1
    } else if value < -threshold {
        -1
    } else {
        0
    }
}

fn edge(held: &mut i32, dir: i32, delta: impl Fn(i32) -> (i32, i32)) -> PadActions {
    let mut out = PadActions::new();
    if dir == *held {
        return out;
    }
    if *held != 0 {
        let (dx, dy) = delta(*held);
        out.push(PadAction::Remote(RemoteEvent::moving(Phase::Up, dx, dy)));
    }
    if dir != 0 {
        let (dx, dy) = delta(dir);
        out.push(PadAction::Remote(RemoteEvent::moving(Phase::Down, dx, dy)));
    }
    log::trace!("stick {} -> {}", held, dir);
    *held = dir;
    out
}
