use crate::config::NavConfig;
use crate::delivery::{KeyDelivery, KeyPayload};
use crate::focus::{ElementId, FocusRegistry, KeyboardSurface, Marker};
use crate::input::{Direction, LocalKey, LocalKeyEvent, Phase, RemoteEvent};
use crate::repeat::RepeatController;
use crate::resolve::resolve_element;
use crate::timer::{Scheduler, TaskId};

/// Key identifiers that flip the layout instead of being typed.
pub const LAYOUT_TOGGLE_KEYS: [&str; 2] = ["{shift}", "{lock}"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalGesture {
    Move(Direction),
    Select,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pressed {
    element: ElementId,
    identifier: String,
}

/// Everything one keyboard window needs to turn input into focus changes and
/// keystrokes. Not thread-safe by construction: input handlers and timer
/// callbacks must all run on the thread that owns the session.
pub struct NavigationSession<S, D> {
    surface: S,
    delivery: D,
    config: NavConfig,
    focus: FocusRegistry,
    local: RepeatController<LocalGesture>,
    remote_move: RepeatController<Direction>,
    remote_select: RepeatController<()>,
    pressed: Option<Pressed>,
}

impl<S: KeyboardSurface, D: KeyDelivery> NavigationSession<S, D> {
    pub fn new(surface: S, delivery: D, config: NavConfig) -> Self {
        let timing = config.repeat_timing();
        Self {
            surface,
            delivery,
            focus: FocusRegistry::new(),
            local: RepeatController::new("local", timing),
            remote_move: RepeatController::new("remote-move", timing),
            remote_select: RepeatController::new("remote-select", timing),
            pressed: None,
            config,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn delivery_mut(&mut self) -> &mut D {
        &mut self.delivery
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn active(&self) -> Option<ElementId> {
        self.focus.active()
    }

    pub fn active_key_identifier(&self) -> Option<String> {
        self.focus.active_key_identifier(&self.surface)
    }

    pub fn is_select_held(&self) -> bool {
        self.pressed.is_some()
    }

    /// Focuses the first candidate when nothing (or, with
    /// `revalidate_focus`, nothing still rendered) is focused.
    pub fn ensure_focus(&mut self) -> Option<ElementId> {
        let candidates = self.surface.candidates();
        if let Some(active) = self.focus.active() {
            if !self.config.revalidate_focus || candidates.contains(&active) {
                return Some(active);
            }
            log::debug!("focused element {active:?} is no longer rendered; refocusing");
            self.focus.forget();
        }
        let Some(&first) = candidates.first() else {
            log::trace!("no candidates to focus");
            return None;
        };
        self.focus.set_active(&mut self.surface, first);
        Some(first)
    }

    /// Moves focus one step. Returns the newly focused element, or `None`
    /// when focus stayed where it was.
    pub fn move_focus(&mut self, direction: Direction) -> Option<ElementId> {
        let active = self.ensure_focus()?;
        let candidates = self.surface.candidates();
        let Some(resolved) = resolve_element(&self.surface, active, &candidates, direction) else {
            log::debug!("move {direction:?} from {active:?}: nothing to focus");
            return None;
        };
        if resolved.wrapped {
            log::debug!("move {direction:?} wrapped {active:?} -> {:?}", resolved.element);
        } else {
            log::debug!("move {direction:?} {active:?} -> {:?}", resolved.element);
        }
        self.focus.set_active(&mut self.surface, resolved.element);
        Some(resolved.element)
    }

    pub fn select_down(&mut self) {
        let Some(active) = self.ensure_focus() else {
            return;
        };
        let Some(identifier) = self.surface.key_identifier(active) else {
            return;
        };
        if LAYOUT_TOGGLE_KEYS.contains(&identifier.as_str()) {
            self.toggle_layout();
            return;
        }
        // a second select source pressing over the first ends the first key
        self.select_up();
        self.surface.set_marker(active, Marker::Pressed, true);
        self.send(KeyPayload::for_identifier(&identifier, Phase::Down));
        self.pressed = Some(Pressed {
            element: active,
            identifier,
        });
    }

    /// Repeats the key that went down, even if focus moved since.
    pub fn select_repeat(&mut self) {
        if let Some(pressed) = &self.pressed {
            let payload = KeyPayload::for_identifier(&pressed.identifier, Phase::Repeat);
            self.send(payload);
        }
    }

    pub fn select_up(&mut self) {
        if let Some(pressed) = self.pressed.take() {
            self.surface
                .set_marker(pressed.element, Marker::Pressed, false);
            self.send(KeyPayload::for_identifier(&pressed.identifier, Phase::Up));
        }
    }

    /// Swaps between the default and shift layouts and refocuses the button
    /// at the same position in the new render, if there is one.
    pub fn toggle_layout(&mut self) {
        let before = self.surface.candidates();
        let ordinal = self
            .focus
            .active()
            .and_then(|active| before.iter().position(|&el| el == active));

        let current = self.surface.layout().to_string();
        let next = self.config.toggled_layout(&current).to_string();
        log::info!("layout {current} -> {next}");
        self.surface.set_layout(&next);
        self.focus.forget();

        let after = self.surface.candidates();
        match ordinal.and_then(|i| after.get(i).copied()) {
            Some(el) => self.focus.set_active(&mut self.surface, el),
            None => log::debug!("nothing at ordinal {ordinal:?} after re-render; focus unset"),
        }
    }

    pub fn handle_local<T: Scheduler + ?Sized>(&mut self, event: LocalKeyEvent, timers: &mut T) {
        let gesture = match event.key {
            LocalKey::Arrow(direction) => LocalGesture::Move(direction),
            LocalKey::Enter => LocalGesture::Select,
            LocalKey::ToggleLayout => {
                if event.phase == Phase::Down {
                    self.toggle_layout();
                }
                return;
            }
        };

        match event.phase {
            Phase::Down | Phase::Repeat => {
                if gesture == LocalGesture::Select && !event.on_grid {
                    log::trace!("enter outside the keyboard grid ignored");
                    return;
                }
                if let Some(gesture) = self.local.press(gesture, timers) {
                    self.apply_local(gesture, Phase::Down);
                }
            }
            Phase::Up => {
                // keys other than the held one don't end the gesture
                if self.local.payload() == Some(gesture) {
                    self.local.release(timers);
                    if gesture == LocalGesture::Select {
                        self.select_up();
                    }
                }
            }
        }
    }

    pub fn handle_remote<T: Scheduler + ?Sized>(&mut self, event: RemoteEvent, timers: &mut T) {
        match event {
            RemoteEvent::Move {
                phase: Phase::Down,
                direction,
            } => {
                let Some(direction) = direction else {
                    log::debug!("{} down without a direction", event.name());
                    return;
                };
                if let Some(direction) = self.remote_move.press(direction, timers) {
                    self.move_focus(direction);
                }
            }
            RemoteEvent::Move {
                phase: Phase::Up,
                direction,
            } => {
                // an up naming another direction belongs to an ignored down
                if direction.is_none() || direction == self.remote_move.payload() {
                    self.remote_move.release(timers);
                }
            }
            RemoteEvent::Select { phase: Phase::Down } => {
                if self.remote_select.press((), timers).is_some() {
                    self.select_down();
                }
            }
            RemoteEvent::Select { phase: Phase::Up } => {
                if self.remote_select.release(timers) {
                    self.select_up();
                }
            }
            RemoteEvent::Move {
                phase: Phase::Repeat,
                ..
            }
            | RemoteEvent::Select {
                phase: Phase::Repeat,
            } => {
                log::trace!("{}: external repeat ignored", event.name());
            }
            RemoteEvent::Shift => self.toggle_layout(),
        }
    }

    /// Routes a fired timer to the gesture that owns it.
    pub fn on_timer<T: Scheduler + ?Sized>(&mut self, task: TaskId, timers: &mut T) {
        if let Some(gesture) = self.local.on_timer(task, timers) {
            self.apply_local(gesture, Phase::Repeat);
        } else if let Some(direction) = self.remote_move.on_timer(task, timers) {
            self.move_focus(direction);
        } else if self.remote_select.on_timer(task, timers).is_some() {
            self.select_repeat();
        }
    }

    /// Ends every held gesture, e.g. when the keyboard is hidden mid-press.
    pub fn release_all<T: Scheduler + ?Sized>(&mut self, timers: &mut T) {
        self.local.release(timers);
        self.remote_move.release(timers);
        self.remote_select.release(timers);
        self.select_up();
    }

    fn apply_local(&mut self, gesture: LocalGesture, phase: Phase) {
        match (gesture, phase) {
            (LocalGesture::Move(direction), _) => {
                self.move_focus(direction);
            }
            (LocalGesture::Select, Phase::Down) => self.select_down(),
            (LocalGesture::Select, _) => self.select_repeat(),
        }
    }

    fn send(&mut self, payload: KeyPayload) {
        if let Err(e) = self.delivery.deliver(payload) {
            log::warn!("key delivery failed: {e}");
        }
    }
}
