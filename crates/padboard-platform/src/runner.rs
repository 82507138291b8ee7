use padboard_core::{
    Clock, InputError, KeyDelivery, KeyboardSurface, LocalKeyEvent, NavigationSession,
    RemoteEvent, TimerQueue,
};
use serde_json::Value;
use web_time::Instant;

use crate::gamepad::{GamepadMapper, PadAction, PadEvent};

/// Owns the session together with its clock and timers and gates input on
/// whether the keyboard overlay is showing. Gamepad input is further gated
/// on the active flag, flipped by the Start+Select combo.
///
/// Single-threaded: call `pump` regularly (or before waiting on
/// `next_deadline`) from the thread that owns the runner.
pub struct Runner<C, S, D> {
    clock: C,
    timers: TimerQueue,
    session: NavigationSession<S, D>,
    gamepad: GamepadMapper,
    overlay_open: bool,
    active: bool,
}

impl<C: Clock, S: KeyboardSurface, D: KeyDelivery> Runner<C, S, D> {
    /// Starts with the overlay closed.
    pub fn new(clock: C, session: NavigationSession<S, D>) -> Self {
        let timers = TimerQueue::new(clock.now());
        let gamepad = GamepadMapper::new(session.config().stick_threshold);
        Self {
            clock,
            timers,
            session,
            gamepad,
            overlay_open: false,
            active: true,
        }
    }

    pub fn session(&self) -> &NavigationSession<S, D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut NavigationSession<S, D> {
        &mut self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn is_open(&self) -> bool {
        self.overlay_open
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Going inactive hides the overlay; gamepad input other than the
    /// combo is dropped until it is active again.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        log::info!("gamepad input {}", if active { "active" } else { "inactive" });
        if !active {
            self.close();
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Shows the overlay and focuses the first key if nothing is focused.
    pub fn open(&mut self) {
        if self.overlay_open {
            return;
        }
        self.pump();
        self.overlay_open = true;
        self.session.ensure_focus();
        log::info!("keyboard shown");
    }

    /// Hides the overlay. Held gestures are released so nothing keeps
    /// repeating into the target application.
    pub fn close(&mut self) {
        if !self.overlay_open {
            return;
        }
        self.pump();
        self.overlay_open = false;
        self.session.release_all(&mut self.timers);
        log::info!("keyboard hidden");
    }

    /// Fires every timer due at the clock's current time. Returns how many
    /// fired.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some(task) = self.timers.pop_due(now) {
            self.session.on_timer(task, &mut self.timers);
            fired += 1;
        }
        self.timers.settle(now);
        fired
    }

    pub fn handle_local(&mut self, event: LocalKeyEvent) {
        self.pump();
        if !self.overlay_open {
            log::trace!("{event:?} dropped, keyboard hidden");
            return;
        }
        self.session.handle_local(event, &mut self.timers);
    }

    pub fn handle_remote(&mut self, event: RemoteEvent) {
        self.pump();
        if !self.overlay_open {
            log::trace!("{} dropped, keyboard hidden", event.name());
            return;
        }
        self.session.handle_remote(event, &mut self.timers);
    }

    /// A named bridge event such as `nav:move` or `osk:nav:select`.
    pub fn handle_named(&mut self, name: &str, payload: Value) -> Result<(), InputError> {
        let event = RemoteEvent::from_named(name, payload)?;
        self.handle_remote(event);
        Ok(())
    }

    /// One `{"event": ..., "payload": ...}` line.
    pub fn handle_line(&mut self, line: &str) -> Result<(), InputError> {
        let event = RemoteEvent::parse_line(line)?;
        self.handle_remote(event);
        Ok(())
    }

    pub fn handle_pad(&mut self, event: PadEvent) {
        for action in self.gamepad.map(event) {
            match action {
                PadAction::ToggleActive => self.set_active(!self.active),
                _ if !self.active => log::trace!("{action:?} dropped, input inactive"),
                PadAction::Remote(remote) => self.handle_remote(remote),
                PadAction::ToggleOverlay if self.overlay_open => self.close(),
                PadAction::ToggleOverlay => self.open(),
                PadAction::CloseOverlay => self.close(),
            }
        }
    }
}
