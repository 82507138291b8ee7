//! Press/hold/release → initial action plus a steady stream of repeats.
//!
//! `down` emits immediately and arms a one-shot delay. When the delay
//! elapses a periodic timer takes over and every tick emits a repeat. `up`
//! cancels whichever timer is pending. A second `down` during a gesture is
//! ignored, and so is an `up` with no gesture.

use std::fmt::Debug;

use web_time::{Duration, Instant};

use crate::timer::{Scheduler, TaskId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatTiming {
    pub delay: Duration,
    pub interval: Duration,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(300),
            interval: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState<T> {
    Idle,
    /// Initial action emitted, waiting out the delay.
    Armed {
        payload: T,
        task: TaskId,
        since: Instant,
    },
    Repeating {
        payload: T,
        task: TaskId,
    },
}

pub struct RepeatController<T> {
    name: &'static str,
    timing: RepeatTiming,
    state: GestureState<T>,
}

impl<T: Copy + Debug> RepeatController<T> {
    pub fn new(name: &'static str, timing: RepeatTiming) -> Self {
        Self {
            name,
            timing,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState<T> {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Payload of the gesture in progress.
    pub fn payload(&self) -> Option<T> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Armed { payload, .. } | GestureState::Repeating { payload, .. } => {
                Some(payload)
            }
        }
    }

    pub fn owns(&self, task: TaskId) -> bool {
        match self.state {
            GestureState::Idle => false,
            GestureState::Armed { task: t, .. } | GestureState::Repeating { task: t, .. } => {
                t == task
            }
        }
    }

    /// Starts a gesture. Returns the payload to act on once, or `None` if a
    /// gesture is already running.
    pub fn press<S: Scheduler + ?Sized>(&mut self, payload: T, sched: &mut S) -> Option<T> {
        if !self.is_idle() {
            log::trace!("{}: down ignored, gesture already held", self.name);
            return None;
        }
        let task = sched.schedule_once(self.timing.delay);
        self.state = GestureState::Armed {
            payload,
            task,
            since: sched.now(),
        };
        log::debug!("{}: down {:?}", self.name, payload);
        Some(payload)
    }

    /// Ends the gesture, cancelling any pending timer. Returns whether a
    /// gesture was actually running.
    pub fn release<S: Scheduler + ?Sized>(&mut self, sched: &mut S) -> bool {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => false,
            GestureState::Armed { task, .. } | GestureState::Repeating { task, .. } => {
                sched.cancel(task);
                log::debug!("{}: up", self.name);
                true
            }
        }
    }

    /// Feeds a fired timer. Returns the payload when this tick is a repeat;
    /// tasks belonging to someone else are ignored.
    pub fn on_timer<S: Scheduler + ?Sized>(&mut self, task: TaskId, sched: &mut S) -> Option<T> {
        match self.state {
            GestureState::Armed {
                payload,
                task: armed,
                since,
            } if armed == task => {
                let periodic = sched.schedule_every(self.timing.interval);
                self.state = GestureState::Repeating {
                    payload,
                    task: periodic,
                };
                log::debug!(
                    "{}: repeating after {:?}",
                    self.name,
                    sched.now().saturating_duration_since(since)
                );
                None
            }
            GestureState::Repeating {
                payload,
                task: periodic,
            } if periodic == task => Some(payload),
            _ => None,
        }
    }
}
