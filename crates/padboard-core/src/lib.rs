//! # Padboard navigation core
//!
//! Everything needed to drive an on-screen keyboard without a pointer: a
//! directional resolver over button rectangles, a press/hold/release repeat
//! controller, the single-focus registry, and the [`NavigationSession`] that
//! ties them to a keyboard widget and a keystroke sink.
//!
//! The core never touches a real window or clock. The widget is reached
//! through [`KeyboardSurface`], keystrokes leave through [`KeyDelivery`], and
//! time comes from a [`Scheduler`] the caller polls:
//!
//! ```rust
//! use padboard_core::*;
//! use web_time::Instant;
//!
//! fn drive<S: KeyboardSurface, D: KeyDelivery>(session: &mut NavigationSession<S, D>) {
//!     let mut timers = TimerQueue::new(Instant::now());
//!     session.handle_remote(RemoteEvent::moving(Phase::Down, 1, 0), &mut timers);
//!     while let Some(task) = timers.pop_due(Instant::now()) {
//!         session.on_timer(task, &mut timers);
//!     }
//! }
//! ```
//!
//! Element ids are only meaningful for the render that produced them. The
//! session re-queries candidates and geometry before every action, so a
//! re-rendered widget never leaves it pointing at a discarded button for
//! longer than one input.

pub mod clock;
pub mod config;
pub mod delivery;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod input;
pub mod repeat;
pub mod resolve;
pub mod session;
pub mod timer;

#[cfg(test)]
mod tests;

pub use clock::*;
pub use config::*;
pub use delivery::*;
pub use error::*;
pub use focus::*;
pub use geometry::*;
pub use input::*;
pub use repeat::*;
pub use resolve::*;
pub use session::*;
pub use timer::*;
