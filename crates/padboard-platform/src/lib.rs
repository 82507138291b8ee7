//! Platform glue for Padboard.
//!
//! [`Runner`] owns a [`padboard_core::NavigationSession`] together with a
//! clock and a timer queue and feeds it local key events, JSON bridge
//! events and gamepad input. [`strokes()`] turns delivered key payloads into
//! scan-code and UTF-16 strokes for an injector.

pub mod gamepad;
pub mod runner;
pub mod sinks;
pub mod strokes;


pub use gamepad::*;
pub use runner::*;
pub use sinks::*;
pub use strokes::*;
