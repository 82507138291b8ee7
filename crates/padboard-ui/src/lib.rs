//! Keyboard widget for Padboard.
//!
//! [`Keyboard`] renders a named [`Layouts`] entry into button rectangles with
//! taffy flex rows and implements [`padboard_core::KeyboardSurface`], so a
//! `NavigationSession` can drive it directly. Rendering is synchronous:
//! when `set_layout` returns, the new buttons are in place and every older
//! `ElementId` is dead.

pub mod error;
pub mod keyboard;
pub mod layouts;


pub use error::*;
pub use keyboard::*;
pub use layouts::*;
