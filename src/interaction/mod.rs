//! # Interaction
//!
//! Raw pointer and keyboard input reduced to typed [`InteractionEvent`]s.
//! The controllers here only read the scene; `AppContext::dispatch` applies
//! the events.

pub mod controller;
pub mod drag;
pub mod events;
pub mod keyboard;

pub use controller::{InteractionMode, PickView, PointerController, CLICK_TOLERANCE};
pub use drag::{DragConstraint, DragSession};
pub use events::{CameraNav, InteractionEvent};
pub use keyboard::{KeyboardNavigator, NavKey};
