// src/lib.rs
//! Furnish
//!
//! A 3D furniture-arrangement viewer built on wgpu and winit: a static room,
//! furniture loaded in the background, an orbit camera, plane-constrained
//! dragging, click selection and a property panel for the selected piece.

pub mod app;
pub mod assets;
pub mod config;
pub mod context;
pub mod gfx;
pub mod interaction;
pub mod room;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::FurnishApp;
pub use config::{ConfigError, ViewerConfig};
pub use context::AppContext;
pub use interaction::InteractionEvent;
