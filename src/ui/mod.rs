//! # User Interface Module
//!
//! Dear ImGui panels for the viewer.
//!
//! ## Key Components
//!
//! - [`UiManager`] - imgui context plus its winit and wgpu backends
//! - [`PropertyPanelController`] - rebuilds the editor when the selection changes
//! - [`furnish_panels`] - draws the scene overview and the property editor
//!
//! Panel widgets never touch the scene directly. Edits come back as
//! [`InteractionEvent`](crate::interaction::InteractionEvent)s that the
//! application context dispatches.

pub mod manager;
pub mod panel;
pub mod properties;

pub use manager::UiManager;
pub use panel::{furnish_panels, SceneOverview};
pub use properties::{
    PropertyPanel, PropertyPanelController, RotationControl, TextureCatalog, TextureChoiceTable,
    TextureControl, DEFAULT_TEXTURE_SET, TEXTURE_PLACEHOLDER,
};
