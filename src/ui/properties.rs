//! Property panel state for the selected furniture item
//!
//! Kept separate from the imgui drawing code so selection changes can be
//! exercised without a GUI context.

use std::{collections::HashMap, f32::consts::TAU};

use log::debug;

use crate::{
    gfx::scene::{Axis, NodeId},
    room::FurnitureItem,
};

/// Combo entry shown while no texture has been picked
pub const TEXTURE_PLACEHOLDER: &str = "texture";

/// Texture set used for items without a set of their own
pub const DEFAULT_TEXTURE_SET: &str = "default";

/// Ordered label -> asset path mapping offered in the texture combo
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureChoiceTable {
    entries: Vec<(String, String)>,
}

impl TextureChoiceTable {
    pub fn new<I, L, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, path)| (label.into(), path.into()))
                .collect(),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn path(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, path)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Texture tables keyed by furniture name
#[derive(Debug, Clone, Default)]
pub struct TextureCatalog {
    sets: HashMap<String, TextureChoiceTable>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: TextureChoiceTable) {
        self.sets.insert(name.into(), table);
    }

    /// The item's own table, else the default set, else an empty table
    pub fn table_for(&self, item_name: &str) -> TextureChoiceTable {
        self.sets
            .get(item_name)
            .or_else(|| self.sets.get(DEFAULT_TEXTURE_SET))
            .cloned()
            .unwrap_or_default()
    }
}

/// Slider bound to one rotation component of the selected item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationControl {
    pub axis: Axis,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl RotationControl {
    pub fn new(axis: Axis, value: f32) -> Self {
        Self {
            axis,
            value: value.clamp(0.0, TAU),
            min: 0.0,
            max: TAU,
        }
    }

    /// Stores a new angle, clamped to the slider range, and returns it
    pub fn set(&mut self, radians: f32) -> f32 {
        self.value = radians.clamp(self.min, self.max);
        self.value
    }
}

/// Combo over a [`TextureChoiceTable`], starting on the placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct TextureControl {
    pub table: TextureChoiceTable,
    /// 0 is the placeholder; `n` is the table's `n-1`th label
    pub selected: usize,
}

impl TextureControl {
    pub fn new(table: TextureChoiceTable) -> Self {
        Self { table, selected: 0 }
    }

    /// Placeholder followed by the table labels
    pub fn options(&self) -> Vec<&str> {
        std::iter::once(TEXTURE_PLACEHOLDER)
            .chain(self.table.labels())
            .collect()
    }

    pub fn current_label(&self) -> &str {
        self.options()
            .get(self.selected)
            .copied()
            .unwrap_or(TEXTURE_PLACEHOLDER)
    }

    /// Label at combo index `index`, `None` for the placeholder
    pub fn label_at(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.table.labels().nth(i))
    }
}

/// Editor window for one selected item
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPanel {
    pub item: NodeId,
    pub title: String,
    pub rotation: RotationControl,
    pub texture: TextureControl,
}

/// Rebuilds the property panel whenever the selection changes
#[derive(Debug, Clone)]
pub struct PropertyPanelController {
    catalog: TextureCatalog,
    rotation_axis: Axis,
    panel: Option<PropertyPanel>,
}

impl PropertyPanelController {
    pub fn new(catalog: TextureCatalog, rotation_axis: Axis) -> Self {
        Self {
            catalog,
            rotation_axis,
            panel: None,
        }
    }

    pub fn rotation_axis(&self) -> Axis {
        self.rotation_axis
    }

    /// Drops the current panel and opens a fresh one for `item`.
    ///
    /// `current_rotation` is the item's present angle about the rotation axis.
    pub fn on_selection_changed(&mut self, item: &FurnitureItem, current_rotation: f32) {
        let table = self.catalog.table_for(&item.name);
        debug!(
            "Opening property panel for '{}' with {} texture choices",
            item.name,
            table.len()
        );
        self.panel = Some(PropertyPanel {
            item: item.node,
            title: item.name.clone(),
            rotation: RotationControl::new(self.rotation_axis, current_rotation),
            texture: TextureControl::new(table),
        });
    }

    pub fn panel(&self) -> Option<&PropertyPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut PropertyPanel> {
        self.panel.as_mut()
    }

    /// Asset path behind `label` in the texture set for `item_name`
    pub fn texture_path(&self, item_name: &str, label: &str) -> Option<String> {
        self.catalog
            .table_for(item_name)
            .path(label)
            .map(str::to_string)
    }

    pub fn close(&mut self) {
        self.panel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair_catalog() -> TextureCatalog {
        let mut catalog = TextureCatalog::new();
        catalog.insert(
            "chair",
            TextureChoiceTable::new([
                ("base", "scene/chair/textures/Material_baseColor.png"),
                ("normal", "scene/chair/textures/Material_normal.png"),
                ("metallic", "scene/chair/textures/Material_metallicRoughness.png"),
            ]),
        );
        catalog
    }

    fn item(index: usize, name: &str) -> FurnitureItem {
        FurnitureItem {
            node: NodeId(index),
            name: name.to_string(),
            draggable: true,
        }
    }

    #[test]
    fn test_selection_builds_fresh_panel() {
        let mut controller = PropertyPanelController::new(chair_catalog(), Axis::Z);
        controller.on_selection_changed(&item(3, "chair"), 1.0);
        if let Some(panel) = controller.panel_mut() {
            panel.texture.selected = 2;
        }

        controller.on_selection_changed(&item(3, "chair"), 1.0);
        let panel = controller.panel().unwrap();
        assert_eq!(panel.title, "chair");
        assert_eq!(panel.texture.current_label(), TEXTURE_PLACEHOLDER);
        assert_eq!(panel.rotation.min, 0.0);
        assert_eq!(panel.rotation.max, TAU);
        assert_eq!(
            panel.texture.options(),
            vec![TEXTURE_PLACEHOLDER, "base", "normal", "metallic"]
        );
    }

    #[test]
    fn test_unknown_item_falls_back_to_default_set() {
        let mut catalog = chair_catalog();
        assert!(catalog.table_for("sofa").is_empty());

        catalog.insert(DEFAULT_TEXTURE_SET, TextureChoiceTable::new([("base", "a.png")]));
        assert_eq!(catalog.table_for("sofa").path("base"), Some("a.png"));
        assert_eq!(catalog.table_for("chair").len(), 3);
    }

    #[test]
    fn test_rotation_is_clamped_to_full_turn() {
        let mut control = RotationControl::new(Axis::Z, 0.0);
        assert_eq!(control.set(-1.0), 0.0);
        assert_eq!(control.set(10.0), TAU);
        assert_eq!(control.set(1.5), 1.5);
    }

    #[test]
    fn test_placeholder_has_no_label() {
        let control = TextureControl::new(chair_catalog().table_for("chair"));
        assert_eq!(control.label_at(0), None);
        assert_eq!(control.label_at(1), Some("base"));
        assert_eq!(control.label_at(4), None);
    }
}
