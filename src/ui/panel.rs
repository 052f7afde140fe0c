// src/ui/panel.rs
//! Viewer panels: scene overview and the selected item's property editor

use crate::interaction::{InteractionEvent, InteractionMode};

use super::properties::{PropertyPanel, PropertyPanelController};

/// Per-frame snapshot of the scene shown in the overview window
#[derive(Debug, Clone, Default)]
pub struct SceneOverview {
    pub item_names: Vec<String>,
    pub selected: Option<String>,
    pub mode: InteractionMode,
    pub pending_loads: usize,
}

/// Draws every viewer window and returns the edits made this frame
pub fn furnish_panels(
    ui: &imgui::Ui,
    overview: &SceneOverview,
    properties: &mut PropertyPanelController,
) -> Vec<InteractionEvent> {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return Vec::new();
    }

    render_overview(ui, overview);

    let mut events = Vec::new();
    if let Some(panel) = properties.panel_mut() {
        let panel_width = (display_size[0] * 0.25).clamp(280.0, 420.0);
        let title = panel.title.clone();
        ui.window(title)
            .size([panel_width, 180.0], imgui::Condition::FirstUseEver)
            .position(
                [display_size[0] - panel_width - 20.0, 20.0],
                imgui::Condition::FirstUseEver,
            )
            .resizable(true)
            .collapsible(true)
            .build(|| {
                render_rotation_control(ui, panel, &mut events);
                ui.spacing();
                render_texture_control(ui, panel, &mut events);
            });
    }
    events
}

fn render_overview(ui: &imgui::Ui, overview: &SceneOverview) {
    ui.window("Furnish")
        .size([260.0, 220.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            ui.text(format!("Mode: {}", overview.mode.label()));
            if overview.pending_loads > 0 {
                ui.text_disabled(format!("Loading {} asset(s)...", overview.pending_loads));
            }
            ui.separator();

            if overview.item_names.is_empty() {
                render_empty_state(ui);
            } else {
                ui.text("Furniture");
                for name in &overview.item_names {
                    let is_selected = overview.selected.as_deref() == Some(name.as_str());
                    if is_selected {
                        ui.text_colored([0.2, 0.6, 1.0, 1.0], format!("> {}", name));
                    } else {
                        ui.bullet_text(name);
                    }
                }
            }

            ui.separator();
            ui.text_disabled("Drag: move  Click: select");
            ui.text_disabled("Arrows (+Ctrl): pan  Space: reset");
        });
}

fn render_rotation_control(
    ui: &imgui::Ui,
    panel: &mut PropertyPanel,
    events: &mut Vec<InteractionEvent>,
) {
    let mut value = panel.rotation.value;
    let label = format!("Rotation {:?}", panel.rotation.axis);
    if ui
        .slider_config(label, panel.rotation.min, panel.rotation.max)
        .display_format("%.3f rad")
        .build(&mut value)
    {
        let radians = panel.rotation.set(value);
        events.push(InteractionEvent::RotateChanged {
            item: panel.item,
            radians,
        });
    }
}

fn render_texture_control(
    ui: &imgui::Ui,
    panel: &mut PropertyPanel,
    events: &mut Vec<InteractionEvent>,
) {
    if panel.texture.table.is_empty() {
        ui.text_disabled("No textures for this item");
        return;
    }

    let options: Vec<String> = panel
        .texture
        .options()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut selected = panel.texture.selected;
    if ui.combo_simple_string("Texture", &mut selected, &options) && selected != panel.texture.selected {
        panel.texture.selected = selected;
        if let Some(label) = panel.texture.label_at(selected) {
            events.push(InteractionEvent::TextureChanged {
                item: panel.item,
                label: label.to_string(),
            });
        }
    }
}

fn render_empty_state(ui: &imgui::Ui) {
    ui.text("No furniture yet");
    ui.text_disabled("Models appear here once loaded");
}
