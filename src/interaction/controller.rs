//! Pointer state machine: drag, orbit and click selection

use log::debug;
use winit::{event::MouseScrollDelta, keyboard::ModifiersState};

use crate::{
    gfx::{
        camera::{OrbitCamera, OrbitControls, OrbitInput},
        picking::{pixel_to_ndc, raycast_items, screen_to_ray, PickHit, Ray},
        scene::SceneGraph,
    },
    room::FurnitureRegistry,
};

use super::{drag::DragSession, events::InteractionEvent};

/// Pointer travel, in physical pixels, below which a press still counts as a click
pub const CLICK_TOLERANCE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    Orbiting,
}

impl InteractionMode {
    pub fn label(self) -> &'static str {
        match self {
            InteractionMode::Idle => "Idle",
            InteractionMode::Dragging => "Dragging",
            InteractionMode::Orbiting => "Orbiting",
        }
    }
}

/// Read-only view of the state a pointer event is resolved against
pub struct PickView<'a> {
    pub graph: &'a SceneGraph,
    pub registry: &'a FurnitureRegistry,
    pub camera: &'a OrbitCamera,
    /// Surface size in physical pixels
    pub viewport: (f32, f32),
    pub orbit_enabled: bool,
}

impl PickView<'_> {
    pub fn ray_at(&self, cursor: (f32, f32)) -> Ray {
        screen_to_ray(pixel_to_ndc(cursor, self.viewport), self.camera)
    }

    /// Nearest draggable furniture under the cursor
    pub fn pick(&self, cursor: (f32, f32)) -> Option<PickHit> {
        let ray = self.ray_at(cursor);
        raycast_items(self.graph, self.registry.draggable_nodes(), &ray)
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: (f32, f32),
    moved: bool,
}

/// Turns raw pointer input into [`InteractionEvent`]s.
///
/// The controller never mutates the scene; it only reads it through a
/// [`PickView`] and reports what happened.
#[derive(Debug, Default)]
pub struct PointerController {
    mode: InteractionMode,
    cursor: (f32, f32),
    press: Option<Press>,
    drag: Option<DragSession>,
    modifiers: ModifiersState,
}

impl PointerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn ctrl_held(&self) -> bool {
        self.modifiers.control_key()
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Primary button pressed at the current cursor position
    pub fn pointer_down(&mut self, view: &PickView) -> Vec<InteractionEvent> {
        if self.press.is_some() {
            return Vec::new();
        }
        self.press = Some(Press {
            origin: self.cursor,
            moved: false,
        });

        if let Some(hit) = view.pick(self.cursor) {
            let item_position = view
                .graph
                .get(hit.item)
                .map(|node| node.transform.position)
                .unwrap_or(hit.point);
            self.drag = Some(DragSession::begin(
                hit.item,
                hit.point,
                item_position,
                view.camera.forward(),
            ));
            self.mode = InteractionMode::Dragging;
            debug!("Drag start on {:?} at distance {:.2}", hit.item, hit.distance);
            return vec![InteractionEvent::DragStart { item: hit.item }];
        }

        if view.orbit_enabled {
            self.mode = InteractionMode::Orbiting;
        }
        Vec::new()
    }

    pub fn pointer_moved(&mut self, position: (f32, f32), view: &PickView) -> Vec<InteractionEvent> {
        let (dx, dy) = (position.0 - self.cursor.0, position.1 - self.cursor.1);
        self.cursor = position;

        let Some(press) = self.press.as_mut() else {
            return Vec::new();
        };
        if !press.moved {
            let travel = ((position.0 - press.origin.0).powi(2)
                + (position.1 - press.origin.1).powi(2))
            .sqrt();
            press.moved = travel > CLICK_TOLERANCE;
        }
        let moved = press.moved;

        match self.mode {
            InteractionMode::Dragging if moved => {
                let Some(session) = self.drag else {
                    return Vec::new();
                };
                let ray = view.ray_at(position);
                match session.project(&ray) {
                    Some(position) => vec![InteractionEvent::DragMove {
                        item: session.item,
                        position,
                    }],
                    None => Vec::new(),
                }
            }
            InteractionMode::Orbiting => {
                let gesture = if self.modifiers.shift_key() {
                    OrbitInput::Pan { dx, dy }
                } else {
                    OrbitInput::Rotate { dx, dy }
                };
                vec![InteractionEvent::Orbit(gesture)]
            }
            _ => Vec::new(),
        }
    }

    /// Primary button released. A press that never moved is also a click.
    pub fn pointer_up(&mut self, view: &PickView) -> Vec<InteractionEvent> {
        let Some(press) = self.press.take() else {
            return Vec::new();
        };

        let mut events = self.finish_drag();
        self.mode = InteractionMode::Idle;

        if !press.moved {
            match view.pick(self.cursor) {
                Some(hit) => events.push(InteractionEvent::Select { item: hit.item }),
                None => debug!("Click hit no draggable item"),
            }
        }
        events
    }

    pub fn scroll(&self, delta: &MouseScrollDelta) -> Vec<InteractionEvent> {
        if self.mode == InteractionMode::Dragging {
            return Vec::new();
        }
        vec![InteractionEvent::Orbit(OrbitControls::scroll_gesture(delta))]
    }

    /// Abandons the current press, e.g. when the window loses focus
    pub fn cancel(&mut self) -> Vec<InteractionEvent> {
        self.press = None;
        let events = self.finish_drag();
        self.mode = InteractionMode::Idle;
        events
    }

    fn finish_drag(&mut self) -> Vec<InteractionEvent> {
        match self.drag.take() {
            Some(session) => vec![InteractionEvent::DragEnd { item: session.item }],
            None => Vec::new(),
        }
    }
}
