//! The application context
//!
//! [`AppContext`] owns everything the viewer mutates: the scene graph, the
//! room, the furniture registry, the selection, the camera rig, the property
//! panel and all in-flight asset loads. Input is reduced to
//! [`InteractionEvent`]s by the controllers and applied here by
//! [`AppContext::dispatch`]; nothing else writes to the scene.

use std::{collections::HashMap, f32::consts::TAU};

use cgmath::{Vector3, Zero};
use futures::future::{self, OptionFuture};
use log::{debug, error, info, warn};
use winit::{
    event::MouseScrollDelta,
    keyboard::{KeyCode, ModifiersState},
};

use crate::{
    assets::{
        AssetError, AssetLoader, LoadQueue, ModelData, PendingLoad, TextureHandle, TextureImage,
        TextureSettings,
    },
    config::ViewerConfig,
    gfx::{
        camera::{CameraManager, CameraUniform, OrbitCamera, OrbitControls},
        scene::{Axis, NodeId, SceneGraph},
    },
    interaction::{
        CameraNav, DragConstraint, InteractionEvent, InteractionMode, KeyboardNavigator, NavKey,
        PickView, PointerController,
    },
    room::{
        apply_texture, build_room, instantiate_model, FurnitureItem, FurnitureRegistry,
        PlacementRequest, Room,
    },
    ui::{PropertyPanelController, SceneOverview},
};

struct LoadedPlacement {
    model: ModelData,
    default_texture: Option<Result<TextureImage, AssetError>>,
}

struct PendingPlacement {
    request: PlacementRequest,
    load: PendingLoad<LoadedPlacement>,
}

struct PendingFloor {
    path: String,
    load: PendingLoad<TextureImage>,
}

struct TextureRequest {
    item: NodeId,
    sequence: u64,
    path: String,
    load: PendingLoad<TextureImage>,
}

pub struct AppContext {
    graph: SceneGraph,
    room: Room,
    registry: FurnitureRegistry,
    selection: Option<NodeId>,
    camera: CameraManager,
    properties: PropertyPanelController,
    pointer: PointerController,
    navigator: KeyboardNavigator,
    drag_constraint: DragConstraint,
    rotation_axis: Axis,
    viewport: (f32, f32),

    loader: Box<dyn AssetLoader>,
    loads: LoadQueue,
    placements: Vec<PendingPlacement>,
    floor_texture: Option<PendingFloor>,
    texture_requests: Vec<TextureRequest>,
    next_texture_sequence: u64,
    latest_texture_request: HashMap<NodeId, u64>,
}

impl AppContext {
    /// Builds the room, starts the floor texture load and places every
    /// configured piece of furniture. Loads complete in [`AppContext::poll_loads`].
    pub fn new(config: &ViewerConfig, loader: Box<dyn AssetLoader>) -> Self {
        let mut graph = SceneGraph::new();
        let room = build_room(&mut graph, &config.room);

        let (width, height) = (config.window.width.max(1), config.window.height.max(1));
        let camera = OrbitCamera::new(
            Vector3::from(config.camera.eye),
            Vector3::from(config.camera.target),
            width as f32 / height as f32,
        );
        let controls = OrbitControls::new(config.camera.rotate_speed, config.camera.zoom_speed);

        let mut context = Self {
            graph,
            room,
            registry: FurnitureRegistry::new(),
            selection: None,
            camera: CameraManager::new(camera, controls),
            properties: PropertyPanelController::new(
                config.texture_catalog(),
                config.interaction.rotation_axis,
            ),
            pointer: PointerController::new(),
            navigator: KeyboardNavigator::new(config.camera.step),
            drag_constraint: config.interaction.drag,
            rotation_axis: config.interaction.rotation_axis,
            viewport: (width as f32, height as f32),
            loader,
            loads: LoadQueue::new(),
            placements: Vec::new(),
            floor_texture: None,
            texture_requests: Vec::new(),
            next_texture_sequence: 0,
            latest_texture_request: HashMap::new(),
        };

        if let Some(path) = &config.floor_texture {
            let load = context.loads.submit(context.loader.load_texture(path));
            context.floor_texture = Some(PendingFloor {
                path: path.clone(),
                load,
            });
        }
        for placement in &config.furniture {
            context.place_model(placement.request());
        }
        context
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn registry(&self) -> &FurnitureRegistry {
        &self.registry
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        self.selection.and_then(|node| self.registry.get(node))
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn properties(&self) -> &PropertyPanelController {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyPanelController {
        &mut self.properties
    }

    pub fn mode(&self) -> InteractionMode {
        self.pointer.mode()
    }

    pub fn drag_constraint(&self) -> DragConstraint {
        self.drag_constraint
    }

    /// Loads submitted but not yet applied
    pub fn pending_loads(&self) -> usize {
        self.placements.len()
            + self.texture_requests.len()
            + usize::from(self.floor_texture.is_some())
    }

    pub fn overview(&self) -> SceneOverview {
        SceneOverview {
            item_names: self.registry.items().iter().map(|i| i.name.clone()).collect(),
            selected: self.selected_item().map(|i| i.name.clone()),
            mode: self.mode(),
            pending_loads: self.pending_loads(),
        }
    }

    /// Starts loading a model (and its default texture, if any).
    ///
    /// Nothing is added to the scene until the load resolves inside
    /// [`AppContext::poll_loads`].
    pub fn place_model(&mut self, request: PlacementRequest) {
        let model = self.loader.load_model(&request.asset_path);
        let texture: OptionFuture<_> = request
            .default_texture
            .as_deref()
            .map(|path| self.loader.load_texture(path))
            .into();
        let load = self.loads.submit(async move {
            let (model, default_texture) = future::join(model, texture).await;
            Ok::<_, AssetError>(LoadedPlacement {
                model: model?,
                default_texture,
            })
        });

        debug!("Placing '{}' from {}", request.name, request.asset_path);
        self.placements.push(PendingPlacement { request, load });
    }

    /// Loads `path` and puts it on every mesh of `item` when it arrives.
    ///
    /// Only the most recent request per item is applied.
    pub fn request_texture(&mut self, item: NodeId, path: &str) {
        self.next_texture_sequence += 1;
        let sequence = self.next_texture_sequence;
        self.latest_texture_request.insert(item, sequence);

        let load = self.loads.submit(self.loader.load_texture(path));
        self.texture_requests.push(TextureRequest {
            item,
            sequence,
            path: path.to_string(),
            load,
        });
    }

    /// Drives outstanding loads and applies the ones that finished.
    /// Returns how many resolved.
    pub fn poll_loads(&mut self) -> usize {
        self.loads.run_until_stalled();

        let mut resolved = 0;
        if let Some(mut floor) = self.floor_texture.take() {
            match floor.load.try_resolve() {
                Some(result) => {
                    resolved += 1;
                    self.finish_floor(&floor.path, result);
                }
                None => self.floor_texture = Some(floor),
            }
        }

        for mut placement in std::mem::take(&mut self.placements) {
            match placement.load.try_resolve() {
                Some(result) => {
                    resolved += 1;
                    self.finish_placement(&placement.request, result);
                }
                None => self.placements.push(placement),
            }
        }

        for mut request in std::mem::take(&mut self.texture_requests) {
            match request.load.try_resolve() {
                Some(result) => {
                    resolved += 1;
                    self.finish_texture(&request, result);
                }
                None => self.texture_requests.push(request),
            }
        }
        resolved
    }

    fn finish_floor(&mut self, path: &str, result: Result<TextureImage, AssetError>) {
        match result {
            Ok(image) => {
                let texture = TextureHandle::new(path, image, TextureSettings::floor());
                if self.room.texture_floor(&mut self.graph, texture) {
                    info!("Floor textured with {}", path);
                }
            }
            Err(e) => error!("Floor texture {} failed, floor stays untextured: {}", path, e),
        }
    }

    fn finish_placement(
        &mut self,
        request: &PlacementRequest,
        result: Result<LoadedPlacement, AssetError>,
    ) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("Failed to load '{}' from {}: {}", request.name, request.asset_path, e);
                return;
            }
        };

        let root = instantiate_model(&mut self.graph, &loaded.model, request);
        match (loaded.default_texture, request.default_texture.as_deref()) {
            (Some(Ok(image)), Some(path)) => {
                let texture = TextureHandle::new(path, image, TextureSettings::surface());
                apply_texture(&mut self.graph, root, &texture);
            }
            (Some(Err(e)), path) => {
                error!(
                    "Default texture {} for '{}' failed: {}",
                    path.unwrap_or_default(),
                    request.name,
                    e
                );
            }
            _ => {}
        }

        if request.draggable {
            let item = FurnitureItem {
                node: root,
                name: request.name.clone(),
                draggable: true,
            };
            if let Err(e) = self.registry.register(&self.graph, item) {
                warn!("Could not register '{}': {}", request.name, e);
            }
        }
    }

    fn finish_texture(&mut self, request: &TextureRequest, result: Result<TextureImage, AssetError>) {
        if self.latest_texture_request.get(&request.item) != Some(&request.sequence) {
            debug!("Dropping superseded texture {}", request.path);
            return;
        }
        self.latest_texture_request.remove(&request.item);

        match result {
            Ok(image) => {
                let texture = TextureHandle::new(&request.path, image, TextureSettings::surface());
                let count = apply_texture(&mut self.graph, request.item, &texture);
                info!("Applied {} to {} mesh(es)", request.path, count);
            }
            Err(e) => error!("Texture {} failed, keeping current texture: {}", request.path, e),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width as f32, height as f32);
        self.camera.resize(width, height);
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.pointer.set_modifiers(modifiers);
    }

    pub fn pointer_moved(&mut self, position: (f32, f32)) {
        let view = PickView {
            graph: &self.graph,
            registry: &self.registry,
            camera: &self.camera.camera,
            viewport: self.viewport,
            orbit_enabled: self.camera.orbit_enabled(),
        };
        let events = self.pointer.pointer_moved(position, &view);
        self.dispatch_all(events);
    }

    pub fn pointer_pressed(&mut self) {
        let view = PickView {
            graph: &self.graph,
            registry: &self.registry,
            camera: &self.camera.camera,
            viewport: self.viewport,
            orbit_enabled: self.camera.orbit_enabled(),
        };
        let events = self.pointer.pointer_down(&view);
        self.dispatch_all(events);
    }

    pub fn pointer_released(&mut self) {
        let view = PickView {
            graph: &self.graph,
            registry: &self.registry,
            camera: &self.camera.camera,
            viewport: self.viewport,
            orbit_enabled: self.camera.orbit_enabled(),
        };
        let events = self.pointer.pointer_up(&view);
        self.dispatch_all(events);
    }

    /// Ends any press in progress without treating it as a click
    pub fn pointer_cancelled(&mut self) {
        let events = self.pointer.cancel();
        self.dispatch_all(events);
    }

    pub fn scrolled(&mut self, delta: &MouseScrollDelta) {
        let events = self.pointer.scroll(delta);
        self.dispatch_all(events);
    }

    /// Handles a navigation key press. Returns false for keys it ignores.
    pub fn key_pressed(&mut self, code: KeyCode) -> bool {
        let Some(key) = NavKey::from_key_code(code) else {
            return false;
        };
        match self.navigator.navigate(key, self.pointer.ctrl_held()) {
            Some(nav) => {
                self.dispatch(InteractionEvent::CameraNav(nav));
                true
            }
            None => false,
        }
    }

    pub fn dispatch_all(&mut self, events: impl IntoIterator<Item = InteractionEvent>) {
        for event in events {
            self.dispatch(event);
        }
    }

    /// Applies one interaction to the scene
    pub fn dispatch(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::DragStart { item } => {
                debug!("Drag start {:?}", item);
                self.camera.set_orbit_enabled(false);
            }
            InteractionEvent::DragMove { item, position } => {
                if !self.registry.get(item).is_some_and(|i| i.draggable) {
                    debug!("Ignoring drag of non-draggable node {:?}", item);
                    return;
                }
                let position = self.drag_constraint.clamp(position);
                if let Some(node) = self.graph.get_mut(item) {
                    node.transform.position = position;
                }
            }
            InteractionEvent::DragEnd { item } => {
                debug!("Drag end {:?}", item);
                self.camera.set_orbit_enabled(true);
            }
            InteractionEvent::Select { item } => self.select(item),
            InteractionEvent::RotateChanged { item, radians } => {
                let radians = radians.clamp(0.0, TAU);
                let axis = self.rotation_axis;
                if let Some(node) = self.graph.get_mut(item) {
                    axis.set(&mut node.transform.rotation, radians);
                }
                if let Some(panel) = self.properties.panel_mut().filter(|p| p.item == item) {
                    panel.rotation.set(radians);
                }
            }
            InteractionEvent::TextureChanged { item, label } => {
                let Some(name) = self.registry.get(item).map(|i| i.name.clone()) else {
                    debug!("Texture change for unknown item {:?}", item);
                    return;
                };
                match self.properties.texture_path(&name, &label) {
                    Some(path) => self.request_texture(item, &path),
                    None => warn!("No '{}' texture configured for '{}'", label, name),
                }
            }
            InteractionEvent::CameraNav(nav) => self.navigate(nav),
            InteractionEvent::Orbit(input) => {
                if !self.camera.apply_orbit(input) {
                    debug!("Orbit input ignored while disabled");
                }
            }
        }
    }

    fn select(&mut self, item: NodeId) {
        let Some(selected) = self.registry.get(item).filter(|i| i.draggable).cloned() else {
            debug!("Ignoring selection of {:?}", item);
            return;
        };
        let rotation = self
            .graph
            .get(item)
            .map(|node| self.rotation_axis.get(node.transform.rotation))
            .unwrap_or(0.0);

        info!("Selected '{}'", selected.name);
        self.selection = Some(item);
        self.properties.on_selection_changed(&selected, rotation);
    }

    fn navigate(&mut self, nav: CameraNav) {
        let was_enabled = self.camera.orbit_enabled();
        self.camera.set_orbit_enabled(false);

        match nav {
            CameraNav::Translate(delta) => self.camera.camera.translate(delta),
            CameraNav::ResetPosition => self.camera.camera.set_eye(Vector3::zero()),
        }
        let target = self.camera.camera.target;
        self.camera.set_orbit_target(target);

        self.camera.set_orbit_enabled(was_enabled);
    }

    /// Applies finished loads and refreshes the camera uniform
    pub fn update(&mut self) {
        self.poll_loads();
        self.camera.camera.update_view_proj();
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        self.camera.camera.uniform
    }
}
