//! End-to-end scenarios driving `AppContext` with in-memory assets

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};
use furnish::{
    assets::{AssetError, MemoryAssetLoader, ModelData, TextureImage},
    gfx::{geometry::generate_box, scene::MeshData},
    interaction::InteractionMode,
    room::{PlacementRequest, WallKind},
    AppContext, InteractionEvent, ViewerConfig,
};
use winit::keyboard::{KeyCode, ModifiersState};

const CHAIR: &str = "scene/chair/scene.gltf";
const CHAIR_BASE: &str = "scene/chair/textures/Material_baseColor.png";
const CHAIR_NORMAL: &str = "scene/chair/textures/Material_normal.png";
const CHAIR_METALLIC: &str = "scene/chair/textures/Material_metallicRoughness.png";

fn box_model(name: &str, size: f32) -> ModelData {
    ModelData::single_mesh(name, MeshData::from_geometry(&generate_box(size, size, size)))
}

fn chair_assets() -> MemoryAssetLoader {
    MemoryAssetLoader::new()
        .with_model(CHAIR, box_model("Sketchfab_model", 2.0))
        .with_texture(CHAIR_BASE, TextureImage::solid([180, 120, 80, 255]))
        .with_texture(CHAIR_METALLIC, TextureImage::solid([40, 40, 40, 255]))
}

/// Stock configuration without the floor texture or the default chair
fn empty_room() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.floor_texture = None;
    config.furniture.clear();
    config
}

fn square_viewport(context: &mut AppContext) {
    context.set_viewport(800, 800);
}

fn click(context: &mut AppContext, at: (f32, f32)) {
    context.pointer_moved(at);
    context.pointer_pressed();
    context.pointer_released();
}

fn map_labels(context: &AppContext, item: furnish::gfx::scene::NodeId) -> Vec<Option<String>> {
    context
        .graph()
        .mesh_descendants(item)
        .into_iter()
        .map(|id| {
            context
                .graph()
                .get(id)
                .and_then(|node| node.material())
                .and_then(|material| material.map.as_ref())
                .map(|map| map.label().to_string())
        })
        .collect()
}

#[test]
fn chair_is_registered_only_after_its_load_resolves() {
    let mut context = AppContext::new(&ViewerConfig::default(), Box::new(chair_assets()));
    assert!(context.registry().is_empty());
    assert!(context.pending_loads() > 0);

    context.poll_loads();

    assert_eq!(context.registry().len(), 1);
    let chair = context.registry().items()[0].clone();
    assert_eq!(chair.name, "chair");
    assert!(chair.draggable);

    let node = context.graph().get(chair.node).unwrap();
    assert_eq!(node.transform.position, Vector3::new(10.0, 0.0, 0.0));
    assert_eq!(node.transform.scale, Vector3::new(1.0, 1.0, 1.0));

    // Every mesh is labeled with the item name and carries the default texture
    for id in context.graph().mesh_descendants(chair.node) {
        assert_eq!(context.graph().get(id).unwrap().name, "chair");
    }
    assert!(map_labels(&context, chair.node)
        .iter()
        .all(|label| label.as_deref() == Some(CHAIR_BASE)));

    context.dispatch(InteractionEvent::Select { item: chair.node });
    let panel = context.properties().panel().unwrap();
    assert_eq!(panel.title, "chair");
    assert_eq!(panel.rotation.min, 0.0);
    assert_eq!(panel.rotation.max, TAU);
    assert_eq!(
        panel.texture.table.labels().collect::<Vec<_>>(),
        vec!["base", "normal", "metallic"]
    );
    assert_eq!(panel.texture.current_label(), "texture");
}

#[test]
fn failed_model_load_adds_nothing() {
    let mut assets = chair_assets();
    assets.insert_model_error(CHAIR, AssetError::decode(CHAIR, "truncated buffer"));
    let mut context = AppContext::new(&ViewerConfig::default(), Box::new(assets));
    let nodes_before = context.graph().len();

    context.poll_loads();

    assert!(context.registry().is_empty());
    assert_eq!(context.graph().len(), nodes_before);
    assert_eq!(context.pending_loads(), 0);
}

#[test]
fn walls_are_static_and_floor_survives_missing_texture() {
    // Default config asks for a floor image the loader does not have
    let mut config = ViewerConfig::default();
    config.furniture.clear();
    let mut context = AppContext::new(&config, Box::new(MemoryAssetLoader::new()));
    context.poll_loads();

    let segments = context.room().segments();
    assert_eq!(segments.len(), 5);
    let sides: Vec<_> = segments.iter().filter(|s| s.kind == WallKind::Side).collect();
    assert_eq!(sides.len(), 2);
    for side in sides {
        assert_eq!(side.position.x.abs(), 25.0);
        assert_eq!(side.size, [0.5, 15.0, 100.0]);
        assert!(context.registry().get(side.node).is_none());
    }

    let floor = context.room().floor().unwrap();
    let material = context.graph().get(floor.node).unwrap().material().unwrap();
    assert!(!material.is_textured());
}

#[test]
fn click_selects_nearest_of_two_items() {
    let mut config = empty_room();
    config.camera.eye = [10.0, 0.0, -30.0];
    config.camera.target = [10.0, 0.0, 0.0];
    let assets = MemoryAssetLoader::new()
        .with_model("near.obj", box_model("near", 2.0))
        .with_model("far.obj", box_model("far", 2.0));
    let mut context = AppContext::new(&config, Box::new(assets));
    square_viewport(&mut context);

    context.place_model(PlacementRequest::new("far.obj", 1.0, Vector3::new(10.0, 0.0, 5.0), "far"));
    context.place_model(PlacementRequest::new("near.obj", 1.0, Vector3::new(10.0, 0.0, -5.0), "near"));
    context.poll_loads();
    assert_eq!(context.registry().len(), 2);

    click(&mut context, (400.0, 400.0));

    let selected = context.selected_item().unwrap();
    assert_eq!(selected.name, "near");
    assert_eq!(context.properties().panel().unwrap().title, "near");
}

#[test]
fn click_on_wall_keeps_selection() {
    let mut config = empty_room();
    config.camera.eye = [0.0, 0.0, 0.0];
    config.camera.target = [25.0, 0.0, 0.0];
    let mut context = AppContext::new(&config, Box::new(chair_assets()));
    square_viewport(&mut context);

    context.place_model(PlacementRequest::new(CHAIR, 1.0, Vector3::new(-10.0, 0.0, 0.0), "chair"));
    context.poll_loads();
    let chair = context.registry().items()[0].node;
    context.dispatch(InteractionEvent::Select { item: chair });

    // Straight at the +x wall
    click(&mut context, (400.0, 400.0));

    assert_eq!(context.selection(), Some(chair));
    assert_eq!(context.properties().panel().unwrap().item, chair);
}

#[test]
fn non_draggable_model_is_placed_but_never_picked() {
    let mut config = empty_room();
    config.camera.eye = [10.0, 0.0, -30.0];
    config.camera.target = [10.0, 0.0, 0.0];
    let assets = chair_assets().with_model("cabinet.obj", box_model("cabinet", 4.0));
    let mut context = AppContext::new(&config, Box::new(assets));
    square_viewport(&mut context);

    context.place_model(
        PlacementRequest::new("cabinet.obj", 1.0, Vector3::new(10.0, 0.0, 0.0), "cabinet")
            .with_draggable(false),
    );
    context.place_model(PlacementRequest::new(CHAIR, 1.0, Vector3::new(-10.0, 0.0, 0.0), "chair"));
    context.poll_loads();

    // Instantiated and labeled, but only the chair is registered
    let graph = context.graph();
    let cabinet_meshes: Vec<_> = graph
        .mesh_descendants(graph.root())
        .into_iter()
        .filter(|id| graph.get(*id).unwrap().name == "cabinet")
        .collect();
    assert!(!cabinet_meshes.is_empty());
    let mut cabinet = cabinet_meshes[0];
    while let Some(parent) = graph.get(cabinet).unwrap().parent() {
        if parent == graph.root() {
            break;
        }
        cabinet = parent;
    }
    assert_eq!(
        graph.get(cabinet).unwrap().transform.position,
        Vector3::new(10.0, 0.0, 0.0)
    );
    assert_eq!(context.registry().len(), 1);
    assert!(context.registry().get(cabinet).is_none());

    let chair = context.registry().items()[0].node;
    context.dispatch(InteractionEvent::Select { item: chair });

    // Straight at the cabinet: no drag starts and the selection stays put
    context.pointer_moved((400.0, 400.0));
    context.pointer_pressed();
    assert_ne!(context.mode(), InteractionMode::Dragging);
    context.pointer_released();

    assert_eq!(context.selection(), Some(chair));
    assert_eq!(
        context.graph().get(cabinet).unwrap().transform.position,
        Vector3::new(10.0, 0.0, 0.0)
    );

    // Events aimed at it directly are ignored as well
    context.dispatch(InteractionEvent::Select { item: cabinet });
    context.dispatch(InteractionEvent::DragMove {
        item: cabinet,
        position: Vector3::new(0.0, 5.0, 0.0),
    });
    assert_eq!(context.selection(), Some(chair));
    assert_eq!(
        context.graph().get(cabinet).unwrap().transform.position,
        Vector3::new(10.0, 0.0, 0.0)
    );
}

#[test]
fn drag_keeps_depth_clamped_and_toggles_orbit() {
    let mut config = empty_room();
    config.camera.eye = [10.0, 10.0, -10.0];
    config.camera.target = [0.0, 0.0, 0.0];
    let mut context = AppContext::new(&config, Box::new(chair_assets()));
    square_viewport(&mut context);

    context.place_model(PlacementRequest::new(CHAIR, 1.0, Vector3::new(0.0, 0.0, 0.0), "chair"));
    context.poll_loads();
    let chair = context.registry().items()[0].node;

    context.pointer_moved((400.0, 400.0));
    assert!(context.camera().orbit_enabled());
    context.pointer_pressed();
    assert!(!context.camera().orbit_enabled());

    for step in 1..=5 {
        let offset = step as f32 * 20.0;
        context.pointer_moved((400.0 + offset, 400.0 + offset * 0.5));
        assert!(!context.camera().orbit_enabled());

        let position = context.graph().get(chair).unwrap().transform.position;
        assert_eq!(position.z, 0.0);
    }
    let moved_to = context.graph().get(chair).unwrap().transform.position;
    assert!(Vector3::new(moved_to.x, moved_to.y, 0.0).magnitude() > 0.5);

    context.pointer_released();
    assert!(context.camera().orbit_enabled());
    // A drag is not a click
    assert_eq!(context.selection(), None);
}

#[test]
fn drag_clamp_follows_configuration() {
    let mut config = empty_room();
    config.interaction.drag.value = 2.0;
    config.camera.eye = [10.0, 10.0, -8.0];
    config.camera.target = [0.0, 0.0, 2.0];
    let mut context = AppContext::new(&config, Box::new(chair_assets()));
    square_viewport(&mut context);

    context.place_model(PlacementRequest::new(CHAIR, 1.0, Vector3::new(0.0, 0.0, 2.0), "chair"));
    context.poll_loads();
    let chair = context.registry().items()[0].node;

    context.pointer_moved((400.0, 400.0));
    context.pointer_pressed();
    context.pointer_moved((360.0, 450.0));
    context.pointer_released();

    let position = context.graph().get(chair).unwrap().transform.position;
    assert_eq!(position.z, 2.0);
}

#[test]
fn failed_texture_change_keeps_previous_map() {
    let mut assets = chair_assets();
    assets.insert_texture_error(CHAIR_NORMAL, AssetError::NotFound(CHAIR_NORMAL.to_string()));
    let mut context = AppContext::new(&ViewerConfig::default(), Box::new(assets));
    context.poll_loads();
    let chair = context.registry().items()[0].node;
    context.dispatch(InteractionEvent::Select { item: chair });

    context.dispatch(InteractionEvent::TextureChanged {
        item: chair,
        label: "normal".to_string(),
    });
    context.poll_loads();

    assert!(map_labels(&context, chair)
        .iter()
        .all(|label| label.as_deref() == Some(CHAIR_BASE)));
}

#[test]
fn latest_texture_choice_wins() {
    let mut context = AppContext::new(&ViewerConfig::default(), Box::new(chair_assets()));
    context.poll_loads();
    let chair = context.registry().items()[0].node;
    context.dispatch(InteractionEvent::Select { item: chair });

    context.dispatch(InteractionEvent::TextureChanged {
        item: chair,
        label: "metallic".to_string(),
    });
    context.dispatch(InteractionEvent::TextureChanged {
        item: chair,
        label: "base".to_string(),
    });
    context.poll_loads();
    assert!(map_labels(&context, chair)
        .iter()
        .all(|label| label.as_deref() == Some(CHAIR_BASE)));

    context.dispatch(InteractionEvent::TextureChanged {
        item: chair,
        label: "metallic".to_string(),
    });
    context.poll_loads();
    assert!(map_labels(&context, chair)
        .iter()
        .all(|label| label.as_deref() == Some(CHAIR_METALLIC)));
}

#[test]
fn rotation_edit_applies_to_configured_axis() {
    let mut context = AppContext::new(&ViewerConfig::default(), Box::new(chair_assets()));
    context.poll_loads();
    let chair = context.registry().items()[0].node;
    context.dispatch(InteractionEvent::Select { item: chair });

    context.dispatch(InteractionEvent::RotateChanged {
        item: chair,
        radians: 1.25,
    });
    let rotation = context.graph().get(chair).unwrap().transform.rotation;
    assert_eq!(rotation, Vector3::new(0.0, 0.0, 1.25));
    assert_eq!(context.properties().panel().unwrap().rotation.value, 1.25);

    context.dispatch(InteractionEvent::RotateChanged {
        item: chair,
        radians: 9.0,
    });
    assert_eq!(context.graph().get(chair).unwrap().transform.rotation.z, TAU);
}

#[test]
fn arrow_keys_translate_eye_and_target_together() {
    let mut context = AppContext::new(&empty_room(), Box::new(MemoryAssetLoader::new()));
    let camera = &context.camera().camera;
    let offset = camera.eye - camera.target;
    let start_eye = camera.eye;

    for key in [
        KeyCode::ArrowUp,
        KeyCode::ArrowLeft,
        KeyCode::ArrowLeft,
        KeyCode::ArrowDown,
        KeyCode::ArrowRight,
    ] {
        assert!(context.key_pressed(key));
        let camera = &context.camera().camera;
        assert!(((camera.eye - camera.target) - offset).magnitude() < 1e-5);
        assert!(context.camera().orbit_enabled());
    }
    let eye = context.camera().camera.eye;
    assert!((eye - (start_eye + Vector3::new(-1.0, 0.0, 0.0))).magnitude() < 1e-5);

    context.set_modifiers(ModifiersState::CONTROL);
    assert!(context.key_pressed(KeyCode::ArrowLeft));
    let eye = context.camera().camera.eye;
    assert!((eye - (start_eye + Vector3::new(-1.0, 0.0, 1.0))).magnitude() < 1e-5);
    assert!(!context.key_pressed(KeyCode::ArrowUp));
    context.set_modifiers(ModifiersState::empty());

    let target = context.camera().camera.target;
    assert!(context.key_pressed(KeyCode::Space));
    assert_eq!(context.camera().camera.eye, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(context.camera().camera.target, target);
}

#[test]
fn keyboard_navigation_does_not_reenable_orbit_mid_drag() {
    let mut config = empty_room();
    config.camera.eye = [10.0, 10.0, -10.0];
    let mut context = AppContext::new(&config, Box::new(chair_assets()));
    square_viewport(&mut context);
    context.place_model(PlacementRequest::new(CHAIR, 1.0, Vector3::new(0.0, 0.0, 0.0), "chair"));
    context.poll_loads();

    context.pointer_moved((400.0, 400.0));
    context.pointer_pressed();
    assert!(!context.camera().orbit_enabled());

    context.key_pressed(KeyCode::ArrowUp);
    assert!(!context.camera().orbit_enabled());

    context.pointer_released();
    assert!(context.camera().orbit_enabled());
}
