//! Viewer configuration
//!
//! Every field has a default reproducing the stock scene (the chair in the
//! room), so a TOML file only needs the keys it changes.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use cgmath::Vector3;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    gfx::scene::Axis,
    interaction::DragConstraint,
    room::{PlacementRequest, RoomDimensions},
    ui::{TextureCatalog, TextureChoiceTable},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory asset paths are resolved against
    pub asset_root: PathBuf,
    pub window: WindowConfig,
    pub room: RoomDimensions,
    /// Tiled floor image; `None` leaves the floor flat white
    pub floor_texture: Option<String>,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    pub furniture: Vec<PlacementConfig>,
    /// Texture choices keyed by furniture name; `default` applies to the rest
    pub texture_sets: HashMap<String, TextureSetConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let mut texture_sets = HashMap::new();
        texture_sets.insert(
            "chair".to_string(),
            TextureSetConfig {
                base: Some("scene/chair/textures/Material_baseColor.png".to_string()),
                normal: Some("scene/chair/textures/Material_normal.png".to_string()),
                metallic: Some("scene/chair/textures/Material_metallicRoughness.png".to_string()),
            },
        );

        Self {
            asset_root: PathBuf::from("."),
            window: WindowConfig::default(),
            room: RoomDimensions::default(),
            floor_texture: Some("scene/wall/textures/sample.jpg".to_string()),
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
            furniture: vec![PlacementConfig {
                path: "scene/chair/scene.gltf".to_string(),
                name: "chair".to_string(),
                position: [10.0, 0.0, 0.0],
                default_texture: Some("scene/chair/textures/Material_baseColor.png".to_string()),
                ..PlacementConfig::default()
            }],
            texture_sets,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn texture_catalog(&self) -> TextureCatalog {
        let mut catalog = TextureCatalog::new();
        for (name, set) in &self.texture_sets {
            catalog.insert(name.clone(), set.table());
        }
        catalog
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Furnish".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Distance moved per arrow-key press
    pub step: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [10.0, 10.0, -10.0],
            target: [0.0, 0.0, 0.0],
            step: 1.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub drag: DragConstraint,
    /// Axis the property panel's rotation slider turns about
    pub rotation_axis: Axis,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag: DragConstraint::default(),
            rotation_axis: Axis::Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub path: String,
    pub name: String,
    pub position: [f32; 3],
    pub scale: f32,
    pub draggable: bool,
    pub default_texture: Option<String>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            name: String::new(),
            position: [0.0, 0.0, 0.0],
            scale: 1.0,
            draggable: true,
            default_texture: None,
        }
    }
}

impl PlacementConfig {
    pub fn request(&self) -> PlacementRequest {
        let request = PlacementRequest::new(
            &self.path,
            self.scale,
            Vector3::from(self.position),
            &self.name,
        )
        .with_draggable(self.draggable);
        match &self.default_texture {
            Some(texture) => request.with_default_texture(texture),
            None => request,
        }
    }
}

/// The three texture slots offered for a furniture type
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TextureSetConfig {
    pub base: Option<String>,
    pub normal: Option<String>,
    pub metallic: Option<String>,
}

impl TextureSetConfig {
    /// Table in base, normal, metallic order, skipping empty slots
    pub fn table(&self) -> TextureChoiceTable {
        TextureChoiceTable::new(
            [
                ("base", &self.base),
                ("normal", &self.normal),
                ("metallic", &self.metallic),
            ]
            .into_iter()
            .filter_map(|(label, path)| path.clone().map(|p| (label, p))),
        )
    }
}
