//! Surface materials
//!
//! A material is a flat base color optionally modulated by a texture map.
//! GPU resources for the map are created lazily by the render engine and
//! keyed by the texture's id, so materials stay plain data.

use crate::assets::texture::TextureHandle;

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    /// Color map sampled in the fragment shader, `None` draws the flat color
    pub map: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            map: None,
        }
    }
}

impl Material {
    /// Creates an untextured material with the given RGBA color
    pub fn flat(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            map: None,
        }
    }

    /// Flat white, used for walls
    pub fn white(name: &str) -> Self {
        Self::flat(name, [1.0, 1.0, 1.0, 1.0])
    }

    /// Builder pattern: set the color map
    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    /// Replaces the color map, returning the previous one
    pub fn set_map(&mut self, map: TextureHandle) -> Option<TextureHandle> {
        self.map.replace(map)
    }

    pub fn is_textured(&self) -> bool {
        self.map.is_some()
    }
}
