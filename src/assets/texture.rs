//! Decoded texture images and the shareable handles materials hold

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an uploaded texture, used as the GPU cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Tightly packed RGBA8 pixels, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// A 1x1 image of a single color
    pub fn solid(color: [u8; 4]) -> Self {
        Self::new(1, 1, color.to_vec())
    }
}

/// Sampling parameters applied when a texture is put on a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSettings {
    /// UV repeat count in u and v
    pub repeat: [f32; 2],
    pub anisotropy: u16,
    /// Decode as sRGB color data
    pub srgb: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            repeat: [1.0, 1.0],
            anisotropy: 1,
            srgb: true,
        }
    }
}

impl TextureSettings {
    /// Tiled floor: 5x5 repeat with 4x anisotropic filtering
    pub fn floor() -> Self {
        Self {
            repeat: [5.0, 5.0],
            anisotropy: 4,
            ..Self::default()
        }
    }

    /// Furniture surfaces: sRGB, no vertical flip
    pub fn surface() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct TextureInner {
    id: TextureId,
    label: String,
    image: TextureImage,
    settings: TextureSettings,
}

/// Cheaply cloneable reference to a decoded texture and its settings.
///
/// Each handle carries a fresh [`TextureId`], so loading the same path twice
/// uploads it twice.
#[derive(Debug, Clone)]
pub struct TextureHandle(Arc<TextureInner>);

impl TextureHandle {
    pub fn new(label: impl Into<String>, image: TextureImage, settings: TextureSettings) -> Self {
        TextureHandle(Arc::new(TextureInner {
            id: TextureId::next(),
            label: label.into(),
            image,
            settings,
        }))
    }

    pub fn id(&self) -> TextureId {
        self.0.id
    }

    /// Source path the texture was loaded from
    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn image(&self) -> &TextureImage {
        &self.0.image
    }

    pub fn settings(&self) -> TextureSettings {
        self.0.settings
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_get_distinct_ids() {
        let image = TextureImage::solid([255; 4]);
        let a = TextureHandle::new("a.png", image.clone(), TextureSettings::surface());
        let b = TextureHandle::new("a.png", image, TextureSettings::floor());
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(b.label(), "a.png");
        assert_eq!(b.settings().repeat, [5.0, 5.0]);
        assert_eq!(b.settings().anisotropy, 4);
    }

    #[test]
    fn test_surface_settings_keep_rows_and_srgb() {
        let settings = TextureSettings::surface();
        assert!(settings.srgb);
        assert_eq!(settings.repeat, [1.0, 1.0]);
    }
}
