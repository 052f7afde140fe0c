//! In-memory asset source for headless runs and tests

use std::collections::HashMap;

use super::{
    error::AssetError,
    loader::{AssetLoader, LoadFuture},
    model::ModelData,
    texture::TextureImage,
};

/// Serves models and images registered up front, keyed by path.
///
/// Unknown paths fail with [`AssetError::NotFound`]; paths registered with
/// [`MemoryAssetLoader::insert_model_error`] or
/// [`MemoryAssetLoader::insert_texture_error`] fail with that error.
#[derive(Default)]
pub struct MemoryAssetLoader {
    models: HashMap<String, Result<ModelData, AssetError>>,
    textures: HashMap<String, Result<TextureImage, AssetError>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, path: &str, model: ModelData) -> Self {
        self.insert_model(path, model);
        self
    }

    pub fn with_texture(mut self, path: &str, image: TextureImage) -> Self {
        self.insert_texture(path, image);
        self
    }

    pub fn insert_model(&mut self, path: &str, model: ModelData) {
        self.models.insert(path.to_string(), Ok(model));
    }

    pub fn insert_texture(&mut self, path: &str, image: TextureImage) {
        self.textures.insert(path.to_string(), Ok(image));
    }

    pub fn insert_model_error(&mut self, path: &str, error: AssetError) {
        self.models.insert(path.to_string(), Err(error));
    }

    pub fn insert_texture_error(&mut self, path: &str, error: AssetError) {
        self.textures.insert(path.to_string(), Err(error));
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_model(&self, path: &str) -> LoadFuture<ModelData> {
        let result = self
            .models
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(AssetError::NotFound(path.to_string())));
        Box::pin(async move { result })
    }

    fn load_texture(&self, path: &str) -> LoadFuture<TextureImage> {
        let result = self
            .textures
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(AssetError::NotFound(path.to_string())));
        Box::pin(async move { result })
    }
}
