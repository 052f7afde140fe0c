//! # Asset Loading
//!
//! Models and textures are fetched through the [`AssetLoader`] trait and
//! complete asynchronously on a [`LoadQueue`]. [`FsAssetLoader`] reads glTF,
//! GLB and OBJ models plus PNG/JPEG images from an asset root directory;
//! [`MemoryAssetLoader`] serves pre-registered data.

pub mod error;
pub mod loader;
pub mod memory;
pub mod model;
pub mod pending;
pub mod texture;

pub use error::AssetError;
pub use loader::{AssetLoader, FsAssetLoader, LoadFuture};
pub use memory::MemoryAssetLoader;
pub use model::{ModelData, ModelMesh, ModelNode};
pub use pending::{LoadQueue, PendingLoad};
pub use texture::{TextureHandle, TextureId, TextureImage, TextureSettings};
