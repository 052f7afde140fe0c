//! The asset loading seam and its filesystem implementation

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use cgmath::{Euler, Quaternion, Vector3};
use futures::{
    channel::oneshot,
    future::{self, LocalBoxFuture},
    FutureExt,
};
use log::{debug, info};

use super::{
    error::AssetError,
    model::{ModelData, ModelNode},
    texture::TextureImage,
};
use crate::gfx::scene::{MeshData, Transform};

/// A load that completes later, on the viewer's local executor
pub type LoadFuture<T> = LocalBoxFuture<'static, Result<T, AssetError>>;

/// Source of models and texture images.
///
/// Returned futures must not block when polled: the viewer drives them on
/// the render thread between frames.
pub trait AssetLoader {
    fn load_model(&self, path: &str) -> LoadFuture<ModelData>;
    fn load_texture(&self, path: &str) -> LoadFuture<TextureImage>;
}

/// Loads glTF/GLB and OBJ models and common image formats from disk.
///
/// File reads and decoding run on a worker thread per load; the returned
/// future only waits for the result.
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_model(&self, path: &str) -> LoadFuture<ModelData> {
        let full_path = self.resolve(path);
        let label = path.to_string();
        spawn_blocking(label.clone(), move || {
            fs::metadata(&full_path).map_err(|e| AssetError::io(&label, &e))?;
            let extension = full_path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            let model = match extension.as_str() {
                "gltf" | "glb" => load_gltf(&full_path, &label)?,
                "obj" => load_obj(&full_path, &label)?,
                _ => return Err(AssetError::Unsupported(label)),
            };
            info!("Loaded model {} ({} meshes)", label, model.mesh_count());
            Ok(model)
        })
    }

    fn load_texture(&self, path: &str) -> LoadFuture<TextureImage> {
        let full_path = self.resolve(path);
        let label = path.to_string();
        spawn_blocking(label.clone(), move || {
            let bytes = fs::read(&full_path).map_err(|e| AssetError::io(&label, &e))?;
            let decoded =
                image::load_from_memory(&bytes).map_err(|e| AssetError::decode(&label, e))?;
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            debug!("Decoded texture {} ({}x{})", label, width, height);
            Ok(TextureImage::new(width, height, rgba.into_raw()))
        })
    }
}

/// Runs `work` on its own thread and resolves with its result.
///
/// A worker that panics drops its sender, which surfaces as
/// [`AssetError::Cancelled`].
fn spawn_blocking<T, F>(label: String, work: F) -> LoadFuture<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AssetError> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name(format!("load {}", label))
        .spawn(move || {
            let _ = sender.send(work());
        });

    match spawned {
        Ok(_) => async move { receiver.await.unwrap_or(Err(AssetError::Cancelled)) }.boxed_local(),
        Err(e) => future::ready(Err(AssetError::io(&label, &e))).boxed_local(),
    }
}

fn load_gltf(path: &Path, label: &str) -> Result<ModelData, AssetError> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| AssetError::decode(label, e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::decode(label, "file contains no scenes"))?;

    let mut root = ModelNode::new(scene.name().unwrap_or(label));
    for node in scene.nodes() {
        root.children.push(convert_gltf_node(&node, &buffers, label)?);
    }
    Ok(ModelData::new(root))
}

fn convert_gltf_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    label: &str,
) -> Result<ModelNode, AssetError> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let quaternion = Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]);
    let euler = Euler::from(quaternion);

    let mut converted = ModelNode::new(
        node.name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index())),
    );
    converted.transform = Transform::from_position(Vector3::from(translation))
        .with_rotation(Vector3::new(euler.x.0, euler.y.0, euler.z.0))
        .with_scale(Vector3::from(scale));

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!("Skipping non-triangle primitive in {}", label);
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| AssetError::decode(label, "mesh primitive has no positions"))?
                .collect();
            let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
            let tex_coords: Option<Vec<[f32; 2]>> =
                reader.read_tex_coords(0).map(|t| t.into_f32().collect());
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let mesh_data = MeshData::from_arrays(
                &positions,
                normals.as_deref(),
                tex_coords.as_deref(),
                indices,
            );
            let base_color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            converted = converted.with_mesh(Arc::new(mesh_data), base_color);
        }
    }

    for child in node.children() {
        converted.children.push(convert_gltf_node(&child, buffers, label)?);
    }

    Ok(converted)
}

fn load_obj(path: &Path, label: &str) -> Result<ModelData, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| AssetError::decode(label, e))?;

    let materials = materials.unwrap_or_else(|e| {
        debug!("No MTL materials for {}: {}", label, e);
        Vec::new()
    });

    let mut root = ModelNode::new(label);
    for model in models {
        let mesh = &model.mesh;
        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let normals: Vec<[f32; 3]> = mesh
            .normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect();
        let tex_coords: Vec<[f32; 2]> = mesh
            .texcoords
            .chunks_exact(2)
            .map(|t| [t[0], t[1]])
            .collect();

        let mesh_data = MeshData::from_arrays(
            &positions,
            (!normals.is_empty()).then_some(&normals[..]),
            (!tex_coords.is_empty()).then_some(&tex_coords[..]),
            mesh.indices.clone(),
        );
        let diffuse = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .and_then(|m| m.diffuse)
            .unwrap_or([0.8, 0.8, 0.8]);

        root.children.push(
            ModelNode::new(model.name.clone())
                .with_mesh(Arc::new(mesh_data), [diffuse[0], diffuse[1], diffuse[2], 1.0]),
        );
    }

    Ok(ModelData::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{executor::block_on, task::noop_waker_ref};
    use std::{sync::mpsc, task::Context};

    #[test]
    fn test_missing_model_is_not_found() {
        let loader = FsAssetLoader::new("definitely/not/here");
        let result = block_on(loader.load_model("chair/scene.gltf"));
        assert_eq!(
            result.unwrap_err(),
            AssetError::NotFound("chair/scene.gltf".to_string())
        );
    }

    #[test]
    fn test_missing_texture_is_not_found() {
        let loader = FsAssetLoader::new("definitely/not/here");
        let result = block_on(loader.load_texture("wall/sample.jpg"));
        assert_eq!(
            result.unwrap_err(),
            AssetError::NotFound("wall/sample.jpg".to_string())
        );
    }

    #[test]
    fn test_worker_load_does_not_run_on_polling_thread() {
        let (release, gate) = mpsc::channel::<()>();
        let mut load = spawn_blocking("slow.png".to_string(), move || {
            gate.recv().map_err(|_| AssetError::Cancelled)?;
            Ok(TextureImage::solid([1, 2, 3, 4]))
        });

        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(load.poll_unpin(&mut cx).is_pending());

        release.send(()).unwrap();
        assert_eq!(block_on(load), Ok(TextureImage::solid([1, 2, 3, 4])));
    }

    #[test]
    fn test_texture_decodes_from_disk() {
        let dir = std::env::temp_dir().join(format!("furnish-png-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 255]))
            .save(dir.join("tile.png"))
            .unwrap();

        let loader = FsAssetLoader::new(&dir);
        let image = block_on(loader.load_texture("tile.png")).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(&image.rgba[..4], &[9, 8, 7, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_obj_model_loads_from_disk() {
        let dir = std::env::temp_dir().join(format!("furnish-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("tri.obj"),
            "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let loader = FsAssetLoader::new(&dir);
        let model = block_on(loader.load_model("tri.obj")).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.root.children[0].meshes[0].mesh.triangle_count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = std::env::temp_dir().join(format!("furnish-fbx-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("chair.fbx"), b"binary").unwrap();

        let loader = FsAssetLoader::new(&dir);
        let result = block_on(loader.load_model("chair.fbx"));
        assert!(matches!(result, Err(AssetError::Unsupported(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
