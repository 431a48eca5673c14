use std::path::Path;

use anyhow::{Context, Result};
use glam::Mat4;
use log::{debug, info};

use crate::assembler::{assemble_and_draw, DrawRequest, Material, Viewport};
use crate::backend::RenderBackend;
use crate::camera::Camera;
use crate::input::{InputState, KeyCode};
use crate::lights::{Light, LightKind, LightSet};
use crate::mesh::MeshData;
use crate::obj::load_obj;
use crate::scene::{Scene, SceneObject};
use crate::selection::{RenderSelection, SelectionChange};
use crate::shader::{MeshHandle, TextureHandle};
use crate::texture::TextureData;

/// Drawable resolved against a backend.
#[derive(Debug, Clone)]
pub struct SceneEntry {
    pub name: String,
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub material: Material,
}

/// Frame-to-frame state of the demo, independent of the window system.
#[derive(Debug, Clone)]
pub struct Gallery {
    pub camera: Camera,
    pub lights: LightSet,
    pub selection: RenderSelection,
    pub entries: Vec<SceneEntry>,
    /// Spins the first directional light around the Z axis.
    pub animate_light: bool,
    elapsed_total: f32,
}

impl Gallery {
    pub fn new(camera: Camera, lights: LightSet, entries: Vec<SceneEntry>) -> Self {
        Self {
            camera,
            lights,
            selection: RenderSelection::default(),
            entries,
            animate_light: true,
            elapsed_total: 0.0,
        }
    }

    /// Uploads every drawable of `scene` to `backend`.
    ///
    /// Relative mesh and texture paths resolve against `asset_root`. Any asset
    /// that fails to load aborts the whole load.
    pub fn load<B: RenderBackend>(
        scene: &Scene,
        asset_root: &Path,
        backend: &mut B,
        camera: Camera,
    ) -> Result<Self> {
        let default_diffuse = backend.upload_texture(&TextureData::checker(256, 8), "checker");
        let default_normal = backend.upload_texture(&TextureData::flat_normal(), "flat-normal");

        let mut entries = Vec::new();
        for object in scene.drawables() {
            let mesh = load_mesh_data(object, asset_root)?;
            info!(
                "loaded {} ({} triangles)",
                object.name,
                mesh.triangle_count()
            );
            let mesh = backend.upload_mesh(&mesh, &object.name);
            let diffuse = load_texture(backend, asset_root, object.texture.as_deref(), true)?
                .unwrap_or(default_diffuse);
            let normal = load_texture(backend, asset_root, object.normal_map.as_deref(), false)?
                .unwrap_or(default_normal);
            entries.push(SceneEntry {
                name: object.name.clone(),
                mesh,
                model: object.model_matrix(),
                material: Material {
                    specular_power: object.specular_power,
                    roughness: object.roughness,
                    reflection_coefficient: object.reflection,
                    diffuse,
                    normal,
                },
            });
        }

        Ok(Self::new(camera, scene.lights.clone(), entries))
    }

    /// Advances one frame: camera motion, then light animation.
    pub fn update(&mut self, input: &InputState, elapsed: f32) {
        self.camera.update(input, elapsed);
        self.elapsed_total += elapsed;
        if self.animate_light {
            let time = self.elapsed_total;
            if let Some(index) = self
                .lights
                .active()
                .iter()
                .position(|light| light.kind == LightKind::Directional)
            {
                self.lights.light_mut(index).vector = Light::orbit_direction(time);
            }
        }
    }

    /// Applies a freshly pressed key to the selection.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<SelectionChange> {
        let change = self.selection.handle_key(key, self.entries.len())?;
        match change {
            SelectionChange::Variant => info!("shader: {}", self.selection.variant),
            SelectionChange::Object => match self.selection.object {
                Some(index) => info!("showing {}", self.entries[index].name),
                None => info!("showing all objects"),
            },
            SelectionChange::LightColour => {
                self.lights.set_colour(self.selection.light_colour());
                debug!("light colour {}", self.selection.light_colour);
            }
        }
        Some(change)
    }

    /// Issues one draw per visible entry with the selected variant.
    pub fn draw<B: RenderBackend>(&self, backend: &mut B, viewport: Viewport) -> usize {
        let variant = self.selection.variant;
        let program = backend.program_mut(variant);
        let mut draws = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if !self.selection.is_visible(index) {
                continue;
            }
            let request = DrawRequest {
                variant,
                mesh: entry.mesh,
                model: entry.model,
                camera: &self.camera,
                viewport,
                lights: &self.lights,
                material: &entry.material,
            };
            assemble_and_draw(program, &request);
            draws += 1;
        }
        draws
    }

    pub fn title(&self) -> String {
        let shown = match self.selection.object {
            Some(index) => self.entries[index].name.as_str(),
            None => "all objects",
        };
        format!("Shader Gallery - {} - {shown}", self.selection.variant)
    }
}

fn load_mesh_data(object: &SceneObject, asset_root: &Path) -> Result<MeshData> {
    match object.mesh.as_deref() {
        Some(path) => load_obj(&asset_root.join(path), object.flip_v)
            .with_context(|| format!("{} mesh error", object.name)),
        None => Ok(MeshData::quad()),
    }
}

fn load_texture<B: RenderBackend>(
    backend: &mut B,
    asset_root: &Path,
    path: Option<&str>,
    srgb: bool,
) -> Result<Option<TextureHandle>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let texture = TextureData::load(&asset_root.join(path), srgb)?;
    Ok(Some(backend.upload_texture(&texture, path)))
}
