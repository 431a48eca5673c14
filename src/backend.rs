use crate::mesh::MeshData;
use crate::shader::{MeshHandle, RecordingProgram, ShaderProgram, ShaderVariant, TextureHandle};
use crate::texture::TextureData;

/// Owner of GPU resources and of one compiled program per shader variant.
pub trait RenderBackend {
    type Program: ShaderProgram;

    fn program_mut(&mut self, variant: ShaderVariant) -> &mut Self::Program;
    fn upload_mesh(&mut self, mesh: &MeshData, label: &str) -> MeshHandle;
    fn upload_texture(&mut self, texture: &TextureData, label: &str) -> TextureHandle;
}

/// Backend that keeps everything on the CPU and records every draw.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    programs: Vec<RecordingProgram>,
    pub meshes: Vec<(String, usize)>,
    pub textures: Vec<(String, u32, u32)>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            programs: ShaderVariant::ALL
                .iter()
                .map(|&variant| RecordingProgram::new(variant))
                .collect(),
            meshes: Vec::new(),
            textures: Vec::new(),
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(&self, variant: ShaderVariant) -> &RecordingProgram {
        &self.programs[variant_index(variant)]
    }
}

impl RenderBackend for RecordingBackend {
    type Program = RecordingProgram;

    fn program_mut(&mut self, variant: ShaderVariant) -> &mut RecordingProgram {
        &mut self.programs[variant_index(variant)]
    }

    fn upload_mesh(&mut self, mesh: &MeshData, label: &str) -> MeshHandle {
        self.meshes.push((label.to_string(), mesh.triangle_count()));
        MeshHandle(self.meshes.len() - 1)
    }

    fn upload_texture(&mut self, texture: &TextureData, label: &str) -> TextureHandle {
        self.textures
            .push((label.to_string(), texture.width, texture.height));
        TextureHandle(self.textures.len() - 1)
    }
}

/// Position of `variant` in [`ShaderVariant::ALL`].
pub fn variant_index(variant: ShaderVariant) -> usize {
    ShaderVariant::ALL
        .iter()
        .position(|&candidate| candidate == variant)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_match_their_variant() {
        let mut backend = RecordingBackend::new();
        for variant in ShaderVariant::ALL {
            assert_eq!(backend.program_mut(variant).variant(), variant);
        }
    }

    #[test]
    fn uploads_issue_sequential_handles() {
        let mut backend = RecordingBackend::new();
        let quad = MeshData::quad();
        assert_eq!(backend.upload_mesh(&quad, "a"), MeshHandle(0));
        assert_eq!(backend.upload_mesh(&quad, "b"), MeshHandle(1));
        let texture = TextureData::checker(4, 2);
        assert_eq!(backend.upload_texture(&texture, "grid"), TextureHandle(0));
        assert_eq!(backend.meshes[1], ("b".to_string(), 2));
    }
}
