use std::fmt;
use std::str::FromStr;

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lights::MAX_LIGHTS;

pub const PROJECTION_VIEW_MODEL: &str = "ProjectionViewModel";
pub const MODEL_MATRIX: &str = "ModelMatrix";
pub const NORMAL_MATRIX: &str = "NormalMatrix";
pub const CAMERA_POSITION: &str = "CameraPosition";
pub const AMBIENT_COLOUR: &str = "AmbientColour";
pub const LIGHT_COUNT: &str = "LightCount";
pub const SPECULAR_POWER: &str = "SpecularPower";
pub const ROUGHNESS: &str = "Roughness";
pub const REFLECTION_COEFFICIENT: &str = "ReflectionCoefficient";
pub const DIFFUSE_TEXTURE: &str = "diffuseTexture";
pub const NORMAL_TEXTURE: &str = "normalTexture";

pub const DIFFUSE_SLOT: u32 = 0;
pub const NORMAL_SLOT: u32 = 1;

/// Field of the `Lights[index]` struct array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightField {
    Position,
    Type,
    Colour,
    Intensity,
}

impl LightField {
    pub const ALL: [LightField; 4] = [Self::Position, Self::Type, Self::Colour, Self::Intensity];

    fn as_str(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Type => "Type",
            Self::Colour => "Colour",
            Self::Intensity => "Intensity",
        }
    }

    pub fn uniform_type(self) -> UniformType {
        match self {
            Self::Position | Self::Colour => UniformType::Vec3,
            Self::Type => UniformType::Int,
            Self::Intensity => UniformType::Float,
        }
    }
}

/// Uniform name of one field of one light slot, e.g. `Lights[2].Colour`.
pub fn light_uniform(index: usize, field: LightField) -> String {
    format!("Lights[{index}].{}", field.as_str())
}

/// Rendering technique selectable at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderVariant {
    Unlit,
    Textured,
    #[default]
    Phong,
    NormalMapped,
    PhysicallyBased,
}

impl ShaderVariant {
    pub const ALL: [ShaderVariant; 5] = [
        Self::Unlit,
        Self::Textured,
        Self::Phong,
        Self::NormalMapped,
        Self::PhysicallyBased,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Unlit => "unlit",
            Self::Textured => "textured",
            Self::Phong => "phong",
            Self::NormalMapped => "normal-mapped",
            Self::PhysicallyBased => "pbr",
        }
    }

    /// Whether the variant consumes normals, lights and the camera position.
    pub fn is_lit(self) -> bool {
        matches!(
            self,
            Self::Phong | Self::NormalMapped | Self::PhysicallyBased
        )
    }

    /// Texture slots the variant samples, paired with their uniform names.
    pub fn texture_slots(self) -> &'static [(&'static str, u32)] {
        match self {
            Self::Textured => &[(DIFFUSE_TEXTURE, DIFFUSE_SLOT)],
            Self::NormalMapped => &[
                (DIFFUSE_TEXTURE, DIFFUSE_SLOT),
                (NORMAL_TEXTURE, NORMAL_SLOT),
            ],
            _ => &[],
        }
    }

    /// Every uniform the variant declares, in uniform-block order.
    ///
    /// Texture slot uniforms come last; GPU backends bind them as textures
    /// rather than buffer fields.
    pub fn uniforms(self) -> Vec<(String, UniformType)> {
        let mut fields = vec![(PROJECTION_VIEW_MODEL.to_string(), UniformType::Mat4)];
        if self.is_lit() {
            fields.push((MODEL_MATRIX.to_string(), UniformType::Mat4));
            fields.push((NORMAL_MATRIX.to_string(), UniformType::Mat3));
            fields.push((CAMERA_POSITION.to_string(), UniformType::Vec3));
            fields.push((SPECULAR_POWER.to_string(), UniformType::Float));
            fields.push((AMBIENT_COLOUR.to_string(), UniformType::Vec3));
            fields.push((LIGHT_COUNT.to_string(), UniformType::Int));
            for index in 0..MAX_LIGHTS {
                for field in LightField::ALL {
                    fields.push((light_uniform(index, field), field.uniform_type()));
                }
            }
        }
        if self == Self::PhysicallyBased {
            fields.push((ROUGHNESS.to_string(), UniformType::Float));
            fields.push((REFLECTION_COEFFICIENT.to_string(), UniformType::Float));
        }
        for (name, _) in self.texture_slots() {
            fields.push((name.to_string(), UniformType::Sampler));
        }
        fields
    }

    /// File stem of the WGSL source implementing the variant.
    pub fn source_name(self) -> &'static str {
        match self {
            Self::Unlit => "simple",
            Self::Textured => "textured",
            Self::Phong => "phong",
            Self::NormalMapped => "normal_map",
            Self::PhysicallyBased => "pbr",
        }
    }
}

impl fmt::Display for ShaderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderVariant {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let variant = match s.to_ascii_lowercase().as_str() {
            "unlit" | "simple" => Self::Unlit,
            "textured" => Self::Textured,
            "phong" => Self::Phong,
            "normal-mapped" | "normal_map" | "normalmap" => Self::NormalMapped,
            "pbr" | "physically-based" => Self::PhysicallyBased,
            _ => return Err(ShaderError::UnknownVariant(s.to_string())),
        };
        Ok(variant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Int,
    Float,
    Vec3,
    Mat3,
    Mat4,
    /// Texture slot index.
    Sampler,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat3(Mat3),
    Mat4(Mat4),
    Sampler(u32),
}

impl UniformValue {
    pub fn uniform_type(&self) -> UniformType {
        match self {
            Self::Int(_) => UniformType::Int,
            Self::Float(_) => UniformType::Float,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
            Self::Sampler(_) => UniformType::Sampler,
        }
    }
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.3}"),
            Self::Vec3(v) => write!(f, "({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
            Self::Mat3(m) => write!(f, "mat3{:.3?}", m.to_cols_array()),
            Self::Mat4(m) => write!(f, "mat4{:.3?}", m.to_cols_array()),
            Self::Sampler(slot) => write!(f, "slot {slot}"),
        }
    }
}

/// Opaque mesh identifier issued by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub usize);

/// Opaque texture identifier issued by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(pub usize);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShaderError {
    #[error("unknown shader variant `{0}`")]
    UnknownVariant(String),
    #[error("failed to link {variant} shader: {message}")]
    Link {
        variant: ShaderVariant,
        message: String,
    },
}

/// A compiled shader program, as seen by the parameter assembler.
///
/// Uniforms are set by name after `bind`; `draw_mesh` issues a draw with the
/// values set so far.
pub trait ShaderProgram {
    fn variant(&self) -> ShaderVariant;
    fn bind(&mut self);
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    fn bind_texture(&mut self, slot: u32, texture: TextureHandle);
    fn draw_mesh(&mut self, mesh: MeshHandle);
}

/// Uniforms and textures supplied for one draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordedDraw {
    pub mesh: Option<MeshHandle>,
    pub uniforms: Vec<(String, UniformValue)>,
    pub textures: Vec<(u32, TextureHandle)>,
}

impl RecordedDraw {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    /// Names the variant declares but that were never supplied.
    pub fn missing_uniforms(&self, variant: ShaderVariant) -> Vec<String> {
        variant
            .uniforms()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| self.uniform(name).is_none())
            .collect()
    }
}

/// CPU-side program that records what it is given. Used by the summary mode
/// and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgram {
    variant: ShaderVariant,
    current: RecordedDraw,
    pub draws: Vec<RecordedDraw>,
    pub binds: usize,
}

impl RecordingProgram {
    pub fn new(variant: ShaderVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn last_draw(&self) -> Option<&RecordedDraw> {
        self.draws.last()
    }
}

impl ShaderProgram for RecordingProgram {
    fn variant(&self) -> ShaderVariant {
        self.variant
    }

    fn bind(&mut self) {
        self.binds += 1;
        self.current = RecordedDraw::default();
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.current.uniforms.push((name.to_string(), value));
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) {
        self.current.textures.push((slot, texture));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        let mut draw = self.current.clone();
        draw.mesh = Some(mesh);
        self.draws.push(draw);
    }
}
