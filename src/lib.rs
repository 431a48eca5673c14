//! Fly-camera rendering demo that draws one scene with five interchangeable
//! shading techniques: unlit, textured, Phong, normal-mapped and
//! physically-based.
//!
//! Everything above the GPU (camera, lights, uniform assembly, scene and
//! mesh loading) is plain data and runs headless against
//! [`RecordingBackend`]. The wgpu backend lives in [`render`].

pub mod app;
pub mod assembler;
pub mod backend;
pub mod camera;
pub mod input;
pub mod lights;
pub mod mesh;
pub mod obj;
pub mod render;
pub mod scene;
pub mod selection;
pub mod shader;
pub mod texture;

pub use app::{Gallery, SceneEntry};
pub use assembler::{assemble_and_draw, DrawRequest, Material, Viewport};
pub use backend::{RecordingBackend, RenderBackend};
pub use camera::{Camera, MoveStep};
pub use input::{InputState, KeyCode, MouseButton, NamedKey};
pub use lights::{Light, LightKind, LightSet};
pub use mesh::{MeshData, Vertex};
pub use obj::{load_obj, load_obj_from_str};
pub use render::Renderer;
pub use scene::{Scene, SceneObject};
pub use selection::RenderSelection;
pub use shader::{ShaderProgram, ShaderVariant, UniformValue};
pub use texture::TextureData;
