pub mod layout;
pub mod native;

pub use layout::UniformLayout;
pub use native::{shader_source, GpuProgram, Renderer};
