use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use log::{debug, error, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::backend::{variant_index, RenderBackend};
use crate::mesh::{MeshData, Vertex};
use crate::render::layout::UniformLayout;
use crate::shader::{
    MeshHandle, ShaderError, ShaderProgram, ShaderVariant, TextureHandle, UniformValue,
    PROJECTION_VIEW_MODEL,
};
use crate::texture::TextureData;

const VERTEX_INPUT: &str = include_str!("shaders/vertex.wgsl");
const LIGHTING: &str = include_str!("shaders/lighting.wgsl");

/// Maps OpenGL clip depth (-w..w) onto the wgpu range (0..w).
#[rustfmt::skip]
const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

fn to_wgpu_clip(projection_view_model: Mat4) -> Mat4 {
    OPENGL_TO_WGPU * projection_view_model
}

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

/// Full WGSL source of `variant`, with the shared vertex input and lighting
/// helpers prepended.
pub fn shader_source(variant: ShaderVariant) -> String {
    let body = match variant {
        ShaderVariant::Unlit => include_str!("shaders/simple.wgsl"),
        ShaderVariant::Textured => include_str!("shaders/textured.wgsl"),
        ShaderVariant::Phong => include_str!("shaders/phong.wgsl"),
        ShaderVariant::NormalMapped => include_str!("shaders/normal_map.wgsl"),
        ShaderVariant::PhysicallyBased => include_str!("shaders/pbr.wgsl"),
    };
    let mut source = String::from(VERTEX_INPUT);
    if variant.is_lit() {
        source.push_str(LIGHTING);
    }
    source.push_str(body);
    source
}

/// Bind group bindings of the `index`-th texture a variant samples: the
/// texture view followed by its sampler. Binding 0 is the uniform block.
fn texture_bindings(index: usize) -> (u32, u32) {
    let texture = 1 + 2 * index as u32;
    (texture, texture + 1)
}

/// GPU renderer backed by wgpu. Programs queue draws through
/// [`ShaderProgram`]; [`Renderer::render`] submits them in a single pass.
pub struct Renderer {
    // The surface borrows the window natively, so it is dropped first.
    surface: wgpu::Surface,
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    sampler: wgpu::Sampler,
    programs: Vec<GpuProgram>,
    meshes: Vec<MeshBuffers>,
    textures: Vec<GpuTexture>,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window and links one
    /// program per shader variant. Variants that fail to link are logged
    /// and their draws are skipped.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        // SAFETY: the window is kept alive by `self.window` for as long as the
        // surface exists, and the surface field is dropped first.
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gallery-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gallery-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut programs = Vec::with_capacity(ShaderVariant::ALL.len());
        for variant in ShaderVariant::ALL {
            let mut program = GpuProgram::new(&device, variant);
            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let pipeline = program.create_pipeline(&device, surface_format);
            match device.pop_error_scope().await {
                None => program.pipeline = Some(pipeline),
                Some(err) => {
                    let err = ShaderError::Link {
                        variant,
                        message: err.to_string(),
                    };
                    error!("{err}");
                }
            }
            programs.push(program);
        }

        Ok(Self {
            surface,
            window,
            device,
            queue,
            config,
            size,
            depth,
            sampler,
            programs,
            meshes: Vec::new(),
            textures: Vec::new(),
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Submits every draw queued since the last frame.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let queued: Vec<(usize, QueuedDraw)> = self
            .programs
            .iter_mut()
            .enumerate()
            .flat_map(|(index, program)| {
                std::mem::take(&mut program.queued)
                    .into_iter()
                    .map(move |draw| (index, draw))
            })
            .collect();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gallery-encoder"),
            });

        let mut draw_list = Vec::with_capacity(queued.len());
        for (program_index, draw) in &queued {
            let program = &self.programs[*program_index];
            if program.pipeline.is_none() {
                continue;
            }
            let Some(mesh) = self.meshes.get(draw.mesh.0) else {
                warn!("skipping draw of unknown mesh {}", draw.mesh.0);
                continue;
            };
            match self.create_bind_group(program, draw) {
                Some(bind_group) => draw_list.push((*program_index, mesh, bind_group)),
                None => warn!("skipping {} draw without bound textures", program.variant),
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        for (program_index, mesh, bind_group) in &draw_list {
            let Some(pipeline) = self.programs[*program_index].pipeline.as_ref() else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn create_bind_group(
        &self,
        program: &GpuProgram,
        draw: &QueuedDraw,
    ) -> Option<wgpu::BindGroup> {
        let uniform = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("draw-uniform"),
                contents: &draw.uniforms,
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let mut views = Vec::with_capacity(draw.textures.len());
        for handle in &draw.textures {
            views.push(&self.textures.get(handle.as_ref()?.0)?.view);
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform.as_entire_binding(),
        }];
        for (index, view) in views.into_iter().enumerate() {
            let (texture_binding, sampler_binding) = texture_bindings(index);
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }

        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-bind-group"),
            layout: &program.bind_layout,
            entries: &entries,
        }))
    }
}

impl RenderBackend for Renderer {
    type Program = GpuProgram;

    fn program_mut(&mut self, variant: ShaderVariant) -> &mut GpuProgram {
        &mut self.programs[variant_index(variant)]
    }

    fn upload_mesh(&mut self, mesh: &MeshData, label: &str) -> MeshHandle {
        self.meshes
            .push(MeshBuffers::from_mesh(&self.device, mesh, label));
        MeshHandle(self.meshes.len() - 1)
    }

    fn upload_texture(&mut self, texture: &TextureData, label: &str) -> TextureHandle {
        self.textures
            .push(GpuTexture::upload(&self.device, &self.queue, texture, label));
        TextureHandle(self.textures.len() - 1)
    }
}

/// Uniform bytes and texture bindings captured by one `draw_mesh` call.
struct QueuedDraw {
    mesh: MeshHandle,
    uniforms: Vec<u8>,
    /// Texture per sampled slot, in the variant's texture slot order.
    textures: Vec<Option<TextureHandle>>,
}

/// One linked shader variant. Uniform writes go into a staging block laid
/// out like the WGSL struct and are copied into the draw queue on
/// `draw_mesh`.
pub struct GpuProgram {
    variant: ShaderVariant,
    layout: UniformLayout,
    staging: Vec<u8>,
    written: HashSet<String>,
    /// Texture unit selected by each sampler uniform, in slot order.
    sampler_units: Vec<Option<u32>>,
    /// Texture bound to each unit since the last `bind`.
    units: Vec<(u32, TextureHandle)>,
    bind_layout: wgpu::BindGroupLayout,
    pipeline: Option<wgpu::RenderPipeline>,
    queued: Vec<QueuedDraw>,
}

impl GpuProgram {
    fn new(device: &wgpu::Device, variant: ShaderVariant) -> Self {
        let layout = UniformLayout::for_variant(variant);
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{variant}-bind-layout")),
            entries: &bind_layout_entries(variant, &layout),
        });
        Self {
            variant,
            staging: vec![0; layout.size()],
            layout,
            written: HashSet::new(),
            sampler_units: vec![None; variant.texture_slots().len()],
            units: Vec::new(),
            bind_layout,
            pipeline: None,
            queued: Vec::new(),
        }
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let variant = self.variant;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(variant.source_name()),
            source: wgpu::ShaderSource::Wgsl(shader_source(variant).into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{variant}-pipeline-layout")),
            bind_group_layouts: &[&self.bind_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{variant}-pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                        3 => Float32x4
                    ],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        })
    }

    fn texture_for(&self, slot_index: usize) -> Option<TextureHandle> {
        let unit = self.sampler_units.get(slot_index).copied().flatten()?;
        self.units
            .iter()
            .rev()
            .find(|(bound, _)| *bound == unit)
            .map(|(_, texture)| *texture)
    }
}

impl ShaderProgram for GpuProgram {
    fn variant(&self) -> ShaderVariant {
        self.variant
    }

    fn bind(&mut self) {
        self.staging.fill(0);
        self.written.clear();
        self.sampler_units.fill(None);
        self.units.clear();
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if let UniformValue::Sampler(unit) = value {
            match self
                .variant
                .texture_slots()
                .iter()
                .position(|(slot_name, _)| *slot_name == name)
            {
                Some(index) => self.sampler_units[index] = Some(unit),
                None => debug!("{} has no sampler named {name}", self.variant),
            }
            return;
        }
        let value = match value {
            UniformValue::Mat4(m) if name == PROJECTION_VIEW_MODEL => {
                UniformValue::Mat4(to_wgpu_clip(m))
            }
            other => other,
        };
        if self.layout.write(&mut self.staging, name, &value) {
            self.written.insert(name.to_string());
        } else {
            debug!("{} ignores uniform {name} = {value}", self.variant);
        }
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) {
        self.units.push((slot, texture));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        let complete = self.layout.names().all(|name| self.written.contains(name));
        if !complete {
            warn!("{} draw issued before every uniform was set", self.variant);
        }
        debug_assert!(complete, "{} uniforms incomplete", self.variant);
        let textures = (0..self.sampler_units.len())
            .map(|index| self.texture_for(index))
            .collect();
        self.queued.push(QueuedDraw {
            mesh,
            uniforms: self.staging.clone(),
            textures,
        });
    }
}

fn bind_layout_entries(
    variant: ShaderVariant,
    layout: &UniformLayout,
) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(layout.size() as u64),
        },
        count: None,
    }];
    for index in 0..variant.texture_slots().len() {
        let (texture_binding, sampler_binding) = texture_bindings(index);
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: texture_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: sampler_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    entries
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let format = if data.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::camera::{Camera, FAR_PLANE, NEAR_PLANE};

    fn clip_depth(view_depth: f32) -> f32 {
        let projection = Camera::new().projection_matrix(1280.0, 720.0);
        let clip = to_wgpu_clip(projection) * Vec4::new(0.0, 0.0, -view_depth, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn points_past_the_near_plane_stay_in_wgpu_depth_range() {
        assert!(clip_depth(0.15) >= 0.0);
        assert!(clip_depth(0.15) <= 1.0);
        assert!(clip_depth(500.0) <= 1.0);
    }

    #[test]
    fn near_and_far_planes_map_to_zero_and_one() {
        assert!(clip_depth(NEAR_PLANE).abs() < 1e-4);
        assert!((clip_depth(FAR_PLANE) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn depth_remap_leaves_x_and_y_untouched() {
        let projection = Camera::new().projection_matrix(1280.0, 720.0);
        let point = Vec4::new(0.3, -0.2, -5.0, 1.0);
        let gl = projection * point;
        let gpu = to_wgpu_clip(projection) * point;
        assert_eq!((gl.x, gl.y, gl.w), (gpu.x, gpu.y, gpu.w));
    }

    #[test]
    fn every_source_has_both_entry_points() {
        for variant in ShaderVariant::ALL {
            let source = shader_source(variant);
            assert!(source.contains("fn vs_main"), "{variant}");
            assert!(source.contains("fn fs_main"), "{variant}");
            assert!(source.contains("struct VertexInput"), "{variant}");
        }
    }

    #[test]
    fn only_lit_sources_pull_in_lighting() {
        for variant in ShaderVariant::ALL {
            let source = shader_source(variant);
            assert_eq!(source.contains("struct Light {"), variant.is_lit(), "{variant}");
        }
    }

    #[test]
    fn sources_declare_one_binding_per_texture_and_sampler() {
        for variant in ShaderVariant::ALL {
            let source = shader_source(variant);
            let bindings = source.matches("@binding(").count();
            assert_eq!(bindings, 1 + 2 * variant.texture_slots().len(), "{variant}");
        }
    }

    #[test]
    fn texture_bindings_follow_the_uniform_block() {
        assert_eq!(texture_bindings(0), (1, 2));
        assert_eq!(texture_bindings(1), (3, 4));
    }

    #[test]
    fn pbr_source_reads_roughness_after_the_lights() {
        let source = shader_source(ShaderVariant::PhysicallyBased);
        let lights = source.find("lights: array<Light, 4>").unwrap();
        let roughness = source.find("roughness: f32").unwrap();
        assert!(lights < roughness);
    }
}
