//! Per-draw uniform assembly.
//!
//! For one (program, mesh, transform, lights) tuple this computes the
//! projection-view-model matrix, and for lit variants the normal matrix and
//! camera position, then hands the complete uniform set of the selected
//! variant to the program before issuing the draw.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::lights::LightSet;
use crate::shader::{
    light_uniform, LightField, MeshHandle, ShaderProgram, ShaderVariant, TextureHandle,
    UniformValue, AMBIENT_COLOUR, CAMERA_POSITION, DIFFUSE_SLOT, LIGHT_COUNT, MODEL_MATRIX,
    NORMAL_MATRIX, NORMAL_SLOT, PROJECTION_VIEW_MODEL, REFLECTION_COEFFICIENT, ROUGHNESS,
    SPECULAR_POWER,
};

/// Render target dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Surface parameters of one drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub specular_power: f32,
    pub roughness: f32,
    /// Reflectance at normal incidence (Fresnel F0).
    pub reflection_coefficient: f32,
    pub diffuse: TextureHandle,
    pub normal: TextureHandle,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            specular_power: 32.0,
            roughness: 0.35,
            reflection_coefficient: 0.04,
            diffuse: TextureHandle::default(),
            normal: TextureHandle::default(),
        }
    }
}

impl Material {
    pub fn texture_for_slot(&self, slot: u32) -> TextureHandle {
        match slot {
            NORMAL_SLOT => self.normal,
            _ => self.diffuse,
        }
    }
}

/// Everything needed to draw one mesh with one shader variant.
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest<'a> {
    pub variant: ShaderVariant,
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub camera: &'a Camera,
    pub viewport: Viewport,
    pub lights: &'a LightSet,
    pub material: &'a Material,
}

pub fn projection_view_model(projection: Mat4, view: Mat4, model: Mat4) -> Mat4 {
    projection * view * model
}

/// Transpose of the inverse of the model's upper-left 3x3 block.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    debug_assert!(
        Mat3::from_mat4(model).determinant() != 0.0,
        "model matrix must be invertible"
    );
    Mat3::from_mat4(model).inverse().transpose()
}

/// World-space eye position recovered from a view matrix.
pub fn camera_world_position(view: Mat4) -> Vec3 {
    view.inverse().col(3).truncate()
}

/// Binds `program`, supplies every uniform its variant declares and draws.
pub fn assemble_and_draw<P>(program: &mut P, request: &DrawRequest<'_>)
where
    P: ShaderProgram + ?Sized,
{
    let variant = request.variant;
    debug_assert_eq!(
        program.variant(),
        variant,
        "program does not implement the requested variant"
    );

    let projection = request.camera.projection_matrix(
        request.viewport.width as f32,
        request.viewport.height as f32,
    );
    let view = request.camera.view_matrix();

    program.bind();
    program.set_uniform(
        PROJECTION_VIEW_MODEL,
        UniformValue::Mat4(projection_view_model(projection, view, request.model)),
    );

    if variant.is_lit() {
        supply_lighting(program, request, view);
    }

    if variant == ShaderVariant::PhysicallyBased {
        program.set_uniform(ROUGHNESS, UniformValue::Float(request.material.roughness));
        program.set_uniform(
            REFLECTION_COEFFICIENT,
            UniformValue::Float(request.material.reflection_coefficient),
        );
    }

    for &(name, slot) in variant.texture_slots() {
        program.set_uniform(name, UniformValue::Sampler(slot));
        program.bind_texture(slot, request.material.texture_for_slot(slot));
    }

    program.draw_mesh(request.mesh);
}

fn supply_lighting<P>(program: &mut P, request: &DrawRequest<'_>, view: Mat4)
where
    P: ShaderProgram + ?Sized,
{
    let lights = request.lights;
    program.set_uniform(MODEL_MATRIX, UniformValue::Mat4(request.model));
    program.set_uniform(NORMAL_MATRIX, UniformValue::Mat3(normal_matrix(request.model)));
    program.set_uniform(CAMERA_POSITION, UniformValue::Vec3(camera_world_position(view)));
    program.set_uniform(
        SPECULAR_POWER,
        UniformValue::Float(request.material.specular_power),
    );
    program.set_uniform(AMBIENT_COLOUR, UniformValue::Vec3(lights.ambient));
    program.set_uniform(LIGHT_COUNT, UniformValue::Int(lights.len() as i32));

    // Inactive slots are zeroed lights, so every slot is always written.
    for (index, light) in lights.slots().iter().enumerate() {
        program.set_uniform(
            &light_uniform(index, LightField::Position),
            UniformValue::Vec3(light.vector),
        );
        program.set_uniform(
            &light_uniform(index, LightField::Type),
            UniformValue::Int(light.kind.shader_tag()),
        );
        program.set_uniform(
            &light_uniform(index, LightField::Colour),
            UniformValue::Vec3(light.colour),
        );
        program.set_uniform(
            &light_uniform(index, LightField::Intensity),
            UniformValue::Float(light.intensity),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::Quat;

    use super::*;
    use crate::lights::{Light, MAX_LIGHTS};
    use crate::shader::{RecordingProgram, DIFFUSE_TEXTURE, NORMAL_TEXTURE};

    struct Fixture {
        camera: Camera,
        lights: LightSet,
        material: Material,
    }

    impl Fixture {
        fn new() -> Self {
            let mut lights = LightSet::new(Vec3::splat(0.25));
            lights
                .push(Light::directional(Vec3::NEG_Y, Vec3::new(1.0, 1.0, 0.0), 1.0))
                .unwrap();
            lights
                .push(Light::point(Vec3::new(2.0, 3.0, 0.0), Vec3::ONE, 4.0))
                .unwrap();
            Self {
                camera: Camera::new(),
                lights,
                material: Material {
                    diffuse: TextureHandle(7),
                    normal: TextureHandle(8),
                    ..Material::default()
                },
            }
        }

        fn request(&self, variant: ShaderVariant, model: Mat4) -> DrawRequest<'_> {
            DrawRequest {
                variant,
                mesh: MeshHandle(1),
                model,
                camera: &self.camera,
                viewport: Viewport::new(1280, 720),
                lights: &self.lights,
                material: &self.material,
            }
        }

        fn draw(&self, variant: ShaderVariant, model: Mat4) -> RecordingProgram {
            let mut program = RecordingProgram::new(variant);
            assemble_and_draw(&mut program, &self.request(variant, model));
            program
        }
    }

    #[test]
    fn every_variant_receives_exactly_its_declared_uniforms() {
        let fixture = Fixture::new();
        for variant in ShaderVariant::ALL {
            let program = fixture.draw(variant, Mat4::IDENTITY);
            let draw = program.last_draw().unwrap();
            assert_eq!(draw.mesh, Some(MeshHandle(1)));
            assert!(draw.missing_uniforms(variant).is_empty(), "{variant}");

            let declared: BTreeSet<_> = variant.uniforms().into_iter().map(|(n, _)| n).collect();
            let supplied: BTreeSet<_> = draw.uniforms.iter().map(|(n, _)| n.clone()).collect();
            assert_eq!(declared, supplied, "{variant}");

            for (name, ty) in variant.uniforms() {
                assert_eq!(draw.uniform(&name).unwrap().uniform_type(), ty, "{name}");
            }
        }
    }

    #[test]
    fn pvm_is_projection_times_view_times_model() {
        let fixture = Fixture::new();
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.5),
            Quat::from_rotation_y(0.3),
            Vec3::new(1.0, 0.0, -2.0),
        );
        let program = fixture.draw(ShaderVariant::Unlit, model);
        let expected = fixture.camera.projection_matrix(1280.0, 720.0)
            * fixture.camera.view_matrix()
            * model;
        match program.last_draw().unwrap().uniform(PROJECTION_VIEW_MODEL) {
            Some(UniformValue::Mat4(pvm)) => assert!(pvm.abs_diff_eq(expected, 1e-5)),
            other => panic!("unexpected pvm {other:?}"),
        }
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_scaled_rotation() {
        let k = 2.5;
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.4, -1.1, 0.25);
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(k),
            rotation,
            Vec3::new(3.0, -1.0, 8.0),
        );
        let expected = Mat3::from_quat(rotation) * (1.0 / k);
        assert!(normal_matrix(model).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn normal_matrix_corrects_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        // A surface sloping in XY keeps its normal perpendicular after scaling.
        let tangent = Vec3::new(1.0, 1.0, 0.0);
        let normal = Vec3::new(-1.0, 1.0, 0.0);
        let scaled_tangent = model.transform_vector3(tangent);
        let scaled_normal = normal_matrix(model) * normal;
        assert!(scaled_tangent.dot(scaled_normal).abs() < 1e-5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "model matrix must be invertible")]
    fn normal_matrix_rejects_flattened_model() {
        normal_matrix(Mat4::from_scale(Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn lit_variants_receive_eye_position_and_normal_matrix() {
        let fixture = Fixture::new();
        let model = Mat4::from_scale(Vec3::splat(0.5));
        let program = fixture.draw(ShaderVariant::Phong, model);
        let draw = program.last_draw().unwrap();
        match draw.uniform(CAMERA_POSITION) {
            Some(UniformValue::Vec3(eye)) => {
                assert!(eye.abs_diff_eq(fixture.camera.position, 1e-4))
            }
            other => panic!("unexpected camera position {other:?}"),
        }
        assert_eq!(
            draw.uniform(NORMAL_MATRIX),
            Some(UniformValue::Mat3(normal_matrix(model)))
        );
        assert_eq!(draw.uniform(MODEL_MATRIX), Some(UniformValue::Mat4(model)));
    }

    #[test]
    fn light_slots_are_filled_and_padded() {
        let fixture = Fixture::new();
        let program = fixture.draw(ShaderVariant::PhysicallyBased, Mat4::IDENTITY);
        let draw = program.last_draw().unwrap();
        assert_eq!(draw.uniform(LIGHT_COUNT), Some(UniformValue::Int(2)));
        assert_eq!(
            draw.uniform(&light_uniform(1, LightField::Type)),
            Some(UniformValue::Int(1))
        );
        assert_eq!(
            draw.uniform(&light_uniform(1, LightField::Intensity)),
            Some(UniformValue::Float(4.0))
        );
        for index in 2..MAX_LIGHTS {
            assert_eq!(
                draw.uniform(&light_uniform(index, LightField::Intensity)),
                Some(UniformValue::Float(0.0))
            );
        }
        assert_eq!(draw.uniform(ROUGHNESS), Some(UniformValue::Float(0.35)));
        assert_eq!(
            draw.uniform(REFLECTION_COEFFICIENT),
            Some(UniformValue::Float(0.04))
        );
    }

    #[test]
    fn texture_slots_bind_material_textures() {
        let fixture = Fixture::new();
        let textured = fixture.draw(ShaderVariant::Textured, Mat4::IDENTITY);
        let draw = textured.last_draw().unwrap();
        assert_eq!(draw.uniform(DIFFUSE_TEXTURE), Some(UniformValue::Sampler(DIFFUSE_SLOT)));
        assert_eq!(draw.textures, vec![(DIFFUSE_SLOT, TextureHandle(7))]);

        let mapped = fixture.draw(ShaderVariant::NormalMapped, Mat4::IDENTITY);
        let draw = mapped.last_draw().unwrap();
        assert_eq!(draw.uniform(NORMAL_TEXTURE), Some(UniformValue::Sampler(NORMAL_SLOT)));
        assert_eq!(
            draw.textures,
            vec![(DIFFUSE_SLOT, TextureHandle(7)), (NORMAL_SLOT, TextureHandle(8))]
        );
    }

    #[test]
    fn program_is_bound_once_per_draw() {
        let fixture = Fixture::new();
        let mut program = RecordingProgram::new(ShaderVariant::Textured);
        for _ in 0..3 {
            let request = fixture.request(ShaderVariant::Textured, Mat4::IDENTITY);
            assemble_and_draw(&mut program, &request);
        }
        assert_eq!(program.binds, 3);
        assert_eq!(program.draws.len(), 3);
    }

    #[test]
    fn camera_position_round_trips_through_view() {
        let mut camera = Camera::new();
        camera.theta = 123.0;
        camera.phi = 15.0;
        camera.position = Vec3::new(4.0, -2.0, 9.0);
        let eye = camera_world_position(camera.view_matrix());
        assert!(eye.abs_diff_eq(camera.position, 1e-4));
    }
}
