use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of light slots every lit shader declares.
pub const MAX_LIGHTS: usize = 4;

/// Colours the user can cycle the scene lights through.
pub const LIGHT_COLOUR_PRESETS: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, 0.35, 0.2),
    Vec3::new(0.3, 0.5, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightKind {
    /// `vector` is the direction the light travels in.
    #[default]
    Directional,
    /// `vector` is the world-space position of the light.
    Point,
}

impl LightKind {
    /// Integer tag written to the shader's `Type` field.
    pub fn shader_tag(self) -> i32 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub vector: Vec3,
    pub colour: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn directional(direction: Vec3, colour: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            vector: direction.normalize_or_zero(),
            colour,
            intensity,
        }
    }

    pub fn point(position: Vec3, colour: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            vector: position,
            colour,
            intensity,
        }
    }

    /// Direction of a light circling the Z axis once every `π` seconds.
    pub fn orbit_direction(time: f32) -> Vec3 {
        Vec3::new((time * 2.0).cos(), (time * 2.0).sin(), 0.0).normalize()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LightError {
    #[error("light set already holds the maximum of {MAX_LIGHTS} lights")]
    Full,
}

/// Ambient colour plus a fixed-capacity array of lights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSet {
    pub ambient: Vec3,
    lights: [Light; MAX_LIGHTS],
    count: usize,
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new(Vec3::splat(0.25))
    }
}

impl LightSet {
    pub fn new(ambient: Vec3) -> Self {
        Self {
            ambient,
            lights: [Light::default(); MAX_LIGHTS],
            count: 0,
        }
    }

    /// Light set holding exactly one light.
    pub fn single(ambient: Vec3, light: Light) -> Self {
        let mut set = Self::new(ambient);
        set.lights[0] = light;
        set.count = 1;
        set
    }

    pub fn push(&mut self, light: Light) -> Result<(), LightError> {
        if self.count == MAX_LIGHTS {
            return Err(LightError::Full);
        }
        self.lights[self.count] = light;
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Active lights, in insertion order.
    pub fn active(&self) -> &[Light] {
        &self.lights[..self.count]
    }

    /// Every slot, with unused ones zeroed.
    pub fn slots(&self) -> &[Light; MAX_LIGHTS] {
        &self.lights
    }

    pub fn light(&self, index: usize) -> &Light {
        debug_assert!(index < self.count, "light index {index} out of range");
        &self.lights[index]
    }

    pub fn light_mut(&mut self, index: usize) -> &mut Light {
        debug_assert!(index < self.count, "light index {index} out of range");
        &mut self.lights[index]
    }

    /// Recolours every active light.
    pub fn set_colour(&mut self, colour: Vec3) {
        for light in &mut self.lights[..self.count] {
            light.colour = colour;
        }
    }
}
