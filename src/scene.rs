use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::lights::{Light, LightKind, LightSet, LIGHT_COLOUR_PRESETS, MAX_LIGHTS};

/// Values accepted in an object's `<type>` element.
const OBJECT_TYPES: [&str; 3] = ["quad", "mesh", "light"];

/// Runtime representation of a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: LightSet,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            lights: LightSet::default(),
        }
    }
}

impl Scene {
    /// Built-in scene used when no file is given: a large textured quad lit
    /// by a single yellow directional light.
    pub fn default_scene() -> Self {
        let quad = SceneObject {
            name: "Quad".to_string(),
            object_type: "quad".to_string(),
            scale: Vec3::splat(10.0),
            ..SceneObject::default()
        };
        let sun = SceneObject {
            name: "Sun".to_string(),
            object_type: "light".to_string(),
            light_kind: LightKind::Directional,
            direction: Vec3::X,
            color: LIGHT_COLOUR_PRESETS[0],
            ..SceneObject::default()
        };
        let lights = LightSet::single(Vec3::splat(0.25), sun.light());
        Self {
            objects: vec![quad, sun],
            lights,
        }
    }

    /// Parses a `<scene>` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        let ambient = parse_color(optional_text(&root, "ambient"), Vec3::splat(0.25))?;
        let mut objects = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "mesh".to_string());
            if !OBJECT_TYPES.contains(&object.object_type.as_str()) {
                return Err(anyhow!(
                    "object {} has unknown type `{}` (expected quad, mesh or light)",
                    object.name,
                    object.object_type
                ));
            }
            object.mesh = optional_text(&node, "mesh");
            object.flip_v = node.children().any(|child| child.has_tag_name("flip_v"));
            object.texture = optional_text(&node, "texture");
            object.normal_map = optional_text(&node, "normal_map");
            object.color = parse_color(optional_text(&node, "color"), object.color)?;
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)?;
            if !object.scale.is_finite() || object.scale.cmpeq(Vec3::ZERO).any() {
                return Err(anyhow!("object {} has a zero or non-finite scale", object.name));
            }
            object.direction = parse_vec3(optional_text(&node, "direction"), object.direction)?;
            object.intensity = parse_f32(optional_text(&node, "intensity"), object.intensity)?;
            object.specular_power =
                parse_f32(optional_text(&node, "specular_power"), object.specular_power)?;
            object.roughness = parse_f32(optional_text(&node, "roughness"), object.roughness)?;
            object.reflection = parse_f32(optional_text(&node, "reflection"), object.reflection)?;
            if let Some(kind) = optional_text(&node, "light") {
                object.light_kind = parse_light_kind(&kind)?;
            }
            if object.object_type == "mesh" && object.mesh.is_none() {
                return Err(anyhow!("mesh object {} has no <mesh> path", object.name));
            }
            objects.push(object);
        }

        let mut lights = LightSet::new(ambient);
        for object in objects.iter().filter(|o| o.is_light()) {
            lights.push(object.light()).with_context(|| {
                format!("scene defines more than {MAX_LIGHTS} lights ({})", object.name)
            })?;
        }

        Ok(Self { objects, lights })
    }

    /// Objects that produce a draw call.
    pub fn drawables(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| !o.is_light())
    }
}

/// Scene object as written in the scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    /// `quad`, `mesh` or `light`.
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(default)]
    pub flip_v: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_map: Option<String>,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub light_kind: LightKind,
    #[serde(default = "default_direction")]
    pub direction: Vec3,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_specular_power")]
    pub specular_power: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_reflection")]
    pub reflection: f32,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            mesh: None,
            flip_v: false,
            texture: None,
            normal_map: None,
            color: default_color(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            light_kind: LightKind::default(),
            direction: default_direction(),
            intensity: default_intensity(),
            specular_power: default_specular_power(),
            roughness: default_roughness(),
            reflection: default_reflection(),
        }
    }
}

impl SceneObject {
    pub fn is_light(&self) -> bool {
        self.object_type == "light"
    }

    /// Translation * rotation * scale.
    pub fn model_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians());
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }

    pub fn light(&self) -> Light {
        match self.light_kind {
            LightKind::Directional => {
                Light::directional(self.direction, self.color, self.intensity)
            }
            LightKind::Point => Light::point(self.position, self.color, self.intensity),
        }
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_direction() -> Vec3 {
    Vec3::NEG_Y
}

fn default_intensity() -> f32 {
    1.0
}

fn default_specular_power() -> f32 {
    32.0
}

fn default_roughness() -> f32 {
    0.35
}

fn default_reflection() -> f32 {
    0.04
}

fn parse_light_kind(text: &str) -> Result<LightKind> {
    match text.to_ascii_lowercase().as_str() {
        "directional" | "sun" => Ok(LightKind::Directional),
        "point" => Ok(LightKind::Point),
        other => Err(anyhow!("unknown light kind `{other}`")),
    }
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_triple(value: &str, what: &str) -> Result<[f32; 3]> {
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid {what} component `{component}`: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(anyhow!("{what} needs exactly 3 components, got {}", numbers.len())),
    }
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from(parse_triple(&value, "vector")?))
}

/// Colours are written as 0-255 triples.
fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from(parse_triple(&value, "color")?) / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}
