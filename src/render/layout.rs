//! Byte layout of each variant's uniform block, following WGSL's uniform
//! address-space rules (vec3 and matrix columns aligned to 16 bytes, scalars
//! may pack into the tail of a vec3).

use std::collections::HashMap;

use crate::shader::{ShaderVariant, UniformType, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub ty: UniformType,
}

#[derive(Debug, Clone)]
pub struct UniformLayout {
    fields: HashMap<String, Field>,
    order: Vec<String>,
    size: usize,
}

fn align_of(ty: UniformType) -> usize {
    match ty {
        UniformType::Int | UniformType::Float | UniformType::Sampler => 4,
        UniformType::Vec3 | UniformType::Mat3 | UniformType::Mat4 => 16,
    }
}

fn size_of(ty: UniformType) -> usize {
    match ty {
        UniformType::Int | UniformType::Float | UniformType::Sampler => 4,
        UniformType::Vec3 => 12,
        UniformType::Mat3 => 48,
        UniformType::Mat4 => 64,
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) / align * align
}

impl UniformLayout {
    /// Buffer layout of `variant`. Sampler uniforms select texture slots and
    /// take no space in the buffer.
    pub fn for_variant(variant: ShaderVariant) -> Self {
        let mut fields = HashMap::new();
        let mut order = Vec::new();
        let mut offset = 0;
        for (name, ty) in variant.uniforms() {
            if ty == UniformType::Sampler {
                continue;
            }
            offset = align_up(offset, align_of(ty));
            fields.insert(name.clone(), Field { offset, ty });
            order.push(name);
            offset += size_of(ty);
        }
        Self {
            fields,
            order,
            size: align_up(offset.max(16), 16),
        }
    }

    /// Size of the buffer in bytes, rounded up to 16.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.fields.get(name).copied()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Writes `value` into `bytes` at the offset of `name`.
    ///
    /// Returns `false` when the block has no such field or the type differs.
    pub fn write(&self, bytes: &mut [u8], name: &str, value: &UniformValue) -> bool {
        let Some(field) = self.field(name) else {
            return false;
        };
        if field.ty != value.uniform_type() {
            return false;
        }
        let target = &mut bytes[field.offset..field.offset + size_of(field.ty)];
        match value {
            UniformValue::Int(v) => target.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float(v) => target.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec3(v) => target.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat3(m) => {
                // Each column is padded out to a vec4.
                let cols = [m.x_axis, m.y_axis, m.z_axis].map(|c| c.extend(0.0).to_array());
                target.copy_from_slice(bytemuck::cast_slice(&cols));
            }
            UniformValue::Mat4(m) => {
                target.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()))
            }
            UniformValue::Sampler(_) => return false,
        }
        true
    }
}
