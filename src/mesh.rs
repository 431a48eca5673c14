use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Interleaved vertex shared by every shader variant.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Tangent in xyz, bitangent handedness in w.
    pub tangent: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            tangent: [0.0; 4],
        }
    }
}

/// CPU-side triangle list, ready to upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit quad in the XZ plane facing +Y.
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new(Vec3::new(-0.5, 0.0, 0.5), Vec3::Y, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(0.5, 0.0, 0.5), Vec3::Y, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::Y, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(0.5, 0.0, -0.5), Vec3::Y, Vec2::new(1.0, 0.0)),
        ];
        let mut mesh = Self {
            vertices,
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        mesh.compute_tangents();
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Averages face normals into every vertex.
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let normal = (p1 - p0).cross(p2 - p0);
            if normal.length_squared() > f32::EPSILON {
                let normal = normal.normalize();
                accum[i0] += normal;
                accum[i1] += normal;
                accum[i2] += normal;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }

    /// Derives per-vertex tangents from the texture coordinates.
    ///
    /// Vertices whose UVs are degenerate get an arbitrary tangent
    /// perpendicular to their normal.
    pub fn compute_tangents(&mut self) {
        let count = self.vertices.len();
        let mut tangents = vec![Vec3::ZERO; count];
        let mut bitangents = vec![Vec3::ZERO; count];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);
            let dp1 = Vec3::from(v1.position) - Vec3::from(v0.position);
            let dp2 = Vec3::from(v2.position) - Vec3::from(v0.position);
            let duv1 = Vec2::from(v1.uv) - Vec2::from(v0.uv);
            let duv2 = Vec2::from(v2.uv) - Vec2::from(v0.uv);
            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (dp1 * duv2.y - dp2 * duv1.y) * r;
            let bitangent = (dp2 * duv1.x - dp1 * duv2.x) * r;
            for i in [i0, i1, i2] {
                tangents[i] += tangent;
                bitangents[i] += bitangent;
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let normal = Vec3::from(vertex.normal).normalize_or_zero();
            // Gram-Schmidt against the normal.
            let tangent = (tangents[i] - normal * normal.dot(tangents[i])).normalize_or_zero();
            let tangent = if tangent == Vec3::ZERO {
                if normal == Vec3::ZERO {
                    Vec3::X
                } else {
                    normal.any_orthonormal_vector()
                }
            } else {
                tangent
            };
            let handedness = if normal.cross(tangent).dot(bitangents[i]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            vertex.tangent = tangent.extend(handedness).to_array();
        }
    }
}
