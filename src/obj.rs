use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};

use crate::mesh::{MeshData, Vertex};

/// Reads and parses an OBJ file from disk.
pub fn load_obj(path: &Path, flip_v: bool) -> Result<MeshData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    load_obj_from_str(&contents, flip_v)
        .with_context(|| format!("failed to parse OBJ mesh {}", path.display()))
}

/// Parses an OBJ file from memory.
///
/// Polygons are fan-triangulated. Missing normals are computed from the
/// faces; tangents are always derived from the texture coordinates. With
/// `flip_v` the V coordinate becomes `1 - v`.
pub fn load_obj_from_str(data: &str, flip_v: bool) -> Result<MeshData> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut faces: Vec<[FaceIndex; 3]> = Vec::new();

    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
            ),
            "vn" => normals.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid normal on line {}", line_no + 1))?,
            ),
            "vt" => {
                let uv = parse_vec2(parts).with_context(|| {
                    format!("invalid texture coordinate on line {}", line_no + 1)
                })?;
                uvs.push(if flip_v { Vec2::new(uv.x, 1.0 - uv.y) } else { uv });
            }
            "f" => {
                let polygon = parse_face(parts)
                    .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                triangulate_face(&polygon, &mut faces);
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(anyhow!("OBJ file does not define any vertices"));
    }

    let mut mesh = build_mesh(&positions, &normals, &uvs, &faces)?;
    if needs_normals(&mesh.vertices) {
        mesh.compute_normals();
    }
    mesh.compute_tangents();
    Ok(mesh)
}

fn parse_component<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<f32> {
    Ok(parts
        .next()
        .ok_or_else(|| anyhow!("missing vector component"))?
        .parse::<f32>()?)
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let x = parse_component(&mut parts)?;
    let y = parse_component(&mut parts)?;
    let z = parse_component(&mut parts)?;
    Ok(Vec3::new(x, y, z))
}

fn parse_vec2<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec2> {
    let u = parse_component(&mut parts)?;
    let v = parse_component(&mut parts).unwrap_or(0.0);
    Ok(Vec2::new(u, v))
}

fn parse_optional_index(segment: Option<&str>) -> Result<i32> {
    match segment {
        None | Some("") => Ok(0),
        Some(s) => Ok(s.parse::<i32>()?),
    }
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<FaceIndex>> {
    let mut indices = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let v = segments
            .next()
            .ok_or_else(|| anyhow!("missing vertex index"))?
            .parse::<i32>()?;
        let vt = parse_optional_index(segments.next())?;
        let vn = parse_optional_index(segments.next())?;
        indices.push(FaceIndex { v, vt, vn });
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

fn triangulate_face(polygon: &[FaceIndex], faces: &mut Vec<[FaceIndex; 3]>) {
    for i in 1..(polygon.len() - 1) {
        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FaceIndex {
    v: i32,
    vt: i32,
    vn: i32,
}

fn build_mesh(
    positions: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
    faces: &[[FaceIndex; 3]],
) -> Result<MeshData> {
    let mut lookup: HashMap<Key, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for face in faces {
        for idx in face {
            let position =
                fix_index(idx.v, positions.len()).ok_or_else(|| anyhow!("invalid vertex index"))?;
            let key = Key {
                position,
                uv: fix_index(idx.vt, uvs.len()),
                normal: fix_index(idx.vn, normals.len()),
            };
            let next_index = vertices.len() as u32;
            let entry = lookup.entry(key).or_insert_with(|| {
                vertices.push(Vertex::new(
                    positions[key.position],
                    key.normal.map(|i| normals[i]).unwrap_or(Vec3::ZERO),
                    key.uv.map(|i| uvs[i]).unwrap_or(Vec2::ZERO),
                ));
                next_index
            });
            indices.push(*entry);
        }
    }

    Ok(MeshData { vertices, indices })
}

fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then_some(len - abs)
    } else {
        None
    }
}

fn needs_normals(vertices: &[Vertex]) -> bool {
    vertices.iter().any(|vertex| vertex.normal == [0.0; 3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triangle() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj, false).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn computes_missing_normals() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj, false).unwrap();
        for vertex in &mesh.vertices {
            assert!(Vec3::from(vertex.normal).abs_diff_eq(Vec3::Z, 1e-5));
        }
    }

    #[test]
    fn triangulates_quads_with_uvs_and_negative_indices() {
        let obj = "\
v -1 0 1
v 1 0 1
v 1 0 -1
v -1 0 -1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f -4/1/1 -3/2/1 -2/3/1 -1/4/1
";
        let mesh = load_obj_from_str(obj, true).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 0.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n";
        let mesh = load_obj_from_str(obj, false).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(load_obj_from_str(obj, false).is_err());
    }

    #[test]
    fn rejects_empty_files() {
        assert!(load_obj_from_str("# nothing here\n", false).is_err());
    }
}
