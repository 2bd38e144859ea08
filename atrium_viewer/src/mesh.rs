//! CPU-side primitives and instance payloads for the gallery renderer.
//! Video cubes, photo planes, and contact spheres are the only shapes;
//! per-entity pose and tint ride in the instance buffer.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

const SPHERE_LAT_DIVS: u32 = 12;
const SPHERE_LON_DIVS: u32 = 18;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug)]
pub struct MeshPrimitive {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshPrimitive {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Cube,
    Plane,
    Sphere,
}

/// One rendered entity: model matrix columns, base tint (alpha carries
/// opacity), and highlight weight in `params.x`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub view_projection: [[f32; 4]; 4],
}

pub fn view_projection_uniform(matrix: Mat4) -> MeshUniforms {
    MeshUniforms {
        view_projection: matrix.to_cols_array_2d(),
    }
}

pub fn instance(model: Mat4, color: [f32; 3], opacity: f32, emphasis: f32) -> MeshInstance {
    MeshInstance {
        model: model.to_cols_array_2d(),
        color: [color[0], color[1], color[2], opacity.clamp(0.0, 1.0)],
        params: [emphasis.clamp(0.0, 1.0), 0.0, 0.0, 0.0],
    }
}

pub fn primitive(kind: PrimitiveKind) -> MeshPrimitive {
    match kind {
        PrimitiveKind::Cube => build_cube(),
        PrimitiveKind::Plane => build_plane(),
        PrimitiveKind::Sphere => build_sphere(SPHERE_LAT_DIVS, SPHERE_LON_DIVS),
    }
}

/// Unit-radius cube (edge 2.5 in gallery space comes from the instance
/// transform's pickable extents, not the mesh).
fn build_cube() -> MeshPrimitive {
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-1.0, -1.0, 1.0],
                [1.0, -1.0, 1.0],
                [1.0, 1.0, 1.0],
                [-1.0, 1.0, 1.0],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [1.0, -1.0, -1.0],
                [-1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [1.0, 1.0, -1.0],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [1.0, -1.0, 1.0],
                [1.0, -1.0, -1.0],
                [1.0, 1.0, -1.0],
                [1.0, 1.0, 1.0],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-1.0, -1.0, -1.0],
                [-1.0, -1.0, 1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, 1.0, -1.0],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
                [-1.0, 1.0, -1.0],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-1.0, -1.0, -1.0],
                [1.0, -1.0, -1.0],
                [1.0, -1.0, 1.0],
                [-1.0, -1.0, 1.0],
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        for corner in corners {
            vertices.push(MeshVertex {
                position: corner,
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshPrimitive::new(vertices, indices)
}

/// Photo card: a 3x2 quad, both faces emitted so orbiting behind the
/// ring still shows the card.
fn build_plane() -> MeshPrimitive {
    let corners = [
        [-1.5, -1.0, 0.0],
        [1.5, -1.0, 0.0],
        [1.5, 1.0, 0.0],
        [-1.5, 1.0, 0.0],
    ];
    let mut vertices = Vec::with_capacity(8);
    for corner in corners {
        vertices.push(MeshVertex {
            position: corner,
            normal: [0.0, 0.0, 1.0],
        });
    }
    for corner in corners {
        vertices.push(MeshVertex {
            position: corner,
            normal: [0.0, 0.0, -1.0],
        });
    }
    let indices = vec![0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6];
    MeshPrimitive::new(vertices, indices)
}

fn build_sphere(lat_divisions: u32, lon_divisions: u32) -> MeshPrimitive {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for lat in 0..=lat_divisions {
        let v = lat as f32 / lat_divisions as f32;
        let theta = v * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for lon in 0..=lon_divisions {
            let u = lon as f32 / lon_divisions as f32;
            let phi = u * 2.0 * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let position = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            vertices.push(MeshVertex {
                position,
                normal: position,
            });
        }
    }
    let stride = lon_divisions + 1;
    for lat in 0..lat_divisions {
        for lon in 0..lon_divisions {
            let a = (lat * stride + lon) as u16;
            let b = a + 1;
            let c = a + stride as u16;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    MeshPrimitive::new(vertices, indices)
}

pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_faces_of_quads() {
        let cube = primitive(PrimitiveKind::Cube);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for vertex in &cube.vertices {
            let n = vertex.normal;
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((length - 1.0).abs() <= 1e-6);
        }
    }

    #[test]
    fn plane_is_double_sided() {
        let plane = primitive(PrimitiveKind::Plane);
        assert_eq!(plane.vertices.len(), 8);
        assert_eq!(plane.indices.len(), 12);
    }

    #[test]
    fn sphere_indices_stay_in_vertex_range() {
        let sphere = primitive(PrimitiveKind::Sphere);
        let count = sphere.vertices.len() as u16;
        assert!(sphere.indices.iter().all(|&index| index < count));
        assert_eq!(sphere.indices.len() % 3, 0);
    }

    #[test]
    fn instance_clamps_opacity_and_emphasis() {
        let inst = instance(Mat4::IDENTITY, [0.5, 0.5, 0.5], 1.7, -0.4);
        assert_eq!(inst.color[3], 1.0);
        assert_eq!(inst.params[0], 0.0);
    }
}
