//! Pointer hit-testing: normalized device coordinates unproject into a
//! world-space ray through the active camera, the ray is tested against
//! each entity's oriented bounds in local space, and hits resolve to the
//! ancestor carrying identity metadata.

use glam::{Mat4, Vec3, Vec4};

use crate::registry::EntityRegistry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerNdc {
    pub x: f32,
    pub y: f32,
}

impl PointerNdc {
    /// Screen pixels to normalized device coordinates:
    /// `(2x/w - 1, 1 - 2y/h)`.
    pub fn from_screen(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: 2.0 * x / width.max(1.0) - 1.0,
            y: 1.0 - 2.0 * y / height.max(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Unproject an NDC position through the inverse view-projection.
    /// Depth runs 0..1 (wgpu convention), so the near plane sits at
    /// `z = 0` and the far plane at `z = 1`.
    pub fn from_ndc(ndc: PointerNdc, inverse_view_projection: Mat4) -> Option<Self> {
        let near = unproject(inverse_view_projection, Vec4::new(ndc.x, ndc.y, 0.0, 1.0))?;
        let far = unproject(inverse_view_projection, Vec4::new(ndc.x, ndc.y, 1.0, 1.0))?;
        let direction = far - near;
        if direction.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(Self {
            origin: near,
            direction: direction.normalize(),
        })
    }
}

fn unproject(inverse_view_projection: Mat4, clip: Vec4) -> Option<Vec3> {
    let world = inverse_view_projection * clip;
    if world.w.abs() <= f32::EPSILON {
        return None;
    }
    let point = world.truncate() / world.w;
    if !point.is_finite() {
        return None;
    }
    Some(point)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: usize,
    pub distance: f32,
}

/// Intersect the ray with every visible entity, nearest first. Invisible
/// entities (an expanded photo's faded 3D visual) are not pickable.
pub fn pick(ray: Ray, registry: &EntityRegistry) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();
    for entity in registry.entities() {
        if !entity.visible {
            continue;
        }
        let Some(node) = registry.node(entity.mesh) else {
            continue;
        };
        let Some(half_extents) = node.half_extents else {
            continue;
        };
        let inverse = entity.model_matrix().inverse();
        // A zero scale mid-entry makes the matrix singular; skip it.
        if !inverse.is_finite() {
            continue;
        }
        let local_origin = inverse.transform_point3(ray.origin);
        let local_direction = inverse.transform_vector3(ray.direction);
        if let Some(distance) = ray_slab_test(local_origin, local_direction, half_extents) {
            // The hit lands on the mesh leaf; only entities whose chain
            // carries an identity tag produce a valid hit.
            if let Some(index) = registry.entity_index_for_node(entity.mesh) {
                hits.push(Hit {
                    entity: index,
                    distance,
                });
            }
        }
    }
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest valid hit, if any.
pub fn pick_nearest(ray: Ray, registry: &EntityRegistry) -> Option<Hit> {
    pick(ray, registry).into_iter().next()
}

/// Slab test against an axis-aligned box centered at the local origin.
/// The ray parameter is preserved through the affine transform into
/// local space, so the returned distance is in world units along the
/// original (normalized) direction.
fn ray_slab_test(origin: Vec3, direction: Vec3, half_extents: Vec3) -> Option<f32> {
    let origin = origin.to_array();
    let direction = direction.to_array();
    let half = half_extents.to_array();

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if direction[axis].abs() <= f32::EPSILON {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let inverse = 1.0 / direction[axis];
        let mut t0 = (-half[axis] - origin[axis]) * inverse;
        let mut t1 = (half[axis] - origin[axis]) * inverse;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}
