//! Ring placement math shared by every gallery. Items sit at equal
//! angular spacing on an ellipse whose vertical and depth flattening
//! differ per section: video and photo rings tilt away from the camera,
//! the contact ring stays flat and camera-facing.

use std::f32::consts::TAU;

use glam::{Mat3, Quat, Vec3};

/// Tilted-ellipse flattening used by the video and photo rings.
pub const TILT_FLATTEN_Y: f32 = 0.3;
pub const TILT_FLATTEN_Z: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    pub radius: f32,
    pub flatten_y: f32,
    pub flatten_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSlot {
    pub position: Vec3,
    pub orientation: Quat,
}

impl RingLayout {
    /// Tilted ellipse facing the camera at an angle.
    pub fn tilted(radius: f32) -> Self {
        Self {
            radius,
            flatten_y: TILT_FLATTEN_Y,
            flatten_z: TILT_FLATTEN_Z,
        }
    }

    /// Flat circle in the camera plane; slots keep identity orientation.
    pub fn camera_facing(radius: f32) -> Self {
        Self {
            radius,
            flatten_y: 1.0,
            flatten_z: 0.0,
        }
    }

    pub fn angle(index: usize, count: usize) -> f32 {
        index as f32 / count.max(1) as f32 * TAU
    }

    pub fn slot(&self, index: usize, count: usize) -> RingSlot {
        let angle = Self::angle(index, count);
        let position = Vec3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin() * self.flatten_y,
            self.radius * angle.sin() * self.flatten_z,
        );
        let orientation = if self.flatten_z.abs() <= f32::EPSILON {
            Quat::IDENTITY
        } else {
            face_center(position)
        };
        RingSlot {
            position,
            orientation,
        }
    }

    pub fn slots(&self, count: usize) -> Vec<RingSlot> {
        (0..count).map(|index| self.slot(index, count)).collect()
    }
}

/// Per-index stagger for entry choreography; cosmetic only, interaction
/// is live before the last item lands.
pub fn stagger_delay(index: usize, increment: f32) -> f32 {
    index as f32 * increment
}

/// Orientation whose local +Z axis points at the ring center.
fn face_center(position: Vec3) -> Quat {
    let to_center = -position;
    if to_center.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    let forward = to_center.normalize();
    let mut up = Vec3::Y;
    if forward.dot(up).abs() > 0.999 {
        up = Vec3::Z;
    }
    let right = up.cross(forward).normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}
