//! Camera rig, orbit controls, and the viewport session bundle backing
//! one visual context. Sessions are created on gallery entry, resized
//! with the window, and torn down (idempotently) on exit; two active
//! controllers never share one.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::error::SceneError;
use crate::picking::{PointerNdc, Ray};

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR_CLIP: f32 = 0.1;
pub const DEFAULT_FAR_CLIP: f32 = 1000.0;

/// Fraction of orbit velocity retained per update tick.
pub const ORBIT_DAMPING: f32 = 0.05;
const MIN_PITCH_MARGIN: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    pub fn new(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y_radians: DEFAULT_FOV_DEGREES.to_radians(),
            aspect,
            near: DEFAULT_NEAR_CLIP,
            far: DEFAULT_FAR_CLIP,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let projection = Mat4::perspective_rh(
            self.fov_y_radians,
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        );
        projection * view
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// World-space ray under the pointer, or `None` for a degenerate
    /// projection.
    pub fn pointer_ray(&self, ndc: PointerNdc) -> Option<Ray> {
        Ray::from_ndc(ndc, self.view_projection().inverse())
    }
}

/// Scripted landing fly-in: the camera lerps from its start pose to the
/// rest pose, and orbit controls stay locked until it lands.
#[derive(Debug, Clone)]
pub struct CameraFlight {
    start: Vec3,
    end: Vec3,
    duration: f32,
    elapsed: f32,
}

impl CameraFlight {
    pub fn new(start: Vec3, end: Vec3, duration: f32) -> Self {
        Self {
            start,
            end,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advance the flight; returns true once the camera has landed.
    pub fn advance(&mut self, dt: f32, camera: &mut CameraRig) -> bool {
        self.elapsed += dt;
        let progress = (self.elapsed / self.duration).min(1.0);
        camera.eye = self.start.lerp(self.end, progress);
        progress >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Damped orbit around the camera target with per-section distance
/// clamps. Velocity decays by the damping factor each frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub limits: OrbitLimits,
    pub enabled: bool,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

impl OrbitControls {
    pub fn new(limits: OrbitLimits) -> Self {
        Self {
            limits,
            enabled: true,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    /// Accumulate pointer-drag input as angular velocity.
    pub fn input(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if self.enabled {
            self.yaw_velocity += delta_yaw;
            self.pitch_velocity += delta_pitch;
        }
    }

    /// Dolly toward or away from the target, clamped to the limits.
    pub fn zoom(&mut self, camera: &mut CameraRig, delta: f32) {
        if !self.enabled {
            return;
        }
        let offset = camera.eye - camera.target;
        let distance = offset.length().max(f32::EPSILON);
        let clamped = (distance + delta).clamp(self.limits.min_distance, self.limits.max_distance);
        camera.eye = camera.target + offset / distance * clamped;
    }

    /// Apply damped velocities to the camera pose. Call once per frame.
    pub fn update(&mut self, camera: &mut CameraRig) {
        if !self.enabled {
            return;
        }
        if self.yaw_velocity.abs() <= f32::EPSILON && self.pitch_velocity.abs() <= f32::EPSILON {
            return;
        }

        let offset = camera.eye - camera.target;
        let radius = offset.length().max(f32::EPSILON);
        let mut theta = offset.z.atan2(offset.x);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.yaw_velocity;
        phi = (phi + self.pitch_velocity)
            .clamp(MIN_PITCH_MARGIN, std::f32::consts::PI - MIN_PITCH_MARGIN);

        camera.eye = camera.target
            + Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );

        let retain = 1.0 - ORBIT_DAMPING;
        self.yaw_velocity *= retain;
        self.pitch_velocity *= retain;
        if self.yaw_velocity.abs() < 1e-5 {
            self.yaw_velocity = 0.0;
        }
        if self.pitch_velocity.abs() < 1e-5 {
            self.pitch_velocity = 0.0;
        }
    }
}

/// Known render containers. The shell registers each surface it created;
/// a session asked for an unknown id fails with a recoverable error the
/// router logs and degrades from.
#[derive(Debug, Default)]
pub struct SurfaceDirectory {
    containers: BTreeMap<String, (u32, u32)>,
}

impl SurfaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, width: u32, height: u32) {
        self.containers
            .insert(id.to_string(), (width.max(1), height.max(1)));
    }

    pub fn lookup(&self, id: &str) -> Option<(u32, u32)> {
        self.containers.get(id).copied()
    }

    /// Full-window containers all track the window size.
    pub fn resize_all(&mut self, width: u32, height: u32) {
        for size in self.containers.values_mut() {
            *size = (width.max(1), height.max(1));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_distance: f32,
    pub orbit: Option<OrbitLimits>,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR_CLIP,
            far: DEFAULT_FAR_CLIP,
            camera_distance: 15.0,
            orbit: None,
        }
    }
}

/// Camera + render-surface + controls bundle for one visual context.
#[derive(Debug)]
pub struct ViewportSession {
    container: String,
    pub camera: CameraRig,
    pub controls: Option<OrbitControls>,
    size: (u32, u32),
    attached: bool,
}

impl ViewportSession {
    pub fn create(
        container: &str,
        directory: &SurfaceDirectory,
        options: ViewportOptions,
    ) -> Result<Self, SceneError> {
        let Some(size) = directory.lookup(container) else {
            return Err(SceneError::MissingContainer(container.to_string()));
        };
        let aspect = size.0 as f32 / size.1 as f32;
        let mut camera = CameraRig::new(
            Vec3::new(0.0, 0.0, options.camera_distance),
            Vec3::ZERO,
            aspect,
        );
        camera.fov_y_radians = options.fov_degrees.to_radians();
        camera.near = options.near;
        camera.far = options.far;
        Ok(Self {
            container: container.to_string(),
            camera,
            controls: options.orbit.map(OrbitControls::new),
            size,
            attached: true,
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.camera
            .set_aspect(self.size.0 as f32 / self.size.1 as f32);
    }

    /// Damped control update; a no-op for sessions without controls.
    pub fn update_controls(&mut self) {
        if let Some(controls) = self.controls.as_mut() {
            controls.update(&mut self.camera);
        }
    }

    /// Detach from the render container. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.attached = false;
        self.controls = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> SurfaceDirectory {
        let mut directory = SurfaceDirectory::new();
        directory.register("projects-3d-container", 1280, 720);
        directory
    }

    #[test]
    fn missing_container_is_a_recoverable_error() {
        let directory = directory();
        let result =
            ViewportSession::create("absent-container", &directory, ViewportOptions::default());
        assert!(matches!(
            result,
            Err(SceneError::MissingContainer(ref id)) if id == "absent-container"
        ));
    }

    #[test]
    fn session_camera_starts_at_the_configured_distance() {
        let directory = directory();
        let session = ViewportSession::create(
            "projects-3d-container",
            &directory,
            ViewportOptions {
                camera_distance: 15.0,
                ..ViewportOptions::default()
            },
        )
        .expect("session");
        assert!((session.camera.distance() - 15.0).abs() <= 1e-5);
        assert!(session.is_attached());
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let directory = directory();
        let mut session = ViewportSession::create(
            "projects-3d-container",
            &directory,
            ViewportOptions::default(),
        )
        .expect("session");
        session.resize(1000, 500);
        assert!((session.camera.aspect - 2.0).abs() <= 1e-5);
    }

    #[test]
    fn dispose_is_idempotent() {
        let directory = directory();
        let mut session = ViewportSession::create(
            "projects-3d-container",
            &directory,
            ViewportOptions {
                orbit: Some(OrbitLimits {
                    min_distance: 8.0,
                    max_distance: 25.0,
                }),
                ..ViewportOptions::default()
            },
        )
        .expect("session");
        session.dispose();
        session.dispose();
        assert!(!session.is_attached());
        assert!(session.controls.is_none());
    }

    #[test]
    fn zoom_clamps_to_orbit_limits() {
        let limits = OrbitLimits {
            min_distance: 8.0,
            max_distance: 25.0,
        };
        let mut controls = OrbitControls::new(limits);
        let mut camera = CameraRig::new(Vec3::new(0.0, 0.0, 15.0), Vec3::ZERO, 1.0);
        controls.zoom(&mut camera, 100.0);
        assert!((camera.distance() - 25.0).abs() <= 1e-4);
        controls.zoom(&mut camera, -100.0);
        assert!((camera.distance() - 8.0).abs() <= 1e-4);
    }

    #[test]
    fn orbit_preserves_distance_and_damps_out() {
        let mut controls = OrbitControls::new(OrbitLimits {
            min_distance: 1.0,
            max_distance: 100.0,
        });
        let mut camera = CameraRig::new(Vec3::new(0.0, 0.0, 15.0), Vec3::ZERO, 1.0);
        controls.input(0.2, 0.1);
        for _ in 0..400 {
            controls.update(&mut camera);
        }
        assert!((camera.distance() - 15.0).abs() <= 1e-3);
        assert_eq!(controls.yaw_velocity, 0.0);
        assert_eq!(controls.pitch_velocity, 0.0);
    }

    #[test]
    fn camera_flight_lands_and_reports_completion() {
        let mut camera = CameraRig::new(Vec3::ZERO, Vec3::ZERO, 1.0);
        let start = Vec3::new(157.18, 131.16, 202.86);
        let end = Vec3::new(520.15, 129.64, 818.43);
        let mut flight = CameraFlight::new(start, end, 2.0);
        assert!(!flight.advance(1.0, &mut camera));
        let midpoint = start.lerp(end, 0.5);
        assert!((camera.eye - midpoint).length() <= 1e-3);
        assert!(flight.advance(1.5, &mut camera));
        assert!((camera.eye - end).length() <= 1e-3);
    }
}
