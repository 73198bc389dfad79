use crate::config::CameraConfig;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use winit::dpi::PhysicalSize;

const DEFAULT_UP: Vec3 = Vec3::Y;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;

/// Perspective camera used for picking and rendering.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        let aspect = if viewport.height > 0 { viewport.width as f32 / viewport.height as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Generates a world-space ray originating from the camera through a screen-space position.
    pub fn screen_ray(&self, screen: Vec2, viewport: PhysicalSize<u32>) -> Option<(Vec3, Vec3)> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let ndc_x = (2.0 * screen.x / viewport.width as f32) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / viewport.height as f32);
        let clip = Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let inv_view_proj = self.view_projection(viewport).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let world_pos = (world.truncate() / world.w) - self.position;
        let dir = world_pos.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        Some((self.position, dir))
    }

    pub fn project_point(&self, point: Vec3, viewport: PhysicalSize<u32>) -> Option<Vec2> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let clip = self.view_projection(viewport) * point.extend(1.0);
        if clip.w.abs() < f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
        Some(Vec2::new(x, y))
    }
}

/// Damped orbit controller storing yaw/pitch around a target. Input is ignored while the
/// controller is disabled; pending motion still settles on `update`.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub fov_y_radians: f32,
    enabled: bool,
    min_radius: f32,
    max_radius: f32,
    max_pitch: f32,
    damping: f32,
    pending: Vec2,
}

impl OrbitCamera {
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self {
            target,
            radius: radius.max(0.01),
            yaw_radians: 0.0,
            pitch_radians: 0.0,
            fov_y_radians: 60.0_f32.to_radians(),
            enabled: true,
            min_radius: 0.1,
            max_radius: 10_000.0,
            max_pitch: FRAC_PI_2 - 0.01,
            damping: 0.0,
            pending: Vec2::ZERO,
        }
    }

    /// Builds a controller that starts at `position` looking at `target`.
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(0.01);
        let mut orbit = Self::new(target, radius);
        orbit.yaw_radians = offset.x.atan2(offset.z);
        orbit.pitch_radians = -(offset.y / radius).clamp(-1.0, 1.0).asin();
        orbit
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut orbit = Self::looking_from(Vec3::from_array(config.position), Vec3::from_array(config.target));
        orbit.fov_y_radians = config.fov_degrees.to_radians();
        orbit.min_radius = config.min_distance.max(0.01);
        orbit.max_radius = config.max_distance.max(orbit.min_radius);
        // Pitch is the negated elevation; a polar angle of `fraction * PI` from +Y maps to
        // a pitch of `(fraction - 0.5) * PI`.
        orbit.max_pitch = (config.max_polar_fraction - 0.5) * PI;
        orbit.damping = config.damping.clamp(0.0, 1.0);
        orbit.radius = orbit.radius.clamp(orbit.min_radius, orbit.max_radius);
        orbit.clamp_pitch();
        orbit
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn to_camera(&self) -> Camera3D {
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0);
        let offset = rotation * Vec3::new(0.0, 0.0, self.radius);
        let position = self.target + offset;
        Camera3D::new(position, self.target, self.fov_y_radians, CAMERA_NEAR, CAMERA_FAR)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        if self.damping > 0.0 {
            self.pending += delta;
        } else {
            self.apply_rotation(delta);
        }
    }

    /// Rotation from a pointer drag measured in pixels: a drag across the full viewport height
    /// turns the camera once around the target.
    pub fn orbit_pixels(&mut self, delta_px: Vec2, viewport: PhysicalSize<u32>) {
        if viewport.height == 0 {
            return;
        }
        let scale = TAU / viewport.height as f32;
        self.orbit(Vec2::new(-delta_px.x * scale, -delta_px.y * scale));
    }

    /// Slides the target (and the camera with it) in the view plane so the point under the
    /// pointer follows a drag of `delta_px` at the target's depth.
    pub fn pan_pixels(&mut self, delta_px: Vec2, viewport: PhysicalSize<u32>) {
        if !self.enabled || viewport.height == 0 {
            return;
        }
        let camera = self.to_camera();
        let forward = camera.forward();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        let units_per_px = 2.0 * self.radius * (self.fov_y_radians * 0.5).tan() / viewport.height as f32;
        self.target += (-right * delta_px.x + up * delta_px.y) * units_per_px;
    }

    pub fn zoom(&mut self, factor: f32) {
        if !self.enabled || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.radius = (self.radius * factor).clamp(self.min_radius, self.max_radius);
    }

    pub fn update(&mut self) {
        if self.damping > 0.0 {
            let step = self.pending * self.damping;
            self.apply_rotation(step);
            self.pending -= step;
        }
    }

    fn apply_rotation(&mut self, delta: Vec2) {
        self.yaw_radians = crate::wrap_angle(self.yaw_radians + delta.x);
        self.pitch_radians += delta.y;
        self.clamp_pitch();
    }

    fn clamp_pitch(&mut self) {
        self.pitch_radians = self.pitch_radians.clamp(-FRAC_PI_2 + 0.01, self.max_pitch);
    }
}
