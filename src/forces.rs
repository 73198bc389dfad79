use crate::config::{BlastConfig, GravityGunConfig};
use bevy_ecs::prelude::Component;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Direction of travel around the gravity-gun anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitDirection {
    Clockwise,
    CounterClockwise,
}

impl OrbitDirection {
    /// Spawn-index banding: three entities per band, alternating direction.
    pub fn for_index(index: usize) -> Self {
        if (index / 3) % 2 == 0 {
            OrbitDirection::CounterClockwise
        } else {
            OrbitDirection::Clockwise
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            OrbitDirection::CounterClockwise => 1.0,
            OrbitDirection::Clockwise => -1.0,
        }
    }
}

/// Per-entity orbit assignment made when the gravity gun engages.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitSlot {
    pub phase: f32,
    pub direction: OrbitDirection,
    pub in_range: bool,
}

impl OrbitSlot {
    pub fn new(phase: f32, direction: OrbitDirection) -> Self {
        Self { phase, direction, in_range: false }
    }
}

pub fn planar_distance_sq(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length_squared()
}

pub fn within_orbit_range(position: Vec3, anchor: Vec3, range: f32) -> bool {
    planar_distance_sq(position, anchor) <= range * range
}

/// Point on the tilted ring the entity is pulled toward `elapsed` seconds after engagement.
pub fn orbit_target(anchor: Vec3, elapsed: f32, slot: &OrbitSlot, half_extent: f32, cfg: &GravityGunConfig) -> Vec3 {
    let angle = elapsed * cfg.revolutions_per_second * TAU * slot.direction.sign() + slot.phase;
    let tilt = cfg.tilt_radians();
    let projected_radius = cfg.radius * tilt.cos();
    let tilt_lift = cfg.radius * tilt.sin();
    let bob = (elapsed * 2.0 + angle).sin() * cfg.oscillation;
    let y = (anchor.y + cfg.base_lift + tilt_lift + bob).max(half_extent + cfg.ground_clearance);
    Vec3::new(anchor.x + angle.cos() * projected_radius, y, anchor.z + angle.sin() * projected_radius)
}

/// Velocity-correcting impulse toward `target`; the desired velocity is capped at `max_speed`.
pub fn orbit_impulse(target: Vec3, position: Vec3, velocity: Vec3, mass: f32, cfg: &GravityGunConfig) -> Vec3 {
    let desired = ((target - position) * cfg.gain).clamp_length_max(cfg.max_speed);
    (desired - velocity) * mass
}

pub fn orbit_spin(cfg: &GravityGunConfig, direction: OrbitDirection) -> Vec3 {
    let [x, y, z] = cfg.spin;
    Vec3::new(x, y * direction.sign(), z)
}

/// Spring velocity pulling a dragged entity onto its drag point.
pub fn drag_velocity(drag_point: Vec3, position: Vec3, gain: f32) -> Vec3 {
    (drag_point - position) * gain
}

pub fn throw_velocity(velocity: Vec3, max_speed: f32) -> Vec3 {
    velocity.clamp_length_max(max_speed)
}

/// Outward blast impulse. `jitter` holds two samples in [0, 1) that perturb the horizontal
/// direction so stacked entities separate.
pub fn blast_impulse(position: Vec3, jitter: Vec2, cfg: &BlastConfig) -> Vec3 {
    let mut direction = position
        + Vec3::new((jitter.x - 0.5) * cfg.jitter, cfg.lift, (jitter.y - 0.5) * cfg.jitter);
    if direction.length_squared() < 0.001 {
        direction = Vec3::Y;
    }
    direction.normalize() * cfg.strength + Vec3::new(0.0, cfg.upward_boost, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_alternates_every_three_entities() {
        let signs: Vec<f32> = (0..7).map(|i| OrbitDirection::for_index(i).sign()).collect();
        assert_eq!(signs, vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn orbit_target_never_sinks_below_clearance() {
        let cfg = GravityGunConfig::default();
        let anchor = Vec3::new(0.0, -3.0, 0.0);
        for step in 0..360 {
            let slot = OrbitSlot::new(step as f32 * TAU / 360.0, OrbitDirection::Clockwise);
            let target = orbit_target(anchor, step as f32 * 0.05, &slot, 0.5, &cfg);
            assert!(target.y >= 0.75 - 1e-6, "target.y {} below clearance", target.y);
        }
    }

    #[test]
    fn orbit_target_sits_on_projected_ring() {
        let cfg = GravityGunConfig::default();
        let slot = OrbitSlot::new(0.7, OrbitDirection::CounterClockwise);
        let target = orbit_target(Vec3::new(2.0, 0.0, -1.0), 1.3, &slot, 0.5, &cfg);
        let planar = planar_distance_sq(target, Vec3::new(2.0, 0.0, -1.0)).sqrt();
        let expected = cfg.radius * cfg.tilt_radians().cos();
        assert!((planar - expected).abs() < 1e-4);
    }

    #[test]
    fn orbit_impulse_caps_desired_speed() {
        let cfg = GravityGunConfig::default();
        let impulse = orbit_impulse(Vec3::new(100.0, 0.0, 0.0), Vec3::ZERO, Vec3::ZERO, 2.0, &cfg);
        assert!((impulse.length() - 24.0).abs() < 1e-3);
        let settled = orbit_impulse(Vec3::X, Vec3::ZERO, Vec3::new(4.2, 0.0, 0.0), 1.0, &cfg);
        assert!(settled.length() < 1e-5);
    }

    #[test]
    fn range_check_ignores_height() {
        let anchor = Vec3::ZERO;
        assert!(within_orbit_range(Vec3::new(4.5, 30.0, 0.0), anchor, 4.5));
        assert!(!within_orbit_range(Vec3::new(3.2, 0.0, 3.2), anchor, 4.5));
    }

    #[test]
    fn blast_at_origin_without_jitter_points_up() {
        let cfg = BlastConfig { lift: 0.0, ..BlastConfig::default() };
        let impulse = blast_impulse(Vec3::ZERO, Vec2::splat(0.5), &cfg);
        assert!((impulse - Vec3::new(0.0, 47.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn blast_pushes_outward_with_upward_boost() {
        let cfg = BlastConfig::default();
        let impulse = blast_impulse(Vec3::new(3.0, 0.0, 0.0), Vec2::splat(0.5), &cfg);
        assert!(impulse.x > 30.0);
        assert!(impulse.y > cfg.upward_boost);
        assert!(impulse.z.abs() < 1e-5);
    }

    #[test]
    fn throw_is_clamped() {
        let v = throw_velocity(Vec3::new(0.0, 0.0, -50.0), 20.0);
        assert!((v.length() - 20.0).abs() < 1e-4);
        assert_eq!(throw_velocity(Vec3::X, 20.0), Vec3::X);
    }
}
