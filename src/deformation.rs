use crate::config::DeformationConfig;
use bevy_ecs::prelude::Component;
use glam::Vec3;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquishAxis {
    X,
    Y,
    Z,
}

impl SquishAxis {
    /// Dominant axis of `direction`: Y when the normalized y exceeds 0.5, otherwise the larger
    /// of X and Z.
    pub fn dominant(direction: Vec3) -> Self {
        let n = direction.normalize_or_zero();
        if n.y.abs() > 0.5 {
            SquishAxis::Y
        } else if n.x.abs() > n.z.abs() {
            SquishAxis::X
        } else {
            SquishAxis::Z
        }
    }

    fn scale(self, on_axis: f32, off_axis: f32) -> Vec3 {
        match self {
            SquishAxis::X => Vec3::new(on_axis, off_axis, off_axis),
            SquishAxis::Y => Vec3::new(off_axis, on_axis, off_axis),
            SquishAxis::Z => Vec3::new(off_axis, off_axis, on_axis),
        }
    }
}

/// Cosmetic scale of an entity. `current` chases `target`, and `target` relaxes to identity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Squish {
    pub current: Vec3,
    pub target: Vec3,
}

impl Default for Squish {
    fn default() -> Self {
        Self { current: Vec3::ONE, target: Vec3::ONE }
    }
}

impl Squish {
    pub fn relax(&mut self, cfg: &DeformationConfig) {
        self.current = self.current.lerp(self.target, cfg.approach_rate);
        self.target = self.target.lerp(Vec3::ONE, cfg.relax_rate);
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        (self.current - Vec3::ONE).abs().max_element() <= epsilon
            && (self.target - Vec3::ONE).abs().max_element() <= epsilon
    }
}

/// Flattening along the axis of a sudden velocity change, bulging on the other two.
pub fn impact_target(change: Vec3, cfg: &DeformationConfig) -> Option<Vec3> {
    let magnitude = change.length();
    if magnitude <= cfg.impact_threshold {
        return None;
    }
    let amount = (magnitude * cfg.impact_factor).min(cfg.impact_cap);
    Some(SquishAxis::dominant(change).scale(1.0 - amount, 1.0 + amount * 0.5))
}

/// Stretch along the drag direction, thinning on the other two.
pub fn drag_target(drag_velocity: Vec3, cfg: &DeformationConfig) -> Option<Vec3> {
    let speed = drag_velocity.length();
    if speed <= cfg.drag_threshold {
        return None;
    }
    let amount = (speed * cfg.drag_factor).min(cfg.drag_cap);
    Some(SquishAxis::dominant(drag_velocity).scale(1.0 + amount, 1.0 - amount * 0.4))
}

/// Per-entity gate for impact sound cues.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ImpactCueGate {
    last: Option<Duration>,
}

impl ImpactCueGate {
    pub fn try_fire(&mut self, magnitude: f32, now: Duration, cfg: &DeformationConfig) -> bool {
        if magnitude <= cfg.cue_threshold {
            return false;
        }
        let cooled = match self.last {
            None => true,
            Some(last) => now.saturating_sub(last) > Duration::from_millis(cfg.cue_cooldown_ms),
        };
        if cooled {
            self.last = Some(now);
        }
        cooled
    }

    pub fn last_cue(&self) -> Option<Duration> {
        self.last
    }
}

/// Velocity observed on the previous tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LastVelocity(pub Vec3);
