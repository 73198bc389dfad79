use crate::deformation::{drag_target, Squish};
use crate::ecs::physics::RapierState;
use crate::ecs::types::*;
use crate::forces::{drag_velocity, orbit_impulse, orbit_spin, orbit_target, within_orbit_range, OrbitSlot};
use crate::interaction::InteractionState;
use bevy_ecs::prelude::*;
use bevy_ecs::system::{Res, ResMut};
use glam::Vec3;

/// Pulls in-range entities onto the gravity-gun ring. Out-of-range entities are only marked.
pub fn sys_gravity_gun_orbit(
    interaction: Res<InteractionState>,
    clock: Res<FrameClock>,
    tuning: Res<Tuning>,
    mut rapier: ResMut<RapierState>,
    mut q: Query<(&RapierBody, &Shape, &mut OrbitSlot)>,
) {
    let Some(gun) = interaction.gravity_gun().copied() else {
        return;
    };
    let cfg = &tuning.gravity_gun;
    let elapsed = clock.now.saturating_sub(gun.engaged_at).as_secs_f32();
    for (body, shape, mut slot) in &mut q {
        let Some(position) = rapier.translation(body.body) else {
            continue;
        };
        slot.in_range = within_orbit_range(position, gun.anchor, cfg.range);
        if !slot.in_range {
            continue;
        }
        let target = orbit_target(gun.anchor, elapsed, &slot, shape.half_extent, cfg);
        let velocity = rapier.linear_velocity(body.body).unwrap_or(Vec3::ZERO);
        let mass = rapier.mass(body.body).unwrap_or(1.0);
        rapier.apply_impulse(body.body, orbit_impulse(target, position, velocity, mass, cfg));
        rapier.set_angular_velocity(body.body, orbit_spin(cfg, slot.direction));
    }
}

/// Spring toward the drag point. The dragged entity does not spin.
pub fn sys_drag_follow(
    interaction: Res<InteractionState>,
    tuning: Res<Tuning>,
    mut rapier: ResMut<RapierState>,
    mut q: Query<(&RapierBody, &mut Squish)>,
) {
    let Some(drag) = interaction.drag().copied() else {
        return;
    };
    let Ok((body, mut squish)) = q.get_mut(drag.entity) else {
        return;
    };
    let Some(position) = rapier.translation(body.body) else {
        return;
    };
    let velocity = drag_velocity(drag.current_point, position, tuning.drag.gain);
    if let Some(target) = drag_target(velocity, &tuning.deformation) {
        squish.target = target;
    }
    rapier.set_linear_velocity(body.body, velocity);
    rapier.set_angular_velocity(body.body, Vec3::ZERO);
}
