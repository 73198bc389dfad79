use crate::deformation::{impact_target, ImpactCueGate, LastVelocity, Squish};
use crate::ecs::physics::RapierState;
use crate::ecs::types::*;
use crate::events::{EventBus, PlaygroundEvent};
use crate::interaction::InteractionState;
use bevy_ecs::prelude::*;
use bevy_ecs::system::{Res, ResMut};

pub fn sys_deform_and_cue(
    clock: Res<FrameClock>,
    tuning: Res<Tuning>,
    interaction: Res<InteractionState>,
    rapier: Res<RapierState>,
    mut events: ResMut<EventBus>,
    mut q: Query<(Entity, &RapierBody, &mut Squish, &mut LastVelocity, &mut ImpactCueGate)>,
) {
    let cfg = &tuning.deformation;
    let dragged = interaction.dragged_entity();
    for (entity, body, mut squish, mut last, mut gate) in &mut q {
        let Some(velocity) = rapier.linear_velocity(body.body) else {
            continue;
        };
        let change = velocity - last.0;
        let magnitude = change.length();
        // The drag stretch owns the target while held.
        if dragged != Some(entity) {
            if let Some(target) = impact_target(change, cfg) {
                squish.target = target;
            }
        }
        if gate.try_fire(magnitude, clock.now, cfg) {
            events.push(PlaygroundEvent::ImpactCue { entity, magnitude });
        }
        squish.relax(cfg);
        last.0 = velocity;
    }
}
