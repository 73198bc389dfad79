use crate::ecs::physics::RapierState;
use crate::ecs::types::*;
use crate::events::{EventBus, PlaygroundEvent};
use crate::interaction::InteractionState;
use bevy_ecs::prelude::*;
use bevy_ecs::system::{Commands, Res, ResMut};
use smallvec::SmallVec;

pub fn sys_step_rapier(mut rapier: ResMut<RapierState>, clock: Res<FrameClock>) {
    if clock.dt > 0.0 {
        rapier.step(clock.dt);
    }
}

/// Destroys entities that fell below the cull height. Each one is removed from physics, the
/// registry and the world in the same tick, so it is culled exactly once.
pub fn sys_cull_fallen(
    mut commands: Commands,
    mut rapier: ResMut<RapierState>,
    mut registry: ResMut<EntityRegistry>,
    mut interaction: ResMut<InteractionState>,
    mut events: ResMut<EventBus>,
    tuning: Res<Tuning>,
    q: Query<(Entity, &RapierBody, &RenderLink)>,
) {
    let mut fallen: SmallVec<[(Entity, RapierBody, RenderLink); 8]> = SmallVec::new();
    for (entity, body, link) in &q {
        let Some(position) = rapier.translation(body.body) else {
            continue;
        };
        if position.y < tuning.cull_height {
            fallen.push((entity, *body, *link));
        }
    }
    for (entity, body, link) in fallen {
        if interaction.dragged_entity() == Some(entity) {
            events.push(PlaygroundEvent::DragCancelled { entity });
        }
        interaction.forget_entity(entity);
        rapier.remove_body(body.body);
        registry.deregister(entity);
        commands.entity(entity).despawn();
        events.push(PlaygroundEvent::EntityCulled { entity, render: link.0 });
    }
}

pub fn sys_sync_poses(rapier: Res<RapierState>, mut q: Query<(&RapierBody, &mut Pose)>) {
    for (body, mut pose) in &mut q {
        let (Some(translation), Some(rotation)) = (rapier.translation(body.body), rapier.rotation(body.body)) else {
            continue;
        };
        pose.translation = translation;
        pose.rotation = rotation;
    }
}
