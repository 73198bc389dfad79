mod physics;
pub mod systems;
mod types;

pub use physics::RapierState;
pub use types::*;

use crate::config::PlaygroundConfig;
use crate::deformation::{ImpactCueGate, LastVelocity, Squish};
use crate::events::{EventBus, PlaygroundEvent};
use crate::forces::{within_orbit_range, OrbitDirection, OrbitSlot};
use crate::interaction::InteractionState;
use crate::renderer::{NodeTransform, RenderId};
use crate::shapes::ShapeDescriptor;
use anyhow::Result;
use bevy_ecs::prelude::{Entity, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use glam::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;
use std::time::Duration;
use systems::{
    ray_hit_volume, sys_cull_fallen, sys_deform_and_cue, sys_drag_follow, sys_gravity_gun_orbit, sys_step_rapier,
    sys_sync_poses, Ray,
};

/// Entity world for the playground: components, resources and the two per-frame schedules.
pub struct EcsWorld {
    pub world: World,
    schedule_physics: Schedule,
    schedule_frame: Schedule,
}

impl EcsWorld {
    pub fn new(config: &PlaygroundConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(FrameClock::default());
        world.insert_resource(Tuning::from(config));
        world.insert_resource(EntityRegistry::default());
        world.insert_resource(EventBus::default());
        world.insert_resource(RapierState::new(&config.physics));
        world.insert_resource(InteractionState::new(&config.drag));

        let mut schedule_physics = Schedule::default();
        schedule_physics.add_systems(sys_step_rapier);

        let mut schedule_frame = Schedule::default();
        schedule_frame.add_systems(
            (sys_gravity_gun_orbit, sys_drag_follow, sys_cull_fallen, sys_sync_poses, sys_deform_and_cue).chain(),
        );

        Self { world, schedule_physics, schedule_frame }
    }

    pub fn set_clock(&mut self, now: Duration, dt: f32) {
        let mut clock = self.world.resource_mut::<FrameClock>();
        clock.now = now;
        clock.dt = dt;
    }

    pub fn step_physics(&mut self) {
        self.schedule_physics.run(&mut self.world);
    }

    /// Forces, culling, pose sync and deformation, in that order.
    pub fn run_frame(&mut self) {
        self.schedule_frame.run(&mut self.world);
    }

    pub fn interaction(&self) -> &InteractionState {
        self.world.resource::<InteractionState>()
    }

    pub fn interaction_mut(&mut self) -> bevy_ecs::prelude::Mut<'_, InteractionState> {
        self.world.resource_mut::<InteractionState>()
    }

    pub fn rapier(&self) -> &RapierState {
        self.world.resource::<RapierState>()
    }

    pub fn push_event(&mut self, event: PlaygroundEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn drain_events(&mut self) -> Vec<PlaygroundEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }

    pub fn entity_count(&self) -> usize {
        self.world.resource::<EntityRegistry>().len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.resource::<EntityRegistry>().contains(entity)
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.world.resource::<EntityRegistry>().iter().copied().collect()
    }

    /// Creates the physics body and the entity for an already created render node.
    pub fn spawn_shape(&mut self, descriptor: &ShapeDescriptor, position: Vec3, render: RenderId) -> Result<Entity> {
        let (body, collider) = self.world.resource_mut::<RapierState>().spawn_body(descriptor, position)?;
        let entity = self
            .world
            .spawn((
                Shape { kind: descriptor.kind, half_extent: descriptor.half_extent },
                RapierBody { body, collider },
                RenderLink(render),
                Pose::at(position),
                PickShape(descriptor.render.pick_volume()),
                Squish::default(),
                LastVelocity::default(),
                ImpactCueGate::default(),
                OrbitSlot::new(0.0, OrbitDirection::CounterClockwise),
            ))
            .id();
        self.world.resource_mut::<EntityRegistry>().register(entity);
        self.push_event(PlaygroundEvent::EntitySpawned { entity, kind: descriptor.kind });
        Ok(entity)
    }

    /// Destroys a live entity. Returns its render node, or None when the entity is already gone.
    pub fn despawn_shape(&mut self, entity: Entity) -> Option<RenderId> {
        if !self.world.resource_mut::<EntityRegistry>().deregister(entity) {
            return None;
        }
        let body = self.world.get::<RapierBody>(entity).copied();
        let render = self.world.get::<RenderLink>(entity).map(|link| link.0);
        if let Some(body) = body {
            self.world.resource_mut::<RapierState>().remove_body(body.body);
        }
        let was_dragged = {
            let mut interaction = self.world.resource_mut::<InteractionState>();
            let was_dragged = interaction.dragged_entity() == Some(entity);
            interaction.forget_entity(entity);
            was_dragged
        };
        if was_dragged {
            self.push_event(PlaygroundEvent::DragCancelled { entity });
        }
        self.world.despawn(entity);
        let render = render?;
        self.push_event(PlaygroundEvent::EntityRemoved { entity, render });
        Some(render)
    }

    /// Nearest entity under `ray` with the world-space hit point.
    pub fn pick(&mut self, ray: &Ray) -> Option<(Entity, Vec3)> {
        if ray.dir.length_squared() <= f32::EPSILON {
            return None;
        }
        let mut query = self.world.query::<(Entity, &Pose, &Squish, &PickShape)>();
        let mut closest: Option<(Entity, f32)> = None;
        for (entity, pose, squish, pick) in query.iter(&self.world) {
            let Some(distance) = ray_hit_volume(ray, &pick.0, pose.translation, pose.rotation, squish.current) else {
                continue;
            };
            match closest {
                Some((_, best)) if best <= distance => {}
                _ => closest = Some((entity, distance)),
            }
        }
        closest.map(|(entity, distance)| (entity, ray.at(distance)))
    }

    /// Assigns orbit slots around `anchor` to every live entity and stops them. Returns how many
    /// start inside the gravity-gun range.
    pub fn capture_for_orbit(&mut self, anchor: Vec3, range: f32, rng: &mut impl Rng) -> usize {
        let entities = self.entities();
        let mut captured = 0;
        for (index, entity) in entities.into_iter().enumerate() {
            let Some(body) = self.world.get::<RapierBody>(entity).copied() else {
                continue;
            };
            let in_range = {
                let mut rapier = self.world.resource_mut::<RapierState>();
                rapier.set_linear_velocity(body.body, Vec3::ZERO);
                rapier.set_angular_velocity(body.body, Vec3::ZERO);
                let position = rapier.translation(body.body);
                position.map(|position| within_orbit_range(position, anchor, range)).unwrap_or(false)
            };
            let mut slot = OrbitSlot::new(rng.gen_range(0.0..TAU), OrbitDirection::for_index(index));
            slot.in_range = in_range;
            if in_range {
                captured += 1;
            }
            self.world.entity_mut(entity).insert(slot);
        }
        captured
    }

    pub fn translation(&self, entity: Entity) -> Option<Vec3> {
        let body = self.world.get::<RapierBody>(entity)?;
        self.rapier().translation(body.body)
    }

    pub fn set_linear_velocity(&mut self, entity: Entity, velocity: Vec3) -> bool {
        let Some(body) = self.world.get::<RapierBody>(entity).copied() else {
            return false;
        };
        self.world.resource_mut::<RapierState>().set_linear_velocity(body.body, velocity);
        true
    }

    pub fn apply_impulse(&mut self, entity: Entity, impulse: Vec3) -> bool {
        let Some(body) = self.world.get::<RapierBody>(entity).copied() else {
            return false;
        };
        self.world.resource_mut::<RapierState>().apply_impulse(body.body, impulse);
        true
    }

    /// Moves an entity without simulating the path, keeping its pose in sync.
    pub fn teleport(&mut self, entity: Entity, position: Vec3) -> bool {
        let Some(body) = self.world.get::<RapierBody>(entity).copied() else {
            return false;
        };
        self.world.resource_mut::<RapierState>().set_translation(body.body, position);
        if let Some(mut pose) = self.world.get_mut::<Pose>(entity) {
            pose.translation = position;
        }
        true
    }

    pub fn entity_info(&self, entity: Entity) -> Option<EntityInfo> {
        let shape = self.world.get::<Shape>(entity)?;
        let body = self.world.get::<RapierBody>(entity)?;
        let render = self.world.get::<RenderLink>(entity)?;
        let squish = self.world.get::<Squish>(entity).copied().unwrap_or_default();
        let rapier = self.rapier();
        Some(EntityInfo {
            kind: shape.kind,
            render: render.0,
            translation: rapier.translation(body.body)?,
            rotation: rapier.rotation(body.body).unwrap_or(Quat::IDENTITY),
            linear_velocity: rapier.linear_velocity(body.body).unwrap_or(Vec3::ZERO),
            angular_velocity: rapier.angular_velocity(body.body).unwrap_or(Vec3::ZERO),
            squish: squish.current,
            squish_target: squish.target,
            orbit: self.world.get::<OrbitSlot>(entity).copied(),
        })
    }

    /// Overrides the cosmetic scale of an entity, e.g. to seed a deformation.
    pub fn set_squish(&mut self, entity: Entity, squish: Squish) -> bool {
        match self.world.get_mut::<Squish>(entity) {
            Some(mut current) => {
                *current = squish;
                true
            }
            None => false,
        }
    }

    /// Render-side transform of every entity: physics pose with the cosmetic scale.
    pub fn render_transforms(&mut self) -> Vec<(RenderId, NodeTransform)> {
        let mut query = self.world.query::<(&RenderLink, &Pose, &Squish)>();
        query
            .iter(&self.world)
            .map(|(link, pose, squish)| {
                let transform =
                    NodeTransform { translation: pose.translation, rotation: pose.rotation, scale: squish.current };
                (link.0, transform)
            })
            .collect()
    }
}
