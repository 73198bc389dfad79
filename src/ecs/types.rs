use crate::config::{DeformationConfig, DragConfig, GravityGunConfig, PlaygroundConfig};
use crate::renderer::RenderId;
use crate::shapes::{PickVolume, ShapeKind};
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
use std::time::Duration;

// ---------- Components ----------

#[derive(Component, Clone, Copy, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub half_extent: f32,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct RapierBody {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct RenderLink(pub RenderId);

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn at(translation: Vec3) -> Self {
        Self { translation, rotation: Quat::IDENTITY }
    }
}

#[derive(Component, Clone, Copy, Debug)]
pub struct PickShape(pub PickVolume);

// ---------- Resources ----------

#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct FrameClock {
    pub now: Duration,
    pub dt: f32,
}

/// Live entities in spawn order.
#[derive(Resource, Debug, Default)]
pub struct EntityRegistry {
    order: Vec<Entity>,
}

impl EntityRegistry {
    pub fn register(&mut self, entity: Entity) {
        self.order.push(entity);
    }

    pub fn deregister(&mut self, entity: Entity) -> bool {
        match self.order.iter().position(|e| *e == entity) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.order.contains(&entity)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Entity> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Per-tick tuning read by the systems.
#[derive(Resource, Clone, Debug)]
pub struct Tuning {
    pub drag: DragConfig,
    pub gravity_gun: GravityGunConfig,
    pub deformation: DeformationConfig,
    pub cull_height: f32,
}

impl From<&PlaygroundConfig> for Tuning {
    fn from(config: &PlaygroundConfig) -> Self {
        Self {
            drag: config.drag.clone(),
            gravity_gun: config.gravity_gun.clone(),
            deformation: config.deformation.clone(),
            cull_height: config.physics.cull_height,
        }
    }
}

/// Snapshot of one entity for callers outside the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub kind: ShapeKind,
    pub render: RenderId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub squish: Vec3,
    pub squish_target: Vec3,
    pub orbit: Option<crate::forces::OrbitSlot>,
}
