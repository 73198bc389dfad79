use crate::config::PhysicsConfig;
use crate::shapes::{ColliderGeometry, ShapeDescriptor};
use anyhow::{anyhow, Result};
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point, Real,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};

/// Owns the rapier3d world. Callers address bodies by handle only; solver internals stay here.
#[derive(Resource)]
pub struct RapierState {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl RapierState {
    pub fn new(params: &PhysicsConfig) -> Self {
        let mut colliders = ColliderSet::new();
        let [hx, hy, hz] = params.ground_half_extents;
        colliders.insert(ColliderBuilder::cuboid(hx, hy, hz).build());
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vec_to_rapier(params.gravity_vec()),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    pub fn spawn_body(
        &mut self,
        descriptor: &ShapeDescriptor,
        position: Vec3,
    ) -> Result<(RigidBodyHandle, ColliderHandle)> {
        let builder = match &descriptor.collider {
            ColliderGeometry::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderGeometry::Ball { radius } => ColliderBuilder::ball(*radius),
            ColliderGeometry::Capsule { half_height, radius } => ColliderBuilder::capsule_y(*half_height, *radius),
            ColliderGeometry::ConvexHull { points } => {
                let points: Vec<Point<Real>> = points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
                ColliderBuilder::convex_hull(&points)
                    .ok_or_else(|| anyhow!("Degenerate convex hull for {} collider", descriptor.kind.label()))?
            }
        };
        let collider = builder
            .restitution(descriptor.contact.restitution)
            .friction(descriptor.contact.friction)
            .density(descriptor.contact.density)
            .build();
        let body = RigidBodyBuilder::dynamic()
            .translation(vec_to_rapier(position))
            .linear_damping(descriptor.damping.linear)
            .angular_damping(descriptor.damping.angular)
            .build();
        let body_handle = self.bodies.insert(body);
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        Ok((body_handle, collider_handle))
    }

    /// Removes a body with its colliders. Returns false when the handle is already gone.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let hooks = ();
        let events = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &hooks,
            &events,
        );
    }

    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec_from_rapier(body.translation()))
    }

    pub fn rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.bodies.get(handle).map(|body| {
            let q = body.rotation();
            Quat::from_xyzw(q.i, q.j, q.k, q.w)
        })
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec_from_rapier(body.linvel()))
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec_from_rapier(body.angvel()))
    }

    pub fn mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.bodies.get(handle).map(|body| body.mass())
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vec_to_rapier(velocity), true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_angvel(vec_to_rapier(velocity), true);
        }
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(vec_to_rapier(impulse), true);
        }
    }

    pub fn set_translation(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vec_to_rapier(position), true);
        }
    }

    pub fn dynamic_body_count(&self) -> usize {
        self.bodies.iter().filter(|(_, body)| body.is_dynamic()).count()
    }
}

fn vec_to_rapier(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn vec_from_rapier(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    #[test]
    fn every_shape_kind_builds_a_body_with_mass() {
        let mut rapier = RapierState::new(&PhysicsConfig::default());
        for kind in ShapeKind::ALL {
            let descriptor = kind.descriptor(0x44aa88);
            let (body, _) = rapier.spawn_body(&descriptor, Vec3::new(0.0, 3.0, 0.0)).expect("body spawns");
            let mass = rapier.mass(body).expect("mass");
            assert!(mass > 0.0, "{} should have positive mass", kind.label());
        }
        assert_eq!(rapier.dynamic_body_count(), 4);
    }

    #[test]
    fn bodies_fall_under_gravity_and_land_on_ground() {
        let mut rapier = RapierState::new(&PhysicsConfig::default());
        let descriptor = ShapeKind::Cube.descriptor(0xffffff);
        let (body, _) = rapier.spawn_body(&descriptor, Vec3::new(0.0, 3.0, 0.0)).expect("body spawns");
        for _ in 0..10 {
            rapier.step(1.0 / 60.0);
        }
        let y = rapier.translation(body).expect("translation").y;
        assert!(y < 3.0, "cube should start falling");
        for _ in 0..600 {
            rapier.step(1.0 / 60.0);
        }
        let y = rapier.translation(body).expect("translation").y;
        assert!(y > 0.3 && y < 0.8, "cube should rest on the ground slab, got {y}");
    }

    #[test]
    fn removing_twice_reports_missing_body() {
        let mut rapier = RapierState::new(&PhysicsConfig::default());
        let descriptor = ShapeKind::Sphere.descriptor(0xffffff);
        let (body, _) = rapier.spawn_body(&descriptor, Vec3::Y).expect("body spawns");
        assert!(rapier.remove_body(body));
        assert!(!rapier.remove_body(body));
        assert!(rapier.translation(body).is_none());
    }
}
