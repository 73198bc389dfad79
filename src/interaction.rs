use crate::config::DragConfig;
use crate::ecs::systems::{intersect_ray_plane, Plane, Ray};
use crate::forces::throw_velocity;
use crate::timer::Timer;
use bevy_ecs::prelude::{Entity, Resource};
use glam::{Vec2, Vec3};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub entity: Entity,
    pub plane: Plane,
    pub current_point: Vec3,
    pub previous_point: Vec3,
    pub last_sample: Duration,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityGunState {
    pub anchor: Vec3,
    pub engaged_at: Duration,
}

/// Touch press on an entity waiting for the hold delay before it becomes a drag.
/// `last_px` is the latest finger position inside the move tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDrag {
    pub entity: Entity,
    pub hit: Vec3,
    pub start_px: Vec2,
    pub last_px: Vec2,
}

impl PendingDrag {
    pub fn new(entity: Entity, hit: Vec3, position_px: Vec2) -> Self {
        Self { entity, hit, start_px: position_px, last_px: position_px }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    Idle,
    /// Pointer is down but belongs to the camera controller.
    CameraOrbit,
    /// Payload lives in the hold timer.
    PendingDrag,
    Dragging(DragState),
    GravityGun(GravityGunState),
}

impl InteractionMode {
    pub fn label(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::CameraOrbit => "camera-orbit",
            InteractionMode::PendingDrag => "pending-drag",
            InteractionMode::Dragging(_) => "dragging",
            InteractionMode::GravityGun(_) => "gravity-gun",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReleaseOutcome {
    pub gravity_gun_released: bool,
    pub pending_cancelled: bool,
    pub thrown: Option<(Entity, Vec3)>,
}

/// Pointer interaction state for one playground session. Every transition goes through a
/// method here; the mode never holds a drag and a gravity gun at once.
#[derive(Resource)]
pub struct InteractionState {
    mode: InteractionMode,
    gravity_gun_enabled: bool,
    hold_timer: Timer<PendingDrag>,
    hold_delay: Duration,
    move_tolerance_px: f32,
    max_throw_speed: f32,
}

impl InteractionState {
    pub fn new(drag: &DragConfig) -> Self {
        Self {
            mode: InteractionMode::Idle,
            gravity_gun_enabled: false,
            hold_timer: Timer::new(),
            hold_delay: Duration::from_millis(drag.hold_delay_ms),
            move_tolerance_px: drag.move_tolerance_px,
            max_throw_speed: drag.max_throw_speed,
        }
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn drag(&self) -> Option<&DragState> {
        match &self.mode {
            InteractionMode::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn dragged_entity(&self) -> Option<Entity> {
        self.drag().map(|drag| drag.entity)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag().is_some()
    }

    pub fn gravity_gun(&self) -> Option<&GravityGunState> {
        match &self.mode {
            InteractionMode::GravityGun(gun) => Some(gun),
            _ => None,
        }
    }

    pub fn gravity_gun_active(&self) -> bool {
        self.gravity_gun().is_some()
    }

    pub fn gravity_gun_enabled(&self) -> bool {
        self.gravity_gun_enabled
    }

    pub fn pending_drag(&self) -> Option<&PendingDrag> {
        self.hold_timer.payload()
    }

    pub fn hold_deadline(&self) -> Option<Duration> {
        self.hold_timer.deadline()
    }

    /// Camera orbit is allowed whenever no entity manipulation holds the pointer.
    pub fn orbit_enabled(&self) -> bool {
        !self.is_dragging() && !self.gravity_gun_active()
    }

    /// Returns true when an active gravity gun was switched off with the flag.
    pub fn set_gravity_gun_enabled(&mut self, enabled: bool) -> bool {
        self.gravity_gun_enabled = enabled;
        if !enabled {
            return self.deactivate_gravity_gun();
        }
        false
    }

    pub fn toggle_gravity_gun(&mut self) -> bool {
        self.set_gravity_gun_enabled(!self.gravity_gun_enabled)
    }

    /// Enters gravity-gun mode. Returns the entity of a drag that had to be cancelled.
    pub fn engage_gravity_gun(&mut self, anchor: Vec3, now: Duration) -> Option<Entity> {
        self.hold_timer.cancel();
        let cancelled = self.dragged_entity();
        self.mode = InteractionMode::GravityGun(GravityGunState { anchor, engaged_at: now });
        cancelled
    }

    pub fn move_anchor(&mut self, anchor: Vec3) {
        if let InteractionMode::GravityGun(gun) = &mut self.mode {
            gun.anchor = anchor;
        }
    }

    pub fn deactivate_gravity_gun(&mut self) -> bool {
        if self.gravity_gun_active() {
            self.mode = InteractionMode::Idle;
            return true;
        }
        false
    }

    /// Starts dragging `entity`. The drag plane passes through `hit` facing the camera.
    pub fn begin_drag(&mut self, entity: Entity, hit: Vec3, ray: &Ray, camera_forward: Vec3, now: Duration) {
        self.hold_timer.cancel();
        let plane = Plane::from_normal_and_point(camera_forward, hit);
        let point = intersect_ray_plane(ray, &plane).unwrap_or(hit);
        self.mode = InteractionMode::Dragging(DragState {
            entity,
            plane,
            current_point: point,
            previous_point: point,
            last_sample: now,
            velocity: Vec3::ZERO,
        });
    }

    pub fn begin_pending_drag(&mut self, pending: PendingDrag, now: Duration) {
        self.hold_timer.schedule(now, self.hold_delay, pending);
        self.mode = InteractionMode::PendingDrag;
    }

    /// Pointer went down on empty space; the gesture belongs to the camera.
    pub fn cede_to_camera(&mut self) {
        self.hold_timer.cancel();
        if !self.gravity_gun_active() && !self.is_dragging() {
            self.mode = InteractionMode::CameraOrbit;
        }
    }

    /// Mouse went down on empty space. The primary button has no camera role, so nothing
    /// claims the pointer.
    pub fn leave_unclaimed(&mut self) {
        self.hold_timer.cancel();
        if !self.gravity_gun_active() && !self.is_dragging() {
            self.mode = InteractionMode::Idle;
        }
    }

    /// Touch moved during the hold delay. Past the tolerance the pending drag is dropped and
    /// the gesture is handed to the camera. Returns true when that happened.
    pub fn track_pending_touch(&mut self, position_px: Vec2) -> bool {
        let tolerance = self.move_tolerance_px;
        let Some(pending) = self.hold_timer.payload_mut() else {
            return false;
        };
        if pending.start_px.distance(position_px) > tolerance {
            self.hold_timer.cancel();
            self.mode = InteractionMode::CameraOrbit;
            return true;
        }
        pending.last_px = position_px;
        false
    }

    /// A second finger arrived; a waiting pending drag is dropped.
    pub fn cancel_pending(&mut self) -> bool {
        if self.hold_timer.cancel().is_some() {
            self.mode = InteractionMode::CameraOrbit;
            return true;
        }
        false
    }

    /// Takes the pending drag once its hold delay elapsed. The mode falls back to camera orbit
    /// until the caller promotes the payload with `begin_drag`.
    pub fn poll_hold_timer(&mut self, now: Duration) -> Option<PendingDrag> {
        let pending = self.hold_timer.poll(now)?;
        self.mode = InteractionMode::CameraOrbit;
        Some(pending)
    }

    /// Re-samples the drag plane under the pointer. A miss leaves the drag point unchanged.
    pub fn sample_drag(&mut self, ray: &Ray, now: Duration) -> bool {
        let InteractionMode::Dragging(drag) = &mut self.mode else {
            return false;
        };
        let Some(hit) = intersect_ray_plane(ray, &drag.plane) else {
            return false;
        };
        drag.current_point = hit;
        let dt = now.saturating_sub(drag.last_sample).as_secs_f32();
        if dt > 0.0 {
            drag.velocity = (hit - drag.previous_point) / dt;
            drag.previous_point = hit;
            drag.last_sample = now;
        }
        true
    }

    /// Ends the current gesture and returns to idle.
    pub fn release(&mut self) -> ReleaseOutcome {
        let pending_cancelled = self.hold_timer.cancel().is_some();
        let outcome = match self.mode {
            InteractionMode::GravityGun(_) => {
                ReleaseOutcome { gravity_gun_released: true, pending_cancelled, thrown: None }
            }
            InteractionMode::Dragging(drag) => ReleaseOutcome {
                gravity_gun_released: false,
                pending_cancelled,
                thrown: Some((drag.entity, throw_velocity(drag.velocity, self.max_throw_speed))),
            },
            _ => ReleaseOutcome { pending_cancelled, ..ReleaseOutcome::default() },
        };
        self.mode = InteractionMode::Idle;
        outcome
    }

    /// Drops a drag without throwing. Returns the entity that was held.
    pub fn cancel_drag(&mut self) -> Option<Entity> {
        let entity = self.dragged_entity()?;
        self.mode = InteractionMode::Idle;
        Some(entity)
    }

    /// Forgets every reference to `entity`; used when it leaves the world.
    pub fn forget_entity(&mut self, entity: Entity) -> bool {
        let pending = self.hold_timer.payload().map(|p| p.entity == entity).unwrap_or(false);
        if pending {
            self.hold_timer.cancel();
            self.mode = InteractionMode::CameraOrbit;
            return true;
        }
        if self.dragged_entity() == Some(entity) {
            self.mode = InteractionMode::Idle;
            return true;
        }
        false
    }
}
