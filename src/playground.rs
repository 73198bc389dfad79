use crate::audio::AudioManager;
use crate::camera3d::{Camera3D, OrbitCamera};
use crate::config::PlaygroundConfig;
use crate::ecs::systems::{intersect_ray_plane, Plane, Ray};
use crate::ecs::{EcsWorld, EntityInfo};
use crate::events::PlaygroundEvent;
use crate::forces::blast_impulse;
use crate::input::{InputEvent, PlaygroundCommand, PointerButton, PointerEvent, PointerKind};
use crate::interaction::{InteractionMode, InteractionState, PendingDrag};
use crate::renderer::SceneRenderer;
use crate::shapes::{random_color, random_spawn_point, ShapeKind};
use crate::timer::Timer;
use anyhow::Result;
use bevy_ecs::prelude::Entity;
use bitflags::bitflags;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use winit::dpi::PhysicalSize;

const EVENT_LOG_CAPACITY: usize = 64;

/// Camera gesture owned by a non-primary mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraGesture {
    Rotate,
    Pan,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u8 {
        const GRAVITY_GUN = 0b0000_0001;
        const GRABBED = 0b0000_0010;
    }
}

/// One playground session: the entity world, pointer interaction, camera, timers, renderer
/// and audio. Input handlers mutate state immediately; `frame` advances the simulation.
pub struct Playground {
    ecs: EcsWorld,
    camera: OrbitCamera,
    viewport: PhysicalSize<u32>,
    renderer: Box<dyn SceneRenderer>,
    audio: AudioManager,
    config: PlaygroundConfig,
    rng: StdRng,
    blast_cleanup: Timer<Vec<Entity>>,
    last_pointer: Option<Vec2>,
    camera_gesture: Option<CameraGesture>,
    frame_index: u64,
    status: String,
    event_log: VecDeque<PlaygroundEvent>,
}

impl Playground {
    pub fn new(config: PlaygroundConfig, renderer: Box<dyn SceneRenderer>, audio: AudioManager, seed: u64) -> Self {
        let viewport = PhysicalSize::new(config.window.width, config.window.height);
        let mut playground = Self {
            ecs: EcsWorld::new(&config),
            camera: OrbitCamera::from_config(&config.camera),
            viewport,
            renderer,
            audio,
            config,
            rng: StdRng::seed_from_u64(seed),
            blast_cleanup: Timer::new(),
            last_pointer: None,
            camera_gesture: None,
            frame_index: 0,
            status: String::new(),
            event_log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        };
        playground.refresh_status();
        playground
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut EcsWorld {
        &mut self.ecs
    }

    pub fn interaction(&self) -> &InteractionState {
        self.ecs.interaction()
    }

    pub fn mode(&self) -> InteractionMode {
        *self.ecs.interaction().mode()
    }

    pub fn orbit_camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera(&self) -> Camera3D {
        self.camera.to_camera()
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = PhysicalSize::new(width, height);
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn entity_count(&self) -> usize {
        self.ecs.entity_count()
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.ecs.entities()
    }

    pub fn entity_info(&self, entity: Entity) -> Option<EntityInfo> {
        self.ecs.entity_info(entity)
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn status_line(&self) -> &str {
        &self.status
    }

    pub fn recent_events(&self) -> impl ExactSizeIterator<Item = &PlaygroundEvent> {
        self.event_log.iter()
    }

    pub fn blast_pending(&self) -> bool {
        self.blast_cleanup.is_pending()
    }

    pub fn status_flags(&self) -> StatusFlags {
        let interaction = self.ecs.interaction();
        let mut flags = StatusFlags::empty();
        if interaction.gravity_gun_enabled() || interaction.gravity_gun_active() {
            flags |= StatusFlags::GRAVITY_GUN;
        }
        if interaction.is_dragging() {
            flags |= StatusFlags::GRABBED;
        }
        flags
    }

    // ---------- Commands ----------

    pub fn handle_input(&mut self, event: InputEvent, now: Duration) -> Result<()> {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer, now),
            InputEvent::Command(command) => self.apply_command(command, now)?,
            InputEvent::Resized { width, height } => self.resize(width, height),
        }
        Ok(())
    }

    pub fn apply_command(&mut self, command: PlaygroundCommand, now: Duration) -> Result<()> {
        self.fire_due_timers(now);
        match command {
            PlaygroundCommand::Spawn(kind) => {
                self.spawn(kind)?;
            }
            PlaygroundCommand::Reset => {
                self.reset(now);
            }
            PlaygroundCommand::ToggleGravityGun => {
                self.toggle_gravity_gun();
            }
        }
        Ok(())
    }

    /// Spawns `kind` with a random colour somewhere above the middle of the ground.
    pub fn spawn(&mut self, kind: ShapeKind) -> Result<Entity> {
        let position = random_spawn_point(&mut self.rng);
        let color = random_color(&mut self.rng);
        self.spawn_at(kind, position, color)
    }

    pub fn spawn_at(&mut self, kind: ShapeKind, position: Vec3, color: u32) -> Result<Entity> {
        let descriptor = kind.descriptor(color);
        let render = self.renderer.add_node(&descriptor.render, &descriptor.material);
        match self.ecs.spawn_shape(&descriptor, position, render) {
            Ok(entity) => {
                log::debug!("[playground] spawned {} at {:?}", kind.label(), position);
                self.refresh_status();
                Ok(entity)
            }
            Err(err) => {
                self.renderer.remove_node(render);
                Err(err)
            }
        }
    }

    /// Flips the gravity-gun flag. Turning it off releases an engaged gravity gun.
    pub fn toggle_gravity_gun(&mut self) -> bool {
        let released = self.ecs.interaction_mut().toggle_gravity_gun();
        if released {
            self.ecs.push_event(PlaygroundEvent::GravityGunReleased);
        }
        self.sync_orbit_controls();
        self.refresh_status();
        self.ecs.interaction().gravity_gun_enabled()
    }

    pub fn set_gravity_gun_enabled(&mut self, enabled: bool) {
        if self.ecs.interaction().gravity_gun_enabled() != enabled {
            self.toggle_gravity_gun();
        }
    }

    /// Blasts every entity outward and schedules their removal. Returns how many entities
    /// were blasted; zero when the playground is empty.
    pub fn reset(&mut self, now: Duration) -> usize {
        self.fire_due_timers(now);
        if let Some(entity) = self.ecs.interaction_mut().cancel_drag() {
            self.ecs.push_event(PlaygroundEvent::DragCancelled { entity });
        }
        self.ecs.interaction_mut().cancel_pending();
        if self.ecs.interaction_mut().deactivate_gravity_gun() {
            self.ecs.push_event(PlaygroundEvent::GravityGunReleased);
        }
        self.sync_orbit_controls();
        self.refresh_status();

        let entities = self.ecs.entities();
        if entities.is_empty() {
            return 0;
        }
        for entity in &entities {
            let Some(position) = self.ecs.translation(*entity) else {
                continue;
            };
            let jitter = Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>());
            self.ecs.apply_impulse(*entity, blast_impulse(position, jitter, &self.config.blast));
        }
        let count = entities.len();
        let mut scheduled = entities;
        if let Some(previous) = self.blast_cleanup.cancel() {
            for entity in previous {
                if !scheduled.contains(&entity) {
                    scheduled.push(entity);
                }
            }
        }
        let delay = Duration::from_millis(self.config.blast.cleanup_delay_ms);
        self.blast_cleanup.schedule(now, delay, scheduled);
        self.ecs.push_event(PlaygroundEvent::BlastScheduled { count });
        log::info!("[playground] reset blasted {count} shapes");
        count
    }

    /// Engages the gravity gun around `anchor` as if the pointer had been pressed there.
    pub fn engage_gravity_gun_at(&mut self, anchor: Vec3, now: Duration) -> usize {
        if let Some(entity) = self.ecs.interaction_mut().engage_gravity_gun(anchor, now) {
            self.ecs.push_event(PlaygroundEvent::DragCancelled { entity });
        }
        let range = self.config.gravity_gun.range;
        let captured = self.ecs.capture_for_orbit(anchor, range, &mut self.rng);
        self.ecs.push_event(PlaygroundEvent::GravityGunEngaged { anchor, captured });
        self.sync_orbit_controls();
        self.refresh_status();
        captured
    }

    // ---------- Pointer ----------

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Duration) {
        self.fire_due_timers(now);
        match event {
            PointerEvent::Down { kind, button, position, touches } => {
                if kind == PointerKind::Mouse && button != PointerButton::Primary {
                    self.camera_gesture = match button {
                        PointerButton::Middle => Some(CameraGesture::Rotate),
                        PointerButton::Secondary => Some(CameraGesture::Pan),
                        _ => None,
                    };
                    self.last_pointer = Some(position);
                    return;
                }
                if kind == PointerKind::Touch && touches != 1 {
                    if self.ecs.interaction_mut().cancel_pending() {
                        log::debug!("[input] second touch cancelled pending drag");
                    }
                    self.last_pointer = None;
                    return;
                }
                self.last_pointer = Some(position);
                self.press(kind, position, now);
            }
            PointerEvent::Move { kind, position } => {
                let previous = self.last_pointer;
                self.pointer_moved(kind, position, previous, now);
                if previous.is_some() {
                    self.last_pointer = Some(position);
                }
            }
            PointerEvent::Up { kind, button, .. } => {
                self.last_pointer = None;
                if kind == PointerKind::Mouse && button != PointerButton::Primary {
                    self.camera_gesture = None;
                    return;
                }
                self.release();
            }
            PointerEvent::Cancel { .. } => {
                self.last_pointer = None;
                self.camera_gesture = None;
                self.release();
            }
            PointerEvent::Wheel { delta } => {
                self.camera.zoom(0.95_f32.powf(delta));
            }
            PointerEvent::Pinch { ratio } => {
                if ratio > f32::EPSILON {
                    self.camera.zoom(1.0 / ratio);
                }
            }
            PointerEvent::Pan { delta } => self.camera.pan_pixels(delta, self.viewport),
        }
    }

    fn press(&mut self, kind: PointerKind, position: Vec2, now: Duration) {
        let Some(ray) = self.pointer_ray(position) else {
            return;
        };
        if self.ecs.interaction().gravity_gun_enabled() {
            let anchor = self.ground_anchor(&ray);
            self.engage_gravity_gun_at(anchor, now);
            return;
        }
        match self.ecs.pick(&ray) {
            Some((entity, hit)) => match kind {
                PointerKind::Mouse => self.start_drag(entity, hit, &ray, now),
                PointerKind::Touch => {
                    let pending = PendingDrag::new(entity, hit, position);
                    self.ecs.interaction_mut().begin_pending_drag(pending, now);
                }
            },
            // The left mouse button has no camera role; a single finger rotates.
            None => match kind {
                PointerKind::Mouse => self.ecs.interaction_mut().leave_unclaimed(),
                PointerKind::Touch => self.ecs.interaction_mut().cede_to_camera(),
            },
        }
        self.sync_orbit_controls();
        self.refresh_status();
    }

    fn pointer_moved(&mut self, kind: PointerKind, position: Vec2, previous: Option<Vec2>, now: Duration) {
        match self.mode() {
            InteractionMode::GravityGun(_) => {
                let Some(ray) = self.pointer_ray(position) else {
                    return;
                };
                if let Some(hit) = intersect_ray_plane(&ray, &Plane::GROUND) {
                    self.ecs.interaction_mut().move_anchor(hit);
                }
            }
            InteractionMode::Dragging(_) => {
                if let Some(ray) = self.pointer_ray(position) {
                    self.ecs.interaction_mut().sample_drag(&ray, now);
                }
            }
            InteractionMode::PendingDrag => {
                if kind == PointerKind::Touch && self.ecs.interaction_mut().track_pending_touch(position) {
                    log::debug!("[input] touch moved past tolerance, pending drag cancelled");
                    self.sync_orbit_controls();
                }
            }
            InteractionMode::CameraOrbit => self.rotate_camera(position, previous),
            InteractionMode::Idle => match (self.camera_gesture, previous) {
                (Some(CameraGesture::Rotate), _) => self.rotate_camera(position, previous),
                (Some(CameraGesture::Pan), Some(previous)) => {
                    self.camera.pan_pixels(position - previous, self.viewport);
                }
                _ => {}
            },
        }
    }

    fn rotate_camera(&mut self, position: Vec2, previous: Option<Vec2>) {
        if let Some(previous) = previous {
            self.camera.orbit_pixels(position - previous, self.viewport);
        }
    }

    fn release(&mut self) {
        let outcome = self.ecs.interaction_mut().release();
        if outcome.gravity_gun_released {
            self.ecs.push_event(PlaygroundEvent::GravityGunReleased);
        }
        if let Some((entity, velocity)) = outcome.thrown {
            if self.ecs.set_linear_velocity(entity, velocity) {
                self.ecs.push_event(PlaygroundEvent::DragReleased { entity, velocity });
            }
        }
        self.sync_orbit_controls();
        self.refresh_status();
    }

    fn start_drag(&mut self, entity: Entity, hit: Vec3, ray: &Ray, now: Duration) {
        let forward = self.camera.to_camera().forward();
        self.ecs.interaction_mut().begin_drag(entity, hit, ray, forward, now);
        self.ecs.push_event(PlaygroundEvent::DragStarted { entity });
        self.sync_orbit_controls();
        self.refresh_status();
    }

    pub fn pointer_ray(&self, position: Vec2) -> Option<Ray> {
        let (origin, dir) = self.camera.to_camera().screen_ray(position, self.viewport)?;
        Some(Ray::new(origin, dir))
    }

    /// Ground hit under the ray, or a point in front of the camera when the ray misses.
    fn ground_anchor(&self, ray: &Ray) -> Vec3 {
        intersect_ray_plane(ray, &Plane::GROUND).unwrap_or_else(|| {
            let camera = self.camera.to_camera();
            camera.position + camera.forward() * self.config.gravity_gun.fallback_distance
        })
    }

    // ---------- Frame ----------

    /// Fires the hold-to-drag and blast-cleanup timers that are due at `now`.
    pub fn fire_due_timers(&mut self, now: Duration) {
        let pending = self.ecs.interaction_mut().poll_hold_timer(now);
        if let Some(pending) = pending {
            match self.pointer_ray(pending.last_px) {
                Some(ray) if self.ecs.contains(pending.entity) => {
                    self.start_drag(pending.entity, pending.hit, &ray, now);
                }
                _ => log::debug!("[input] hold timer fired for a removed entity"),
            }
        }
        if let Some(entities) = self.blast_cleanup.poll(now) {
            let mut removed = 0;
            for entity in entities {
                if self.ecs.despawn_shape(entity).is_some() {
                    removed += 1;
                }
            }
            log::info!("[playground] blast cleanup removed {removed} shapes");
            self.sync_orbit_controls();
            self.refresh_status();
            self.route_events();
        }
    }

    /// Advances the playground by one display frame at session time `now`.
    pub fn frame(&mut self, now: Duration) {
        self.fire_due_timers(now);
        let dt = self.config.physics.fixed_dt;
        self.ecs.set_clock(now, dt);
        self.ecs.step_physics();
        self.camera.update();
        self.ecs.run_frame();
        self.route_events();
        self.sync_orbit_controls();
        for (id, transform) in self.ecs.render_transforms() {
            self.renderer.set_node_transform(id, transform);
        }
        self.refresh_status();
        let camera = self.camera.to_camera();
        self.renderer.render(&camera, &self.status);
        self.frame_index += 1;
    }

    fn route_events(&mut self) {
        for event in self.ecs.drain_events() {
            if let Some(render) = event.disposed_render() {
                self.renderer.remove_node(render);
            }
            self.audio.handle_event(&event);
            log::trace!("[playground] {event}");
            if self.event_log.len() == EVENT_LOG_CAPACITY {
                self.event_log.pop_front();
            }
            self.event_log.push_back(event);
        }
    }

    /// Camera orbit follows the interaction state: off while something is held.
    fn sync_orbit_controls(&mut self) {
        let enabled = self.ecs.interaction().orbit_enabled();
        self.camera.set_enabled(enabled);
    }

    fn refresh_status(&mut self) {
        let flags = self.status_flags();
        self.status.clear();
        self.status.push_str(&format!("Shapes: {}", self.ecs.entity_count()));
        if flags.contains(StatusFlags::GRAVITY_GUN) {
            self.status.push_str(" [GRAVITY GUN]");
        }
        if flags.contains(StatusFlags::GRABBED) {
            self.status.push_str(" [GRABBED]");
        }
    }
}
