use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use squishbox::audio::AudioManager;
use squishbox::config::PlaygroundConfig;
use squishbox::events::PlaygroundEvent;
use squishbox::input::{InputEvent, PlaygroundCommand, PointerButton, PointerEvent, PointerKind};
use squishbox::interaction::InteractionMode;
use squishbox::renderer::HeadlessRenderer;
use squishbox::shapes::ShapeKind;
use squishbox::Playground;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn playground() -> (Playground, Rc<RefCell<HeadlessRenderer>>) {
    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let config = PlaygroundConfig::default();
    let audio = AudioManager::silent(&config.audio);
    let playground = Playground::new(config, Box::new(Rc::clone(&renderer)), audio, 7);
    (playground, renderer)
}

fn screen_of(playground: &Playground, point: Vec3) -> Vec2 {
    playground.camera().project_point(point, playground.viewport()).expect("point is on screen")
}

fn mouse_down(playground: &mut Playground, position: Vec2, button: PointerButton, now: Duration) {
    playground.handle_pointer(PointerEvent::Down { kind: PointerKind::Mouse, button, position, touches: 0 }, now);
}

fn mouse_move(playground: &mut Playground, position: Vec2, now: Duration) {
    playground.handle_pointer(PointerEvent::Move { kind: PointerKind::Mouse, position }, now);
}

fn mouse_up(playground: &mut Playground, position: Vec2, now: Duration) {
    mouse_button_up(playground, position, PointerButton::Primary, now);
}

fn mouse_button_up(playground: &mut Playground, position: Vec2, button: PointerButton, now: Duration) {
    playground.handle_pointer(PointerEvent::Up { kind: PointerKind::Mouse, button, position }, now);
}

fn run_frames(playground: &mut Playground, start: Duration, count: u32) -> Duration {
    let mut now = start;
    for _ in 0..count {
        now += FRAME;
        playground.frame(now);
    }
    now
}

fn assert_exclusive(playground: &Playground) {
    let interaction = playground.interaction();
    assert!(
        !(interaction.is_dragging() && interaction.gravity_gun_active()),
        "drag and gravity gun engaged together"
    );
    let expected = !interaction.is_dragging() && !interaction.gravity_gun_active();
    assert_eq!(interaction.orbit_enabled(), expected);
    assert_eq!(playground.orbit_camera().enabled(), expected, "camera controller out of sync");
}

#[test]
fn mouse_drag_pulls_entity_and_throws_on_release() {
    let (mut pg, _renderer) = playground();
    let cube = pg.spawn_at(ShapeKind::Cube, Vec3::new(0.0, 0.6, 0.0), 0xff8800).expect("spawn cube");
    let now = run_frames(&mut pg, Duration::ZERO, 5);

    let start = screen_of(&pg, Vec3::new(0.0, 0.6, 0.0));
    mouse_down(&mut pg, start, PointerButton::Primary, now);
    assert!(matches!(pg.mode(), InteractionMode::Dragging(drag) if drag.entity == cube));
    assert!(!pg.orbit_camera().enabled());
    assert_eq!(pg.status_line(), "Shapes: 1 [GRABBED]");

    let target = screen_of(&pg, Vec3::new(1.5, 1.2, 0.0));
    mouse_move(&mut pg, target, now + Duration::from_millis(100));
    let now = run_frames(&mut pg, now + Duration::from_millis(100), 60);
    let info = pg.entity_info(cube).expect("cube alive");
    assert!(info.translation.x > 0.8, "cube should follow the pointer, at {:?}", info.translation);
    assert!(info.angular_velocity.length() < 1e-3, "dragged entity does not spin");

    mouse_up(&mut pg, target, now);
    assert_eq!(pg.mode(), InteractionMode::Idle);
    assert!(pg.orbit_camera().enabled());
    let released = pg.entity_info(cube).expect("cube alive").linear_velocity;
    assert!(released.length() <= 20.0 + 1e-3);
    pg.frame(now + FRAME);
    assert!(pg.recent_events().any(|event| matches!(event, PlaygroundEvent::DragReleased { .. })));
    assert_exclusive(&pg);
}

#[test]
fn left_press_on_empty_space_is_unclaimed() {
    let (mut pg, _renderer) = playground();
    let before = pg.camera().position;
    mouse_down(&mut pg, Vec2::new(40.0, 40.0), PointerButton::Primary, Duration::ZERO);
    assert_eq!(pg.mode(), InteractionMode::Idle);
    assert!(pg.orbit_camera().enabled());
    mouse_move(&mut pg, Vec2::new(160.0, 40.0), Duration::from_millis(16));
    let now = run_frames(&mut pg, Duration::from_millis(16), 30);
    assert!(pg.camera().position.distance(before) < 1e-4, "left drag must not move the camera");
    mouse_up(&mut pg, Vec2::new(160.0, 40.0), now);
    assert_eq!(pg.mode(), InteractionMode::Idle);
}

#[test]
fn middle_button_rotates_and_right_button_pans() {
    let (mut pg, _renderer) = playground();
    let start = pg.camera();
    mouse_down(&mut pg, Vec2::new(40.0, 40.0), PointerButton::Middle, Duration::ZERO);
    mouse_move(&mut pg, Vec2::new(160.0, 40.0), Duration::from_millis(16));
    let now = run_frames(&mut pg, Duration::from_millis(16), 90);
    mouse_button_up(&mut pg, Vec2::new(160.0, 40.0), PointerButton::Middle, now);
    let rotated = pg.camera();
    assert!(rotated.position.distance(start.position) > 0.5, "middle drag rotates");
    assert!(rotated.target.distance(start.target) < 1e-4, "rotation keeps the target");
    assert_eq!(pg.mode(), InteractionMode::Idle);

    mouse_down(&mut pg, Vec2::new(600.0, 300.0), PointerButton::Secondary, now);
    mouse_move(&mut pg, Vec2::new(700.0, 300.0), now + FRAME);
    let panned = pg.camera();
    assert!(panned.target.distance(rotated.target) > 0.1, "right drag pans the target");
    let offset_before = rotated.position - rotated.target;
    let offset_after = panned.position - panned.target;
    assert!((offset_after - offset_before).length() < 1e-4, "pan keeps the viewing direction");
    mouse_button_up(&mut pg, Vec2::new(700.0, 300.0), PointerButton::Secondary, now + FRAME);
    mouse_move(&mut pg, Vec2::new(800.0, 300.0), now + FRAME * 2);
    assert!(pg.camera().target.distance(panned.target) < 1e-5, "released button stops panning");
}

#[test]
fn two_finger_pan_slides_the_target() {
    let (mut pg, _renderer) = playground();
    let before = pg.camera().target;
    pg.handle_pointer(PointerEvent::Pan { delta: Vec2::new(0.0, 80.0) }, Duration::ZERO);
    let after = pg.camera().target;
    assert!(after.y > before.y, "dragging two fingers down lifts the view target");
    assert_eq!(pg.mode(), InteractionMode::Idle);
}

#[test]
fn secondary_button_is_not_claimed() {
    let (mut pg, _renderer) = playground();
    pg.spawn_at(ShapeKind::Sphere, Vec3::new(0.0, 0.6, 0.0), 0x00ff00).expect("spawn sphere");
    let at = screen_of(&pg, Vec3::new(0.0, 0.6, 0.0));
    mouse_down(&mut pg, at, PointerButton::Secondary, Duration::ZERO);
    assert_eq!(pg.mode(), InteractionMode::Idle);
    assert!(pg.orbit_camera().enabled());
}

#[test]
fn gravity_gun_cancels_drag_and_keeps_orbit_off() {
    let (mut pg, _renderer) = playground();
    let cube = pg.spawn_at(ShapeKind::Cube, Vec3::new(0.0, 0.6, 0.0), 0xffffff).expect("spawn cube");
    let at = screen_of(&pg, Vec3::new(0.0, 0.6, 0.0));
    mouse_down(&mut pg, at, PointerButton::Primary, Duration::ZERO);
    assert!(pg.interaction().is_dragging());

    pg.engage_gravity_gun_at(Vec3::ZERO, Duration::from_millis(30));
    assert!(!pg.interaction().is_dragging());
    assert!(pg.interaction().gravity_gun_active());
    assert!(!pg.orbit_camera().enabled());
    pg.frame(Duration::from_millis(46));
    assert!(pg
        .recent_events()
        .any(|event| matches!(event, PlaygroundEvent::DragCancelled { entity } if *entity == cube)));
    assert_exclusive(&pg);
}

#[test]
fn toggle_command_drives_gravity_gun_press() {
    let (mut pg, _renderer) = playground();
    pg.spawn_at(ShapeKind::Cube, Vec3::new(1.0, 0.6, 0.0), 0xffffff).expect("spawn cube");
    pg.handle_input(InputEvent::Command(PlaygroundCommand::ToggleGravityGun), Duration::ZERO)
        .expect("toggle");
    assert_eq!(pg.status_line(), "Shapes: 1 [GRAVITY GUN]");
    let at = screen_of(&pg, Vec3::new(1.0, 0.6, 0.0));
    mouse_down(&mut pg, at, PointerButton::Primary, Duration::ZERO);
    assert!(pg.interaction().gravity_gun_active(), "gravity gun wins over picking");
    assert!(!pg.interaction().is_dragging());

    pg.toggle_gravity_gun();
    assert!(!pg.interaction().gravity_gun_active(), "disabling the flag releases the gun");
    assert!(pg.orbit_camera().enabled());
    assert_eq!(pg.status_line(), "Shapes: 1");
}

#[test]
fn random_input_never_breaks_exclusivity() {
    let (mut pg, _renderer) = playground();
    for i in 0..4 {
        pg.spawn_at(ShapeKind::ALL[i], Vec3::new(i as f32 * 1.2 - 1.8, 0.7, 0.0), 0x808080).expect("spawn");
    }
    let mut rng = StdRng::seed_from_u64(42);
    let mut now = Duration::ZERO;
    let size = pg.viewport();
    for _ in 0..400 {
        now += Duration::from_millis(rng.gen_range(1..40));
        let position = Vec2::new(rng.gen_range(0.0..size.width as f32), rng.gen_range(0.0..size.height as f32));
        let kind = if rng.gen_bool(0.5) { PointerKind::Mouse } else { PointerKind::Touch };
        match rng.gen_range(0..9) {
            0 | 1 => pg.handle_pointer(
                PointerEvent::Down { kind, button: PointerButton::Primary, position, touches: rng.gen_range(1..3) },
                now,
            ),
            2 | 3 => pg.handle_pointer(PointerEvent::Move { kind, position }, now),
            4 => pg.handle_pointer(PointerEvent::Up { kind, button: PointerButton::Primary, position }, now),
            5 => {
                pg.toggle_gravity_gun();
            }
            6 => {
                pg.engage_gravity_gun_at(Vec3::new(position.x * 0.001, 0.0, 0.0), now);
            }
            7 => pg.frame(now),
            _ => {
                pg.reset(now);
            }
        }
        assert_exclusive(&pg);
    }
}
