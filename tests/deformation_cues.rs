use glam::Vec3;
use squishbox::audio::AudioManager;
use squishbox::config::PlaygroundConfig;
use squishbox::events::PlaygroundEvent;
use squishbox::input::{PointerButton, PointerEvent, PointerKind};
use squishbox::renderer::HeadlessRenderer;
use squishbox::shapes::ShapeKind;
use squishbox::Playground;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn playground() -> (Playground, Rc<RefCell<HeadlessRenderer>>) {
    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let config = PlaygroundConfig::default();
    let audio = AudioManager::silent(&config.audio);
    let playground = Playground::new(config, Box::new(Rc::clone(&renderer)), audio, 5);
    (playground, renderer)
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn cue_count(pg: &Playground) -> usize {
    pg.recent_events().filter(|event| matches!(event, PlaygroundEvent::ImpactCue { .. })).count()
}

/// Free-falling sphere hit by two sudden velocity changes `gap_ms` apart.
fn cues_for_gap(gap_ms: u64) -> (usize, usize) {
    let (mut pg, _renderer) = playground();
    let sphere = pg.spawn_at(ShapeKind::Sphere, Vec3::new(0.0, 40.0, 0.0), 0xffaa00).expect("spawn sphere");
    pg.frame(ms(16));
    assert_eq!(cue_count(&pg), 0, "gravity alone stays below the cue threshold");

    pg.ecs_mut().set_linear_velocity(sphere, Vec3::new(5.0, 0.0, 0.0));
    pg.frame(ms(1000));
    pg.ecs_mut().set_linear_velocity(sphere, Vec3::new(-5.0, 0.0, 0.0));
    pg.frame(ms(1000 + gap_ms));
    let counts = (cue_count(&pg), pg.audio().recent_triggers().len());
    counts
}

#[test]
fn impacts_inside_cooldown_share_one_cue() {
    assert_eq!(cues_for_gap(100), (1, 1));
}

#[test]
fn impacts_past_cooldown_cue_twice() {
    assert_eq!(cues_for_gap(200), (2, 2));
}

#[test]
fn landing_squishes_then_settles() {
    let (mut pg, renderer) = playground();
    let cube = pg.spawn_at(ShapeKind::Cube, Vec3::new(0.0, 4.0, 0.0), 0x44ff44).expect("spawn cube");
    let mut now = Duration::ZERO;
    let mut deepest: f32 = 0.0;
    for _ in 0..900 {
        now += ms(16);
        pg.frame(now);
        let info = pg.entity_info(cube).expect("cube alive");
        deepest = deepest.max((info.squish - Vec3::ONE).abs().max_element());
        let node_scale = renderer.borrow().node(info.render).expect("render node").transform.scale;
        assert_eq!(node_scale, info.squish, "render node carries the cosmetic scale");
    }
    assert!(deepest > 0.05, "landing should squish the cube, deepest {deepest}");
    let info = pg.entity_info(cube).expect("cube alive");
    assert!((info.squish - Vec3::ONE).abs().max_element() < 1e-2, "squish settled at {:?}", info.squish);
    assert!((info.squish_target - Vec3::ONE).abs().max_element() < 1e-2);
}

#[test]
fn dragging_stretches_along_motion() {
    let (mut pg, _renderer) = playground();
    let cube = pg.spawn_at(ShapeKind::Cube, Vec3::new(0.0, 0.6, 0.0), 0x44ff44).expect("spawn cube");
    let camera = pg.camera();
    let at = camera.project_point(Vec3::new(0.0, 0.6, 0.0), pg.viewport()).expect("on screen");
    pg.handle_pointer(
        PointerEvent::Down { kind: PointerKind::Mouse, button: PointerButton::Primary, position: at, touches: 0 },
        ms(0),
    );
    let far = camera.project_point(Vec3::new(0.0, 3.5, 0.0), pg.viewport()).expect("on screen");
    pg.handle_pointer(PointerEvent::Move { kind: PointerKind::Mouse, position: far }, ms(10));
    pg.frame(ms(16));

    let info = pg.entity_info(cube).expect("cube alive");
    assert!(info.squish_target.y > 1.0, "stretched along the pull, target {:?}", info.squish_target);
    assert!(info.squish_target.x < 1.0);
    assert!(info.squish_target.y <= 1.35 + 1e-4);
}
