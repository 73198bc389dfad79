use squishbox::audio::AudioManager;
use squishbox::config::PlaygroundConfig;
use squishbox::input::{Input, InputEvent, PlaygroundCommand};
use squishbox::renderer::HeadlessRenderer;
use squishbox::shapes::ShapeKind;
use squishbox::Playground;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use winit::keyboard::{Key, NamedKey};

fn commands(input: &mut Input) -> Vec<PlaygroundCommand> {
    input
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            InputEvent::Command(command) => Some(command),
            _ => None,
        })
        .collect()
}

#[test]
fn default_keys_map_to_toolbar_commands() {
    let mut input = Input::new();
    for key in ["1", "2", "3", "4", "g", "R"] {
        input.push_key(&Key::Character(key.into()));
    }
    input.push_key(&Key::Named(NamedKey::Delete));
    input.push_key(&Key::Named(NamedKey::Enter));
    assert_eq!(
        commands(&mut input),
        vec![
            PlaygroundCommand::Spawn(ShapeKind::Cube),
            PlaygroundCommand::Spawn(ShapeKind::Sphere),
            PlaygroundCommand::Spawn(ShapeKind::Tetra),
            PlaygroundCommand::Spawn(ShapeKind::Tube),
            PlaygroundCommand::ToggleGravityGun,
            PlaygroundCommand::Reset,
            PlaygroundCommand::Reset,
        ]
    );
}

#[test]
fn remapped_spawn_controls_override_defaults() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, r#"{{"bindings":{{"spawn_cube":["k"],"toggle_gravity_gun":["space"]}}}}"#)
        .expect("write remap config");

    let mut input = Input::from_config(temp.path());

    input.push_key(&Key::Character("k".into()));
    assert_eq!(commands(&mut input), vec![PlaygroundCommand::Spawn(ShapeKind::Cube)]);

    input.push_key(&Key::Character("1".into()));
    assert!(commands(&mut input).is_empty(), "default key should no longer fire when remapped");

    input.push_key(&Key::Named(NamedKey::Space));
    assert_eq!(commands(&mut input), vec![PlaygroundCommand::ToggleGravityGun]);

    input.push_key(&Key::Character("g".into()));
    assert!(commands(&mut input).is_empty(), "the replaced default binding is ignored");

    input.push_key(&Key::Character("2".into()));
    assert_eq!(
        commands(&mut input),
        vec![PlaygroundCommand::Spawn(ShapeKind::Sphere)],
        "untouched actions keep their defaults"
    );
}

#[test]
fn legacy_triangle_action_name_is_accepted() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, r#"{{"bindings":{{"spawn_triangle":["t"]}}}}"#).expect("write remap config");
    let mut input = Input::from_config(temp.path());
    input.push_key(&Key::Character("t".into()));
    assert_eq!(commands(&mut input), vec![PlaygroundCommand::Spawn(ShapeKind::Tetra)]);
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, "not json").expect("write broken config");
    let mut input = Input::from_config(temp.path());
    input.push_key(&Key::Character("3".into()));
    assert_eq!(commands(&mut input), vec![PlaygroundCommand::Spawn(ShapeKind::Tetra)]);
}

#[test]
fn key_commands_drive_the_playground() {
    let config = PlaygroundConfig::default();
    let audio = AudioManager::silent(&config.audio);
    let mut pg = Playground::new(config, Box::new(HeadlessRenderer::new()), audio, 1);
    let mut input = Input::new();
    for key in ["1", "2", "3", "4", "2"] {
        input.push_key(&Key::Character(key.into()));
    }
    input.push_key(&Key::Character("g".into()));
    for event in input.drain_events() {
        pg.handle_input(event, Duration::ZERO).expect("apply command");
    }
    assert_eq!(pg.entity_count(), 5);
    assert_eq!(pg.status_line(), "Shapes: 5 [GRAVITY GUN]");
    let kinds: Vec<_> = pg.entities().into_iter().filter_map(|e| pg.entity_info(e)).map(|info| info.kind).collect();
    assert_eq!(
        kinds,
        vec![ShapeKind::Cube, ShapeKind::Sphere, ShapeKind::Tetra, ShapeKind::Tube, ShapeKind::Sphere]
    );
}
