use anyhow::{Context, Result};
use squishbox::audio::{AudioManager, CueBackend, SilentBackend};
use squishbox::cli::{CliOverrides, SessionOptions};
use squishbox::config::PlaygroundConfig;
use squishbox::input::{Input, InputEvent, PointerButton, PointerEvent, PointerKind};
use squishbox::renderer::HeadlessRenderer;
use squishbox::time::Time;
use squishbox::Playground;
use std::time::Duration;
use winit::keyboard::Key;

const INPUT_BINDINGS_PATH: &str = "config/input.json";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&cli) {
        log::error!("Playground error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: &CliOverrides) -> Result<()> {
    let session = cli.session_options();
    let mut config = PlaygroundConfig::load_or_default(&session.config_path);
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        log::info!("[config] CLI overrides applied: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }
    let seed = session.seed.unwrap_or(0x5eed);
    let audio = AudioManager::new(&config.audio, audio_backend(&config), seed);
    let mut playground = Playground::new(config, Box::new(HeadlessRenderer::new()), audio, seed);
    let mut input = Input::from_config(INPUT_BINDINGS_PATH);
    run_session(&mut playground, &mut input, &session)
}

fn audio_backend(config: &PlaygroundConfig) -> Box<dyn CueBackend> {
    if !config.audio.enabled {
        return Box::new(SilentBackend);
    }
    device_backend().unwrap_or_else(|| Box::new(SilentBackend))
}

#[cfg(feature = "rodio_audio")]
fn device_backend() -> Option<Box<dyn CueBackend>> {
    match squishbox::audio::RodioBackend::try_default() {
        Ok(backend) => Some(Box::new(backend)),
        Err(err) => {
            log::warn!("[audio] {err:#}. Continuing without sound.");
            None
        }
    }
}

#[cfg(not(feature = "rodio_audio"))]
fn device_backend() -> Option<Box<dyn CueBackend>> {
    None
}

/// Scripted headless session: spawn shapes from key presses, grab one, optionally run the
/// gravity gun, then blast everything away near the end.
fn run_session(playground: &mut Playground, input: &mut Input, session: &SessionOptions) -> Result<()> {
    let clock = Time::new();
    let dt = Duration::from_secs_f32(playground.config().physics.fixed_dt);
    let kinds = ["1", "2", "3", "4"];
    for i in 0..session.spawn as usize {
        input.push_key(&Key::Character(kinds[i % kinds.len()].into()));
    }
    if session.gravity_gun {
        input.push_key(&Key::Character("g".into()));
    }
    for event in input.drain_events() {
        playground.handle_input(event, Duration::ZERO).context("Failed to apply startup command")?;
    }

    let grab_frame = session.frames / 4;
    let release_frame = session.frames / 2;
    let reset_frame = session.frames.saturating_sub(60);
    let center = glam::Vec2::new(playground.viewport().width as f32, playground.viewport().height as f32) * 0.5;
    for frame in 0..session.frames {
        let now = dt * frame;
        if frame == grab_frame {
            let target = playground.entities().first().and_then(|entity| playground.entity_info(*entity));
            let camera = playground.camera();
            let press_at = target
                .and_then(|info| camera.project_point(info.translation, playground.viewport()))
                .unwrap_or(center);
            press(playground, press_at, now)?;
        } else if frame > grab_frame && frame < release_frame {
            let offset = (frame - grab_frame) as f32;
            let position = center + glam::Vec2::new(offset.sin() * 40.0, -offset * 0.5);
            playground.handle_input(
                InputEvent::Pointer(PointerEvent::Move { kind: PointerKind::Mouse, position }),
                now,
            )?;
        } else if frame == release_frame {
            playground.handle_input(
                InputEvent::Pointer(PointerEvent::Up {
                    kind: PointerKind::Mouse,
                    button: PointerButton::Primary,
                    position: center,
                }),
                now,
            )?;
        } else if frame == reset_frame {
            input.push_key(&Key::Character("r".into()));
            for event in input.drain_events() {
                playground.handle_input(event, now)?;
            }
        }
        playground.frame(now);
        if frame % 120 == 0 {
            log::info!("[session] frame {frame}: {} ({})", playground.status_line(), playground.mode().label());
        }
    }
    playground.frame(dt * session.frames + Duration::from_millis(playground.config().blast.cleanup_delay_ms));
    log::info!(
        "[session] finished {} frames in {:.2?}: {}, {} cues played",
        playground.frame_index(),
        clock.now(),
        playground.status_line(),
        playground.audio().recent_triggers().len()
    );
    if playground.entity_count() > 0 {
        log::info!("[session] {} shapes remain", playground.entity_count());
    }
    Ok(())
}

fn press(playground: &mut Playground, position: glam::Vec2, now: Duration) -> Result<()> {
    playground.handle_input(
        InputEvent::Pointer(PointerEvent::Down {
            kind: PointerKind::Mouse,
            button: PointerButton::Primary,
            position,
            touches: 0,
        }),
        now,
    )
}
