use crate::shapes::ShapeKind;
use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{Key, NamedKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => PointerButton::Other,
        }
    }
}

/// Pointer input in window pixels. `touches` counts the fingers down after the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { kind: PointerKind, button: PointerButton, position: Vec2, touches: usize },
    Move { kind: PointerKind, position: Vec2 },
    Up { kind: PointerKind, button: PointerButton, position: Vec2 },
    Cancel { kind: PointerKind },
    Wheel { delta: f32 },
    /// Two-finger distance change; above 1.0 the fingers moved apart.
    Pinch { ratio: f32 },
    /// Two-finger midpoint movement in pixels.
    Pan { delta: Vec2 },
}

/// Toolbar-level requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaygroundCommand {
    Spawn(ShapeKind),
    Reset,
    ToggleGravityGun,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Command(PlaygroundCommand),
    Resized { width: u32, height: u32 },
}

/// Translates window events into playground input, tracking cursor position and live touches.
pub struct Input {
    bindings: KeyBindings,
    cursor_pos: Option<Vec2>,
    touches: HashMap<u64, Vec2>,
    primary_touch: Option<u64>,
    pinch_distance: Option<f32>,
    pinch_center: Option<Vec2>,
    pub events: Vec<InputEvent>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(path: impl AsRef<Path>) -> Self {
        let bindings = KeyBindings::load_or_default(path);
        Self::with_bindings(bindings)
    }

    fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            cursor_pos: None,
            touches: HashMap::new(),
            primary_touch: None,
            pinch_distance: None,
            pinch_center: None,
            events: Vec::new(),
        }
    }

    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor_pos
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn push_window_event(&mut self, ev: &WindowEvent) {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.push_pointer(PointerEvent::Wheel { delta: d });
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_pos = Some(position);
                self.push_pointer(PointerEvent::Move { kind: PointerKind::Mouse, position });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(position) = self.cursor_pos else {
                    return;
                };
                let button = PointerButton::from(*button);
                let event = match state {
                    ElementState::Pressed => {
                        PointerEvent::Down { kind: PointerKind::Mouse, button, position, touches: 0 }
                    }
                    ElementState::Released => PointerEvent::Up { kind: PointerKind::Mouse, button, position },
                };
                self.push_pointer(event);
            }
            WindowEvent::Touch(touch) => self.push_touch(touch),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    self.apply_key_binding(&event.logical_key);
                }
            }
            WindowEvent::Resized(size) => {
                self.events.push(InputEvent::Resized { width: size.width, height: size.height });
            }
            _ => {}
        }
    }

    pub fn push_key(&mut self, key: &Key) {
        self.apply_key_binding(key);
    }

    fn push_touch(&mut self, touch: &Touch) {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
            TouchPhase::Started => {
                self.touches.insert(touch.id, position);
                if self.touches.len() == 1 {
                    self.primary_touch = Some(touch.id);
                }
                self.track_two_fingers();
                self.push_pointer(PointerEvent::Down {
                    kind: PointerKind::Touch,
                    button: PointerButton::Primary,
                    position,
                    touches: self.touches.len(),
                });
            }
            TouchPhase::Moved => {
                self.touches.insert(touch.id, position);
                if let (Some(previous), Some(current)) = (self.pinch_distance, self.two_finger_distance()) {
                    if previous > f32::EPSILON {
                        self.push_pointer(PointerEvent::Pinch { ratio: current / previous });
                    }
                    if let (Some(from), Some(to)) = (self.pinch_center, self.two_finger_center()) {
                        if from != to {
                            self.push_pointer(PointerEvent::Pan { delta: to - from });
                        }
                    }
                    self.track_two_fingers();
                    return;
                }
                if self.primary_touch == Some(touch.id) {
                    self.push_pointer(PointerEvent::Move { kind: PointerKind::Touch, position });
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&touch.id);
                if self.primary_touch == Some(touch.id) {
                    self.primary_touch = None;
                }
                self.track_two_fingers();
                let event = if touch.phase == TouchPhase::Ended {
                    PointerEvent::Up { kind: PointerKind::Touch, button: PointerButton::Primary, position }
                } else {
                    PointerEvent::Cancel { kind: PointerKind::Touch }
                };
                self.push_pointer(event);
            }
        }
    }

    fn track_two_fingers(&mut self) {
        self.pinch_distance = self.two_finger_distance();
        self.pinch_center = self.two_finger_center();
    }

    fn two_fingers(&self) -> Option<(Vec2, Vec2)> {
        if self.touches.len() != 2 {
            return None;
        }
        let mut points = self.touches.values();
        Some((*points.next()?, *points.next()?))
    }

    fn two_finger_distance(&self) -> Option<f32> {
        self.two_fingers().map(|(a, b)| a.distance(b))
    }

    fn two_finger_center(&self) -> Option<Vec2> {
        self.two_fingers().map(|(a, b)| (a + b) * 0.5)
    }

    fn push_pointer(&mut self, event: PointerEvent) {
        self.events.push(InputEvent::Pointer(event));
    }

    fn apply_key_binding(&mut self, key: &Key) {
        if let Some(command) = self.bindings.command_for(key) {
            self.events.push(InputEvent::Command(command));
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::with_bindings(KeyBindings::default())
    }
}

/// Toolbar actions with their config names and default keys. An action named in the bindings
/// file loses its defaults; the others keep them.
const ACTIONS: [(&str, PlaygroundCommand, &[&str]); 6] = [
    ("spawn_cube", PlaygroundCommand::Spawn(ShapeKind::Cube), &["1"]),
    ("spawn_sphere", PlaygroundCommand::Spawn(ShapeKind::Sphere), &["2"]),
    ("spawn_tetra", PlaygroundCommand::Spawn(ShapeKind::Tetra), &["3"]),
    ("spawn_tube", PlaygroundCommand::Spawn(ShapeKind::Tube), &["4"]),
    ("reset", PlaygroundCommand::Reset, &["r", "delete"]),
    ("toggle_gravity_gun", PlaygroundCommand::ToggleGravityGun, &["g"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BoundKey {
    Character(String),
    Named(NamedKey),
}

impl BoundKey {
    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) if !ch.is_empty() => Some(Self::Character(ch.to_lowercase())),
            Key::Named(named) => Some(Self::Named(*named)),
            _ => None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        let named = match value.as_str() {
            "space" => NamedKey::Space,
            "delete" | "del" => NamedKey::Delete,
            "backspace" => NamedKey::Backspace,
            "escape" | "esc" => NamedKey::Escape,
            "enter" => NamedKey::Enter,
            _ if value.chars().count() == 1 => return Some(Self::Character(value.clone())),
            _ => return None,
        };
        Some(Self::Named(named))
    }
}

#[derive(Debug, Deserialize)]
struct BindingsFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
struct KeyBindings {
    commands: HashMap<BoundKey, PlaygroundCommand>,
}

impl KeyBindings {
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_bindings(path) {
            Ok(file) => Self::with_overrides(file.bindings),
            Err(err) => {
                log::warn!("[input] {err:#}. Falling back to default bindings.");
                Self::default()
            }
        }
    }

    fn with_overrides(overrides: HashMap<String, Vec<String>>) -> Self {
        let mut custom: HashMap<&str, Vec<BoundKey>> = HashMap::new();
        for (name, keys) in overrides {
            let Some(action) = action_name(&name) else {
                log::warn!("[input] unknown action '{name}', ignoring.");
                continue;
            };
            let parsed: Vec<_> = keys
                .iter()
                .filter_map(|key| {
                    let bound = BoundKey::parse(key);
                    if bound.is_none() {
                        log::warn!("[input] unknown key '{key}' for action '{name}', ignoring.");
                    }
                    bound
                })
                .collect();
            if parsed.is_empty() {
                log::warn!("[input] action '{name}' has no valid keys, keeping defaults.");
                continue;
            }
            custom.entry(action).or_default().extend(parsed);
        }

        let mut commands = HashMap::new();
        for (name, command, defaults) in ACTIONS {
            let keys = custom
                .remove(name)
                .unwrap_or_else(|| defaults.iter().filter_map(|key| BoundKey::parse(key)).collect());
            for key in keys {
                commands.insert(key, command);
            }
        }
        Self { commands }
    }

    fn command_for(&self, key: &Key) -> Option<PlaygroundCommand> {
        BoundKey::from_event_key(key).and_then(|bound| self.commands.get(&bound).copied())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::with_overrides(HashMap::new())
    }
}

fn read_bindings(path: &Path) -> Result<BindingsFile> {
    let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Canonical action name; `spawn_triangle` is the older name of `spawn_tetra`.
fn action_name(raw: &str) -> Option<&'static str> {
    let name = raw.trim().to_lowercase();
    let name = if name == "spawn_triangle" { "spawn_tetra" } else { name.as_str() };
    ACTIONS.iter().map(|(action, _, _)| *action).find(|action| *action == name)
}
