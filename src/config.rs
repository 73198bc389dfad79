use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "PhysicsConfig::default_gravity")]
    pub gravity: [f32; 3],
    #[serde(default = "PhysicsConfig::default_fixed_dt")]
    pub fixed_dt: f32,
    #[serde(default = "PhysicsConfig::default_cull_height")]
    pub cull_height: f32,
    #[serde(default = "PhysicsConfig::default_ground_half_extents")]
    pub ground_half_extents: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct DragConfig {
    #[serde(default = "DragConfig::default_gain")]
    pub gain: f32,
    #[serde(default = "DragConfig::default_max_throw_speed")]
    pub max_throw_speed: f32,
    #[serde(default = "DragConfig::default_hold_delay_ms")]
    pub hold_delay_ms: u64,
    #[serde(default = "DragConfig::default_move_tolerance_px")]
    pub move_tolerance_px: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GravityGunConfig {
    #[serde(default = "GravityGunConfig::default_range")]
    pub range: f32,
    #[serde(default = "GravityGunConfig::default_radius")]
    pub radius: f32,
    #[serde(default = "GravityGunConfig::default_tilt_degrees")]
    pub tilt_degrees: f32,
    #[serde(default = "GravityGunConfig::default_revolutions_per_second")]
    pub revolutions_per_second: f32,
    #[serde(default = "GravityGunConfig::default_base_lift")]
    pub base_lift: f32,
    #[serde(default = "GravityGunConfig::default_oscillation")]
    pub oscillation: f32,
    #[serde(default = "GravityGunConfig::default_ground_clearance")]
    pub ground_clearance: f32,
    #[serde(default = "GravityGunConfig::default_gain")]
    pub gain: f32,
    #[serde(default = "GravityGunConfig::default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "GravityGunConfig::default_spin")]
    pub spin: [f32; 3],
    #[serde(default = "GravityGunConfig::default_fallback_distance")]
    pub fallback_distance: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeformationConfig {
    #[serde(default = "DeformationConfig::default_impact_threshold")]
    pub impact_threshold: f32,
    #[serde(default = "DeformationConfig::default_impact_factor")]
    pub impact_factor: f32,
    #[serde(default = "DeformationConfig::default_impact_cap")]
    pub impact_cap: f32,
    #[serde(default = "DeformationConfig::default_drag_threshold")]
    pub drag_threshold: f32,
    #[serde(default = "DeformationConfig::default_drag_factor")]
    pub drag_factor: f32,
    #[serde(default = "DeformationConfig::default_drag_cap")]
    pub drag_cap: f32,
    #[serde(default = "DeformationConfig::default_approach_rate")]
    pub approach_rate: f32,
    #[serde(default = "DeformationConfig::default_relax_rate")]
    pub relax_rate: f32,
    #[serde(default = "DeformationConfig::default_cue_threshold")]
    pub cue_threshold: f32,
    #[serde(default = "DeformationConfig::default_cue_cooldown_ms")]
    pub cue_cooldown_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlastConfig {
    #[serde(default = "BlastConfig::default_strength")]
    pub strength: f32,
    #[serde(default = "BlastConfig::default_upward_boost")]
    pub upward_boost: f32,
    #[serde(default = "BlastConfig::default_jitter")]
    pub jitter: f32,
    #[serde(default = "BlastConfig::default_lift")]
    pub lift: f32,
    #[serde(default = "BlastConfig::default_cleanup_delay_ms")]
    pub cleanup_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "AudioConfig::default_max_voices")]
    pub max_voices: usize,
    #[serde(default = "AudioConfig::default_volume")]
    pub volume: f32,
    #[serde(default = "AudioConfig::default_clips")]
    pub clips: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default = "CameraConfig::default_target")]
    pub target: [f32; 3],
    #[serde(default = "CameraConfig::default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "CameraConfig::default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "CameraConfig::default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "CameraConfig::default_max_polar_fraction")]
    pub max_polar_fraction: f32,
    #[serde(default = "CameraConfig::default_damping")]
    pub damping: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub gravity_gun: GravityGunConfig,
    #[serde(default)]
    pub deformation: DeformationConfig,
    #[serde(default)]
    pub blast: BlastConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Default)]
pub struct PlaygroundConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub audio: Option<bool>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

impl PhysicsConfig {
    const fn default_gravity() -> [f32; 3] {
        [0.0, -9.81, 0.0]
    }

    fn default_fixed_dt() -> f32 {
        1.0 / 60.0
    }

    const fn default_cull_height() -> f32 {
        -25.0
    }

    const fn default_ground_half_extents() -> [f32; 3] {
        [10.0, 0.1, 10.0]
    }

    pub fn gravity_vec(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Self::default_gravity(),
            fixed_dt: Self::default_fixed_dt(),
            cull_height: Self::default_cull_height(),
            ground_half_extents: Self::default_ground_half_extents(),
        }
    }
}

impl DragConfig {
    const fn default_gain() -> f32 {
        5.0
    }

    const fn default_max_throw_speed() -> f32 {
        20.0
    }

    const fn default_hold_delay_ms() -> u64 {
        140
    }

    const fn default_move_tolerance_px() -> f32 {
        12.0
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            gain: Self::default_gain(),
            max_throw_speed: Self::default_max_throw_speed(),
            hold_delay_ms: Self::default_hold_delay_ms(),
            move_tolerance_px: Self::default_move_tolerance_px(),
        }
    }
}

impl GravityGunConfig {
    const fn default_range() -> f32 {
        4.5
    }

    const fn default_radius() -> f32 {
        1.35
    }

    const fn default_tilt_degrees() -> f32 {
        8.0
    }

    const fn default_revolutions_per_second() -> f32 {
        0.28
    }

    const fn default_base_lift() -> f32 {
        1.6
    }

    const fn default_oscillation() -> f32 {
        0.25
    }

    const fn default_ground_clearance() -> f32 {
        0.25
    }

    const fn default_gain() -> f32 {
        4.2
    }

    const fn default_max_speed() -> f32 {
        12.0
    }

    const fn default_spin() -> [f32; 3] {
        [1.2, 1.6, 1.1]
    }

    const fn default_fallback_distance() -> f32 {
        5.0
    }

    pub fn tilt_radians(&self) -> f32 {
        self.tilt_degrees.to_radians()
    }
}

impl Default for GravityGunConfig {
    fn default() -> Self {
        Self {
            range: Self::default_range(),
            radius: Self::default_radius(),
            tilt_degrees: Self::default_tilt_degrees(),
            revolutions_per_second: Self::default_revolutions_per_second(),
            base_lift: Self::default_base_lift(),
            oscillation: Self::default_oscillation(),
            ground_clearance: Self::default_ground_clearance(),
            gain: Self::default_gain(),
            max_speed: Self::default_max_speed(),
            spin: Self::default_spin(),
            fallback_distance: Self::default_fallback_distance(),
        }
    }
}

impl DeformationConfig {
    const fn default_impact_threshold() -> f32 {
        0.2
    }

    const fn default_impact_factor() -> f32 {
        0.25
    }

    const fn default_impact_cap() -> f32 {
        0.6
    }

    const fn default_drag_threshold() -> f32 {
        0.5
    }

    const fn default_drag_factor() -> f32 {
        0.08
    }

    const fn default_drag_cap() -> f32 {
        0.35
    }

    const fn default_approach_rate() -> f32 {
        0.3
    }

    const fn default_relax_rate() -> f32 {
        0.05
    }

    const fn default_cue_threshold() -> f32 {
        0.35
    }

    const fn default_cue_cooldown_ms() -> u64 {
        180
    }
}

impl Default for DeformationConfig {
    fn default() -> Self {
        Self {
            impact_threshold: Self::default_impact_threshold(),
            impact_factor: Self::default_impact_factor(),
            impact_cap: Self::default_impact_cap(),
            drag_threshold: Self::default_drag_threshold(),
            drag_factor: Self::default_drag_factor(),
            drag_cap: Self::default_drag_cap(),
            approach_rate: Self::default_approach_rate(),
            relax_rate: Self::default_relax_rate(),
            cue_threshold: Self::default_cue_threshold(),
            cue_cooldown_ms: Self::default_cue_cooldown_ms(),
        }
    }
}

impl BlastConfig {
    const fn default_strength() -> f32 {
        35.0
    }

    const fn default_upward_boost() -> f32 {
        12.0
    }

    const fn default_jitter() -> f32 {
        0.6
    }

    const fn default_lift() -> f32 {
        0.6
    }

    const fn default_cleanup_delay_ms() -> u64 {
        650
    }
}

impl Default for BlastConfig {
    fn default() -> Self {
        Self {
            strength: Self::default_strength(),
            upward_boost: Self::default_upward_boost(),
            jitter: Self::default_jitter(),
            lift: Self::default_lift(),
            cleanup_delay_ms: Self::default_cleanup_delay_ms(),
        }
    }
}

impl AudioConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_max_voices() -> usize {
        3
    }

    const fn default_volume() -> f32 {
        0.55
    }

    fn default_clips() -> Vec<String> {
        ["Funny", "Noises", "OhMan", "TheBiggestHonk"]
            .iter()
            .map(|name| format!("media/mp3/{name}.mp3"))
            .collect()
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            max_voices: Self::default_max_voices(),
            volume: Self::default_volume(),
            clips: Self::default_clips(),
        }
    }
}

impl CameraConfig {
    const fn default_position() -> [f32; 3] {
        [5.0, 5.0, 5.0]
    }

    const fn default_target() -> [f32; 3] {
        [0.0, 1.0, 0.0]
    }

    const fn default_fov_degrees() -> f32 {
        75.0
    }

    const fn default_min_distance() -> f32 {
        2.5
    }

    const fn default_max_distance() -> f32 {
        25.0
    }

    const fn default_max_polar_fraction() -> f32 {
        0.49
    }

    const fn default_damping() -> f32 {
        0.05
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Self::default_position(),
            target: Self::default_target(),
            fov_degrees: Self::default_fov_degrees(),
            min_distance: Self::default_min_distance(),
            max_distance: Self::default_max_distance(),
            max_polar_fraction: Self::default_max_polar_fraction(),
            damping: Self::default_damping(),
        }
    }
}

impl PlaygroundConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &PlaygroundConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(audio) = overrides.audio {
            self.audio.enabled = audio;
        }
    }
}

impl PlaygroundConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.audio.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.audio.is_some() {
            fields.push("audio");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_sections_keep_defaults() {
        let mut temp = tempfile::NamedTempFile::new().expect("temp config");
        write!(temp, r#"{{"gravity_gun":{{"range":6.0}},"drag":{{"hold_delay_ms":200}}}}"#)
            .expect("write config");
        let cfg = PlaygroundConfig::load(temp.path()).expect("config parses");
        assert_eq!(cfg.gravity_gun.range, 6.0);
        assert_eq!(cfg.gravity_gun.radius, 1.35);
        assert_eq!(cfg.drag.hold_delay_ms, 200);
        assert_eq!(cfg.drag.move_tolerance_px, 12.0);
        assert_eq!(cfg.blast.cleanup_delay_ms, 650);
        assert_eq!(cfg.window.width, 1280);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = PlaygroundConfig::load_or_default("does/not/exist.json");
        assert_eq!(cfg.physics.cull_height, -25.0);
        assert_eq!(cfg.audio.max_voices, 3);
        assert_eq!(cfg.audio.clips.len(), 4);
    }

    #[test]
    fn overrides_apply_selected_fields() {
        let mut cfg = PlaygroundConfig::default();
        let overrides = PlaygroundConfigOverrides { width: Some(640), height: None, audio: Some(false) };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.window.width, 640);
        assert_eq!(cfg.window.height, 720);
        assert!(!cfg.audio.enabled);
        assert_eq!(overrides.applied_fields(), vec!["width", "audio"]);
    }
}
