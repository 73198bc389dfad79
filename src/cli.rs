use crate::config::PlaygroundConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config/playground.json";
const DEFAULT_FRAMES: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    width: Option<u32>,
    height: Option<u32>,
    audio: Option<bool>,
    frames: Option<u32>,
    seed: Option<u64>,
    spawn: Option<u32>,
    gravity_gun: Option<bool>,
    config: Option<PathBuf>,
}

/// Options for a headless session that are not part of the playground config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub frames: u32,
    pub seed: Option<u64>,
    pub spawn: u32,
    pub gravity_gun: bool,
    pub config_path: PathBuf,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "width" => {
                    overrides.width =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid width '{value}'"))?);
                }
                "height" => {
                    overrides.height =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid height '{value}'"))?);
                }
                "audio" => {
                    overrides.audio = Some(parse_bool_flag("audio", &value)?);
                }
                "frames" => {
                    overrides.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                "seed" => {
                    overrides.seed =
                        Some(value.parse::<u64>().with_context(|| format!("Invalid seed '{value}'"))?);
                }
                "spawn" => {
                    overrides.spawn =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid spawn count '{value}'"))?);
                }
                "gravity-gun" => {
                    overrides.gravity_gun = Some(parse_bool_flag("gravity-gun", &value)?);
                }
                "config" => {
                    overrides.config = Some(PathBuf::from(value));
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --width, --height, --audio, --frames, --seed, \
                     --spawn, --gravity-gun, --config."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_overrides(&self) -> PlaygroundConfigOverrides {
        PlaygroundConfigOverrides { width: self.width, height: self.height, audio: self.audio }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            frames: self.frames.unwrap_or(DEFAULT_FRAMES),
            seed: self.seed,
            spawn: self.spawn.unwrap_or(8),
            gravity_gun: self.gravity_gun.unwrap_or(false),
            config_path: self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_and_window_flags() {
        let args =
            ["squishbox", "--width", "1600", "--frames", "120", "--seed", "7", "--gravity-gun", "on"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.config_overrides().width, Some(1600));
        let session = overrides.session_options();
        assert_eq!(session.frames, 120);
        assert_eq!(session.seed, Some(7));
        assert!(session.gravity_gun);
        assert_eq!(session.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["squishbox", "--spawn", "3", "--spawn", "12", "--audio", "on", "--audio", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.session_options().spawn, 12);
        assert_eq!(overrides.config_overrides().audio, Some(false));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["squishbox", "--frames"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = CliOverrides::parse(["squishbox", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
    }

    #[test]
    fn rejects_bad_bool() {
        let err = CliOverrides::parse(["squishbox", "--gravity-gun", "maybe"]).unwrap_err();
        assert!(err.to_string().contains("Invalid gravity-gun"));
    }
}
