use crate::config::AudioConfig;
use crate::events::PlaygroundEvent;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Something that can start playing a clip. Playback is fire-and-forget; the returned voice
/// only reports whether it is still audible.
pub trait CueBackend {
    fn play(&mut self, clip: &str, volume: f32) -> Result<Box<dyn CueVoice>>;
}

pub trait CueVoice {
    fn finished(&self) -> bool;
}

/// Backend used when audio is disabled or no device is available.
#[derive(Debug, Default)]
pub struct SilentBackend;

struct SilentVoice;

impl CueVoice for SilentVoice {
    fn finished(&self) -> bool {
        true
    }
}

impl CueBackend for SilentBackend {
    fn play(&mut self, _clip: &str, _volume: f32) -> Result<Box<dyn CueVoice>> {
        Ok(Box::new(SilentVoice))
    }
}

#[cfg(feature = "rodio_audio")]
pub use rodio_backend::RodioBackend;

#[cfg(feature = "rodio_audio")]
mod rodio_backend {
    use super::{CueBackend, CueVoice};
    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;

    pub struct RodioBackend {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl RodioBackend {
        pub fn try_default() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default().context("No audio output device")?;
            Ok(Self { _stream: stream, handle })
        }
    }

    struct RodioVoice(Sink);

    impl CueVoice for RodioVoice {
        fn finished(&self) -> bool {
            self.0.empty()
        }
    }

    impl CueBackend for RodioBackend {
        fn play(&mut self, clip: &str, volume: f32) -> Result<Box<dyn CueVoice>> {
            let file = File::open(clip).with_context(|| format!("Failed to open clip {clip}"))?;
            let source = Decoder::new(BufReader::new(file)).with_context(|| format!("Failed to decode {clip}"))?;
            let sink = Sink::try_new(&self.handle).context("Failed to create audio sink")?;
            sink.set_volume(volume);
            sink.append(source);
            Ok(Box::new(RodioVoice(sink)))
        }
    }
}

pub struct AudioManager {
    enabled: bool,
    capacity: usize,
    triggers: VecDeque<String>,
    clips: Vec<String>,
    volume: f32,
    max_voices: usize,
    voices: Vec<Box<dyn CueVoice>>,
    backend: Box<dyn CueBackend>,
    rng: StdRng,
    skipped: u64,
    failures: u64,
}

impl AudioManager {
    pub fn new(config: &AudioConfig, backend: Box<dyn CueBackend>, seed: u64) -> Self {
        Self {
            enabled: config.enabled,
            capacity: 16,
            triggers: VecDeque::new(),
            clips: config.clips.clone(),
            volume: config.volume.clamp(0.0, 1.0),
            max_voices: config.max_voices.max(1),
            voices: Vec::new(),
            backend,
            rng: StdRng::seed_from_u64(seed),
            skipped: 0,
            failures: 0,
        }
    }

    pub fn silent(config: &AudioConfig) -> Self {
        Self::new(config, Box::new(SilentBackend), 0)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
    }

    pub fn recent_triggers(&self) -> impl ExactSizeIterator<Item = &String> {
        self.triggers.iter()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|voice| !voice.finished()).count()
    }

    /// Cues dropped because every voice slot was busy.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn handle_event(&mut self, event: &PlaygroundEvent) {
        if !self.enabled {
            return;
        }
        if let PlaygroundEvent::ImpactCue { .. } = event {
            self.play_cue();
        }
    }

    /// Plays a random clip unless the voice cap is reached. Backend failures are logged and
    /// otherwise ignored.
    pub fn play_cue(&mut self) -> bool {
        self.voices.retain(|voice| !voice.finished());
        if self.voices.len() >= self.max_voices {
            self.skipped += 1;
            return false;
        }
        let Some(clip) = self.clips.choose(&mut self.rng).cloned() else {
            return false;
        };
        match self.backend.play(&clip, self.volume) {
            Ok(voice) => {
                self.voices.push(voice);
                self.push_trigger(clip);
                true
            }
            Err(err) => {
                self.failures += 1;
                log::debug!("[audio] cue '{clip}' failed: {err:#}");
                false
            }
        }
    }

    fn push_trigger(&mut self, trigger: String) {
        if self.triggers.len() == self.capacity {
            self.triggers.pop_front();
        }
        self.triggers.push_back(trigger);
    }
}
