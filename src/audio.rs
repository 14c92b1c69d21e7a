//! Symbolic cue boundary between the simulation and a sound backend
//!
//! The simulation only queues [`Cue`]s. Whoever owns the battle drains them
//! into a [`CueMixer`] after each frame; nothing a backend does can reach back
//! into simulation state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Settings;

/// Fire-and-forget sound/visual events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Boss fired
    Attack,
    /// Boss took damage or split
    Hit,
    /// Invincible bird bounced a projectile
    Deflect,
    /// Boss defeated
    Defeat,
    /// Boss preparation finished
    Ready,
    /// Score or pickup
    Point,
    /// Player fired or switched weapons
    Swoosh,
    /// Player died
    Die,
}

impl Cue {
    /// Name a sound backend maps to an asset
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Attack => "attack",
            Cue::Hit => "hit",
            Cue::Deflect => "deflect",
            Cue::Defeat => "defeat",
            Cue::Ready => "ready",
            Cue::Point => "point",
            Cue::Swoosh => "swoosh",
            Cue::Die => "die",
        }
    }
}

/// Failure reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    /// No asset is loaded for the cue
    Missing { cue: &'static str },
}

impl fmt::Display for CueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { cue } => write!(f, "no sound loaded for cue '{cue}'"),
        }
    }
}

impl std::error::Error for CueError {}

/// Something that can play a cue at a volume
pub trait CueBackend {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError>;
}

/// Backend that only logs; used by headless runs
#[derive(Debug, Default)]
pub struct LogBackend {
    pub played: usize,
}

impl CueBackend for LogBackend {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError> {
        self.played += 1;
        log::trace!("cue {} at volume {volume:.2}", cue.name());
        Ok(())
    }
}

/// Volume and mute front-end for a backend
pub struct CueMixer<B: CueBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    failures: usize,
}

impl<B: CueBackend> CueMixer<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        let mut mixer = Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            failures: 0,
        };
        mixer.apply_settings(settings);
        mixer
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play one cue. Backend failures are logged and otherwise ignored.
    pub fn play(&mut self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = self.backend.play(cue, vol) {
            self.failures += 1;
            log::warn!("Failed to play cue '{}': {err}", cue.name());
        }
    }

    /// Play every cue from a frame in order
    pub fn play_all<I: IntoIterator<Item = Cue>>(&mut self, cues: I) {
        for cue in cues {
            self.play(cue);
        }
    }

    /// Number of backend failures swallowed so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
