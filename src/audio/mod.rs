//! Playback backends. The engines only ask for clips and tracks by
//! reference; a player turns a reference into sound (or silence).

#[cfg(feature = "audio")]
mod rodio_player;

#[cfg(feature = "audio")]
pub use rodio_player::RodioPlayer;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac"];

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("audio output unavailable: {0}")]
    Output(String),
}

pub trait AudioPlayer {
    /// Start a word clip, stopping any clip already playing.
    fn play_clip(&mut self, clip: &str) -> Result<(), AudioError>;
    fn stop_clip(&mut self);
    /// True exactly once after the current clip has played to its end.
    fn poll_clip_finished(&mut self) -> bool;

    fn play_music(&mut self, track: &str) -> Result<(), AudioError>;
    fn set_music_volume(&mut self, volume: f32);
    fn stop_music(&mut self);
    /// True exactly once after the current music track has ended.
    fn poll_music_finished(&mut self) -> bool;
}

/// Clip references look like `audio/<word>.mp3`; only the file name is
/// kept and looked up in the configured audio directory.
pub fn resolve_clip(audio_dir: &Path, clip: &str) -> PathBuf {
    let path = Path::new(clip);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match path.file_name() {
        Some(name) => audio_dir.join(name),
        None => audio_dir.join(clip),
    }
}

/// Music files in `dir`, sorted by name. A missing directory is an empty
/// playlist.
pub fn discover_tracks(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "no music directory");
            return Vec::new();
        }
    };
    let mut tracks: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| MUSIC_EXTENSIONS.contains(&x.to_ascii_lowercase().as_str()))
        })
        .map(|p| p.to_string_lossy().to_string())
        .collect();
    tracks.sort();
    tracks
}

/// Backend that plays nothing. A clip counts as finished on the next poll,
/// so the game and listening flow behave as if it had played instantly.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    clip: Option<String>,
}

impl SilentPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioPlayer for SilentPlayer {
    fn play_clip(&mut self, clip: &str) -> Result<(), AudioError> {
        debug!(clip, "silent clip");
        self.clip = Some(clip.to_string());
        Ok(())
    }

    fn stop_clip(&mut self) {
        self.clip = None;
    }

    fn poll_clip_finished(&mut self) -> bool {
        self.clip.take().is_some()
    }

    fn play_music(&mut self, track: &str) -> Result<(), AudioError> {
        debug!(track, "silent music");
        Ok(())
    }

    fn set_music_volume(&mut self, volume: f32) {
        debug!(volume, "silent music volume");
    }

    fn stop_music(&mut self) {}

    fn poll_music_finished(&mut self) -> bool {
        false
    }
}

/// Pick the best available backend for this build.
pub fn default_player(audio_dir: PathBuf) -> Box<dyn AudioPlayer> {
    #[cfg(feature = "audio")]
    {
        match RodioPlayer::new(audio_dir) {
            Ok(player) => return Box::new(player),
            Err(err) => tracing::warn!(%err, "falling back to silent audio"),
        }
    }
    #[cfg(not(feature = "audio"))]
    {
        let _ = audio_dir;
        debug!("built without audio support");
    }
    Box::new(SilentPlayer::new())
}
