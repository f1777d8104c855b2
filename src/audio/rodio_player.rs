use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::{AudioError, AudioPlayer, resolve_clip};

/// Speaker output through rodio. Each clip and each music track gets its
/// own sink so stopping one never affects the other.
pub struct RodioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    audio_dir: PathBuf,
    clip: Option<Sink>,
    music: Option<Sink>,
    music_volume: f32,
}

impl RodioPlayer {
    pub fn new(audio_dir: PathBuf) -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            audio_dir,
            clip: None,
            music: None,
            music_volume: 1.0,
        })
    }

    fn open(&self, path: &Path, volume: f32) -> Result<Sink, AudioError> {
        if !path.exists() {
            return Err(AudioError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Output(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(source);
        Ok(sink)
    }
}

impl AudioPlayer for RodioPlayer {
    fn play_clip(&mut self, clip: &str) -> Result<(), AudioError> {
        self.stop_clip();
        let path = resolve_clip(&self.audio_dir, clip);
        debug!(path = %path.display(), "play clip");
        self.clip = Some(self.open(&path, 1.0)?);
        Ok(())
    }

    fn stop_clip(&mut self) {
        if let Some(sink) = self.clip.take() {
            sink.stop();
        }
    }

    fn poll_clip_finished(&mut self) -> bool {
        if self.clip.as_ref().is_some_and(Sink::empty) {
            self.clip = None;
            return true;
        }
        false
    }

    fn play_music(&mut self, track: &str) -> Result<(), AudioError> {
        self.stop_music();
        debug!(track, "play music");
        self.music = Some(self.open(Path::new(track), self.music_volume)?);
        Ok(())
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.music {
            sink.set_volume(self.music_volume);
        }
    }

    fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }

    fn poll_music_finished(&mut self) -> bool {
        if self.music.as_ref().is_some_and(Sink::empty) {
            self.music = None;
            return true;
        }
        false
    }
}
