//! Background music for listening mode: a shuffled looping playlist whose
//! volume ducks while a word is spoken.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::engine::scheduler::{Scheduler, TaskHandle};

pub const FADE_STEPS: u32 = 10;
pub const FADE_STEP_MS: u64 = 50;
pub const DEFAULT_NORMAL_VOLUME: f32 = 0.25;
pub const DEFAULT_DUCKED_VOLUME: f32 = 0.08;

#[derive(Clone, Debug, PartialEq)]
pub enum MusicCommand {
    PlayTrack(String),
    SetVolume(f32),
    Stop,
}

/// Linear ramp from one volume to another in a fixed number of steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeFade {
    from: f32,
    to: f32,
    steps: u32,
    step: u32,
}

impl VolumeFade {
    pub fn new(from: f32, to: f32, steps: u32) -> Self {
        Self {
            from,
            to,
            steps: steps.max(1),
            step: 0,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.step >= self.steps
    }

    /// Move one step and return the new volume. The last step lands exactly
    /// on the target.
    pub fn advance(&mut self) -> f32 {
        self.step = (self.step + 1).min(self.steps);
        if self.is_done() {
            return self.to;
        }
        let t = self.step as f32 / self.steps as f32;
        self.from + (self.to - self.from) * t
    }
}

#[derive(Debug)]
struct ActiveFade {
    fade: VolumeFade,
    handle: TaskHandle,
}

#[derive(Debug)]
pub struct BackgroundMusic {
    tracks: Vec<String>,
    order: Vec<usize>,
    position: usize,
    enabled: bool,
    volume: f32,
    normal_volume: f32,
    ducked_volume: f32,
    failed_in_a_row: usize,
    fade: Option<ActiveFade>,
    commands: Vec<MusicCommand>,
    rng: SmallRng,
}

impl BackgroundMusic {
    pub fn new(tracks: Vec<String>, normal_volume: f32, ducked_volume: f32) -> Self {
        Self::with_rng(tracks, normal_volume, ducked_volume, SmallRng::from_entropy())
    }

    pub fn with_rng(
        tracks: Vec<String>,
        normal_volume: f32,
        ducked_volume: f32,
        rng: SmallRng,
    ) -> Self {
        let order = (0..tracks.len()).collect();
        let normal_volume = normal_volume.clamp(0.0, 1.0);
        Self {
            tracks,
            order,
            position: 0,
            enabled: false,
            volume: normal_volume,
            normal_volume,
            ducked_volume: ducked_volume.clamp(0.0, 1.0),
            failed_in_a_row: 0,
            fade: None,
            commands: Vec::new(),
            rng,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn current_track(&self) -> Option<&str> {
        let idx = *self.order.get(self.position)?;
        self.tracks.get(idx).map(String::as_str)
    }

    pub fn drain_commands(&mut self) -> Vec<MusicCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Returns the new enabled state. Enabling with an empty playlist is a
    /// no-op.
    pub fn toggle<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        if self.enabled {
            self.disable(scheduler);
        } else {
            self.enable();
        }
        self.enabled
    }

    pub fn enable(&mut self) {
        if self.enabled || self.tracks.is_empty() {
            return;
        }
        self.enabled = true;
        self.failed_in_a_row = 0;
        self.order.shuffle(&mut self.rng);
        self.position = 0;
        self.volume = self.normal_volume;
        info!(tracks = self.tracks.len(), "background music on");
        self.play_current();
    }

    pub fn disable<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if !self.enabled {
            return;
        }
        self.cancel_fade(scheduler);
        self.enabled = false;
        self.commands.push(MusicCommand::Stop);
        info!("background music off");
    }

    /// The current track finished; move to the next one, reshuffling when
    /// the playlist wraps.
    pub fn track_finished(&mut self) {
        if !self.enabled {
            return;
        }
        self.failed_in_a_row = 0;
        self.next_track();
        self.play_current();
    }

    /// The current track could not start. Skip it; give up once every
    /// track has failed in a row. Returns false when music was switched off.
    pub fn track_failed<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        if !self.enabled {
            return false;
        }
        self.failed_in_a_row += 1;
        if self.failed_in_a_row >= self.tracks.len() {
            warn!("every music track failed to play");
            self.disable(scheduler);
            return false;
        }
        self.next_track();
        self.play_current();
        true
    }

    pub fn duck<T>(&mut self, scheduler: &mut Scheduler<T>, now_ms: u64, step_task: T) {
        self.fade_to(self.ducked_volume, scheduler, now_ms, step_task);
    }

    pub fn restore<T>(&mut self, scheduler: &mut Scheduler<T>, now_ms: u64, step_task: T) {
        self.fade_to(self.normal_volume, scheduler, now_ms, step_task);
    }

    /// Handle a fired fade step: apply the next volume and schedule the
    /// following step unless the ramp is finished.
    pub fn on_fade_step<T>(&mut self, scheduler: &mut Scheduler<T>, due_ms: u64, step_task: T) {
        let Some(mut active) = self.fade.take() else {
            return;
        };
        self.volume = active.fade.advance();
        self.commands.push(MusicCommand::SetVolume(self.volume));
        if !active.fade.is_done() {
            active.handle = scheduler.schedule(due_ms + FADE_STEP_MS, step_task);
            self.fade = Some(active);
        }
    }

    fn fade_to<T>(&mut self, target: f32, scheduler: &mut Scheduler<T>, now_ms: u64, step_task: T) {
        self.cancel_fade(scheduler);
        if !self.enabled {
            return;
        }
        debug!(from = self.volume, to = target, "music fade");
        let fade = VolumeFade::new(self.volume, target, FADE_STEPS);
        let handle = scheduler.schedule(now_ms + FADE_STEP_MS, step_task);
        self.fade = Some(ActiveFade { fade, handle });
    }

    fn cancel_fade<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(active) = self.fade.take() {
            scheduler.cancel(active.handle);
        }
    }

    fn next_track(&mut self) {
        self.position += 1;
        if self.position >= self.order.len() {
            self.position = 0;
            self.order.shuffle(&mut self.rng);
            debug!("music playlist reshuffled");
        }
    }

    fn play_current(&mut self) {
        if let Some(track) = self.current_track().map(str::to_string) {
            self.commands.push(MusicCommand::PlayTrack(track));
            self.commands.push(MusicCommand::SetVolume(self.volume));
        }
    }
}
