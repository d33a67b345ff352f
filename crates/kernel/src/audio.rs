use serde::{Deserialize, Serialize};

/// One-shot sound events raised during a simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Shoot,
    Hit,
    Kill,
    Hurt,
    Jump,
    BlockPlace,
    BlockBreak,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Hit => "hit",
            SoundCue::Kill => "kill",
            SoundCue::Hurt => "hurt",
            SoundCue::Jump => "jump",
            SoundCue::BlockPlace => "block_place",
            SoundCue::BlockBreak => "block_break",
        }
    }
}

/// Fire-and-forget audio output.
///
/// Implementations swallow playback failures; gameplay never waits on audio.
pub trait AudioSink {
    fn play_sound(&mut self, cue: SoundCue);

    /// Level-triggered: called every frame with whether the player is walking.
    fn tick_walk_sound(&mut self, is_moving: bool);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _cue: SoundCue) {}

    fn tick_walk_sound(&mut self, _is_moving: bool) {}
}

/// Edge detector turning the per-frame walking level into loop start/stop.
#[derive(Debug, Default)]
pub struct WalkLoop {
    playing: bool,
}

/// Transition produced by [`WalkLoop::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEdge {
    Start,
    Stop,
}

impl WalkLoop {
    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn update(&mut self, is_moving: bool) -> Option<WalkEdge> {
        match (self.playing, is_moving) {
            (false, true) => {
                self.playing = true;
                Some(WalkEdge::Start)
            }
            (true, false) => {
                self.playing = false;
                Some(WalkEdge::Stop)
            }
            _ => None,
        }
    }
}
