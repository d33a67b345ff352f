use pasture_kernel::{AudioSink, SoundCue, WalkEdge, WalkLoop};

/// Audio sink that reports cues through the log instead of a mixer.
///
/// Stands in for a real audio device: the footstep loop is edge-triggered
/// exactly as a looping voice would be.
#[derive(Debug, Default)]
pub struct TracingAudio {
    walk: WalkLoop,
    played: u64,
}

impl TracingAudio {
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for TracingAudio {
    fn play_sound(&mut self, cue: SoundCue) {
        self.played += 1;
        tracing::debug!(cue = cue.name(), "play sound");
    }

    fn tick_walk_sound(&mut self, is_moving: bool) {
        match self.walk.update(is_moving) {
            Some(WalkEdge::Start) => tracing::trace!("footsteps start"),
            Some(WalkEdge::Stop) => tracing::trace!("footsteps stop"),
            None => {}
        }
    }
}
