use std::collections::BTreeMap;

use pasture_kernel::{AudioSink, Controls, SoundCue};

const STRAFE_PERIOD: u64 = 90;
const SWEEP_PERIOD: u64 = 120;

/// Canned input for headless runs: strafe back and forth, sweep the view
/// left and right, and hold the trigger.
pub fn scripted_controls(frame: u64) -> Controls {
    let strafe_left = (frame / STRAFE_PERIOD) % 2 == 0;
    let sweep_left = (frame / SWEEP_PERIOD) % 2 == 0;
    Controls {
        left: strafe_left,
        right: !strafe_left,
        pan_left: sweep_left,
        pan_right: !sweep_left,
        fire: true,
        ..Controls::default()
    }
}

/// Audio sink that only counts what it was asked to play.
#[derive(Debug, Default)]
pub struct CountingAudio {
    pub cues: BTreeMap<&'static str, u64>,
    pub walking_frames: u64,
}

impl AudioSink for CountingAudio {
    fn play_sound(&mut self, cue: SoundCue) {
        *self.cues.entry(cue.name()).or_default() += 1;
    }

    fn tick_walk_sound(&mut self, is_moving: bool) {
        if is_moving {
            self.walking_frames += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_always_fires_and_never_conflicts() {
        for frame in 0..1_000 {
            let c = scripted_controls(frame);
            assert!(c.fire);
            assert_ne!(c.left, c.right);
            assert_ne!(c.pan_left, c.pan_right);
            assert!(!c.place_block && !c.remove_block);
        }
    }

    #[test]
    fn strafe_direction_alternates() {
        assert!(scripted_controls(0).left);
        assert!(scripted_controls(STRAFE_PERIOD).right);
        assert!(scripted_controls(2 * STRAFE_PERIOD).left);
    }

    #[test]
    fn counts_cues_by_name() {
        let mut audio = CountingAudio::default();
        audio.play_sound(SoundCue::Shoot);
        audio.play_sound(SoundCue::Shoot);
        audio.play_sound(SoundCue::Hit);
        audio.tick_walk_sound(true);
        audio.tick_walk_sound(false);
        assert_eq!(audio.cues["shoot"], 2);
        assert_eq!(audio.cues["hit"], 1);
        assert_eq!(audio.walking_frames, 1);
    }
}
