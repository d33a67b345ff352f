use std::time::Duration;

/// What one rendered frame cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub view_uploads: u32,
    /// Batch draws plus part draws.
    pub draw_calls: u32,
    pub batch_vertices: usize,
    pub part_draws: u32,
    /// Set when the static batches were rebaked this frame.
    pub rebuilt: bool,
}

/// Rolling window of frame durations for the HUD and headless reports.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    samples: Vec<Duration>,
    next: usize,
    wrapped: bool,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![Duration::ZERO; window.max(1)],
            next: 0,
            wrapped: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.samples[self.next] = dt;
        self.next = (self.next + 1) % self.samples.len();
        if self.next == 0 {
            self.wrapped = true;
        }
    }

    fn window(&self) -> &[Duration] {
        if self.wrapped {
            &self.samples
        } else {
            &self.samples[..self.next]
        }
    }

    pub fn count(&self) -> usize {
        self.window().len()
    }

    pub fn average(&self) -> Duration {
        let window = self.window();
        if window.is_empty() {
            return Duration::ZERO;
        }
        window.iter().sum::<Duration>() / window.len() as u32
    }

    pub fn min(&self) -> Duration {
        self.window().iter().copied().min().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.window().iter().copied().max().unwrap_or_default()
    }

    /// Frames per second implied by the average; 0 before the first sample.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new(4);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn averages_partial_window() {
        let mut timer = FrameTimer::new(4);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.min(), Duration::from_millis(10));
        assert_eq!(timer.max(), Duration::from_millis(30));
    }

    #[test]
    fn oldest_sample_falls_out() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(40));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(20));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.max(), Duration::from_millis(20));
        assert!((timer.fps() - 50.0).abs() < 0.01);
    }
}
