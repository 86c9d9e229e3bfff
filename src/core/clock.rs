use std::time::Instant;

/// Frame clock: elapsed seconds between ticks plus a smoothed frame rate
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    frames: u32,
    accumulated: f32,
    fps: f32,
}

/// How often the reported frame rate is refreshed, in seconds
const FPS_UPDATE_INTERVAL: f32 = 1.0;

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            frames: 0,
            accumulated: 0.0,
            fps: 0.0,
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.record(delta);
        delta
    }

    /// Frames per second averaged over the last full interval
    pub fn fps(&self) -> f32 {
        self.fps
    }

    fn record(&mut self, delta: f32) {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames as f32 / self.accumulated;
            log::debug!("FPS: {:.1}", self.fps);
            self.frames = 0;
            self.accumulated = 0.0;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
