/// Fixed simulation step in seconds (60 Hz).
pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;
/// Longest wall-clock frame the scheduler will try to catch up on, in seconds.
/// Anything longer is clamped so a stalled tab cannot trigger a spiral of death.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Receiver of the scheduler's two callbacks.
///
/// `update` runs zero or more times per frame with a constant `dt`; `render`
/// runs exactly once per frame with the interpolation factor between the last
/// two simulated states.
pub trait FrameHandler {
    fn update(&mut self, dt: f32);
    fn render(&mut self, alpha: f32);
}

/// What happened during one host frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Fixed updates executed this frame.
    pub steps: u32,
    /// `accumulator / timestep` after draining, in `[0, 1)`.
    pub alpha: f32,
    /// Whether the wall-clock delta was clamped to `max_frame_time`.
    pub clamped: bool,
}

/// Fixed-timestep accumulator driven by the host's display-refresh callback.
///
/// The host calls [`Scheduler::start`] once and then [`Scheduler::frame`] from
/// every animation frame with a monotonic timestamp in seconds.
#[derive(Debug, Clone)]
pub struct Scheduler {
    timestep: f64,
    max_frame_time: f64,
    accumulator: f64,
    last_time: f64,
    running: bool,
    total_steps: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_timestep(FIXED_TIMESTEP, MAX_FRAME_TIME)
    }

    pub fn with_timestep(timestep: f64, max_frame_time: f64) -> Self {
        Self {
            timestep,
            max_frame_time,
            accumulator: 0.0,
            last_time: 0.0,
            running: false,
            total_steps: 0,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.running = true;
        self.last_time = now;
        self.accumulator = 0.0;
    }

    /// Halt future scheduling. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(steps = self.total_steps, "scheduler stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Advance by one host frame. Returns `None` when the scheduler is stopped.
    pub fn frame<H: FrameHandler>(&mut self, now: f64, handler: &mut H) -> Option<FrameReport> {
        if !self.running {
            return None;
        }

        let mut delta = (now - self.last_time).max(0.0);
        self.last_time = now;

        let clamped = delta > self.max_frame_time;
        if clamped {
            tracing::warn!(
                "frame took {:.1}ms, clamping to {:.0}ms",
                delta * 1000.0,
                self.max_frame_time * 1000.0
            );
            delta = self.max_frame_time;
        }

        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.timestep {
            handler.update(self.timestep as f32);
            self.accumulator -= self.timestep;
            steps += 1;
        }
        self.total_steps += u64::from(steps);

        let alpha = (self.accumulator / self.timestep) as f32;
        handler.render(alpha);

        Some(FrameReport {
            steps,
            alpha,
            clamped,
        })
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
