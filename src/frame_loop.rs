use instant::Instant;

/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Longest frame delta handed to animations (seconds); stalls are clamped.
const MAX_FRAME_DT: f64 = 0.25;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    since_log: f64,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            since_log: 0.0,
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);
        self.since_log += dt;

        if self.since_log >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / self.since_log;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.since_log = 0.0;
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Loop lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// The per-frame animation loop. Frames only advance between `start` and `stop`.
pub struct FrameLoop {
    state: LoopState,
    last_frame_time: Option<Instant>,
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Stopped,
            last_frame_time: None,
            stats: FrameStats::new(),
        }
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }
        self.state = LoopState::Running;
        self.last_frame_time = None;
        log::info!("Frame loop started");
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        self.last_frame_time = None;
        log::info!("Frame loop stopped after {} frames", self.stats.frame_count);
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Begin a frame at `now`. Returns the seconds since the previous frame
    /// (0 for the first frame after `start`), or `None` while stopped.
    pub fn begin_frame(&mut self, now: Instant) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let dt = match self.last_frame_time {
            Some(last) => now
                .saturating_duration_since(last)
                .as_secs_f64()
                .min(MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_frame_time = Some(now);
        if dt > 0.0 {
            self.stats.record_frame(dt);
        }
        Some(dt)
    }

    /// Frames recorded since launch.
    pub fn frame_count(&self) -> u64 {
        self.stats.frame_count
    }
}
