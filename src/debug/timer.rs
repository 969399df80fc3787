use instant::Instant;

/// Which part of a frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    Layout = 0,
    Field = 1,
    Effects = 2,
    BuildInstances = 3,
    GpuUpload = 4,
    RenderSubmit = 5,
}

const PHASE_COUNT: usize = 6;

impl SystemPhase {
    pub const ALL: [SystemPhase; PHASE_COUNT] = [
        Self::Layout,
        Self::Field,
        Self::Effects,
        Self::BuildInstances,
        Self::GpuUpload,
        Self::RenderSubmit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Layout => "Layout",
            Self::Field => "Field",
            Self::Effects => "Effects",
            Self::BuildInstances => "Build Inst.",
            Self::GpuUpload => "GPU Upload",
            Self::RenderSubmit => "Render",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
        }
    }

    /// Run `f`, folding its wall time into `phase`.
    pub fn time<R>(&mut self, phase: SystemPhase, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.record(phase, start.elapsed().as_secs_f64() * 1_000_000.0);
        out
    }

    pub fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_moves_toward_samples() {
        let mut t = SystemTimers::new();
        t.record(SystemPhase::Field, 100.0);
        assert!((t.durations_us[1] - 10.0).abs() < 1e-9);
        t.record(SystemPhase::Field, 100.0);
        assert!((t.durations_us[1] - 19.0).abs() < 1e-9);
        assert!((t.total_us() - 19.0).abs() < 1e-9);
    }

    #[test]
    fn time_returns_closure_value() {
        let mut t = SystemTimers::new();
        let v = t.time(SystemPhase::Layout, || 41 + 1);
        assert_eq!(v, 42);
        assert!(t.durations_us[0] >= 0.0);
    }
}
