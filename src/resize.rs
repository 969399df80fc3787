use std::time::Duration;

use instant::Instant;

/// How long the size must hold still before the field is laid out again.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(120);

/// Coalesces a burst of resize events into a single field rebuild.
///
/// The first non-zero size applies immediately; later sizes apply once no
/// new size has arrived for `RESIZE_SETTLE`.
pub struct ResizeDebounce {
    pending: Option<(u32, u32)>,
    last_request: Option<Instant>,
    applied: Option<(u32, u32)>,
}

impl ResizeDebounce {
    pub fn new() -> Self {
        Self {
            pending: None,
            last_request: None,
            applied: None,
        }
    }

    /// Record a new surface size. Zero-area sizes (minimized) are ignored.
    pub fn request(&mut self, width: u32, height: u32, now: Instant) {
        if width == 0 || height == 0 {
            return;
        }
        self.pending = Some((width, height));
        self.last_request = Some(now);
    }

    /// Size to lay out now, if one is due and differs from the current layout.
    pub fn poll(&mut self, now: Instant) -> Option<(u32, u32)> {
        let size = self.pending?;
        let settled = match (self.applied, self.last_request) {
            (None, _) | (_, None) => true,
            (Some(_), Some(at)) => now.saturating_duration_since(at) >= RESIZE_SETTLE,
        };
        if !settled {
            return None;
        }

        self.pending = None;
        if self.applied == Some(size) {
            return None;
        }
        self.applied = Some(size);
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_size_applies_immediately() {
        let t0 = Instant::now();
        let mut d = ResizeDebounce::new();
        assert_eq!(d.poll(t0), None);

        d.request(800, 600, t0);
        assert_eq!(d.poll(t0), Some((800, 600)));
        assert_eq!(d.poll(t0), None);
    }

    #[test]
    fn burst_coalesces_into_last_size() {
        let t0 = Instant::now();
        let mut d = ResizeDebounce::new();
        d.request(800, 600, t0);
        d.poll(t0);

        let step = Duration::from_millis(16);
        for i in 1..=10u32 {
            let t = t0 + step * i;
            d.request(800 + i * 10, 600, t);
            assert_eq!(d.poll(t), None);
        }

        let last = t0 + step * 10;
        assert_eq!(d.poll(last + RESIZE_SETTLE / 2), None);
        assert_eq!(d.poll(last + RESIZE_SETTLE), Some((900, 600)));
        assert_eq!(d.poll(last + RESIZE_SETTLE * 2), None);
    }

    #[test]
    fn zero_and_unchanged_sizes_do_not_rebuild() {
        let t0 = Instant::now();
        let mut d = ResizeDebounce::new();
        d.request(640, 480, t0);
        d.poll(t0);

        d.request(0, 0, t0);
        assert_eq!(d.poll(t0 + RESIZE_SETTLE * 2), None);

        d.request(640, 480, t0);
        assert_eq!(d.poll(t0 + RESIZE_SETTLE), None);
    }
}
