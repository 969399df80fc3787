use glam::Vec2;

/// Where the pointer is over the surface, if anywhere.
///
/// Written by window events, read by the frame loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerState {
    pos: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved to `(x, y)` in surface pixels.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pos = if x.is_finite() && y.is_finite() {
            Some(Vec2::new(x, y))
        } else {
            None
        };
    }

    /// Pointer left the window.
    pub fn leave(&mut self) {
        self.pos = None;
    }

    pub fn position(&self) -> Option<Vec2> {
        self.pos
    }
}
