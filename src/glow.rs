use glam::Vec2;

use crate::render::instance::{pack_rgba, DotInstance, SHAPE_GLOW};

/// Halo radius (px).
pub const GLOW_RADIUS: f32 = 400.0;
/// Peak halo opacity.
pub const GLOW_INTENSITY: f32 = 0.3;
/// Halo colour, the leading stop of the brand gradient (#0CF2A0).
pub const GLOW_COLOR: [u8; 3] = [0x0C, 0xF2, 0xA0];
/// Fade time constant (seconds). Three of these make a 300ms transition.
const FADE_TAU: f32 = 0.1;
/// Below this visibility the halo is not drawn.
const MIN_VISIBLE: f32 = 0.001;

/// Soft halo that trails the pointer, fading in on enter and out on leave.
pub struct CursorGlow {
    pos: Vec2,
    visibility: f32,
    pub radius: f32,
    pub intensity: f32,
    pub enabled: bool,
}

impl CursorGlow {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            visibility: 0.0,
            radius: GLOW_RADIUS,
            intensity: GLOW_INTENSITY,
            enabled: true,
        }
    }

    /// Follow the pointer and ease visibility toward 1 (present) or 0 (absent).
    /// Keeps the last known position while fading out.
    pub fn update(&mut self, pointer: Option<Vec2>, dt: f32) {
        let target = match pointer {
            Some(p) => {
                self.pos = p;
                1.0
            }
            None => 0.0,
        };
        let k = 1.0 - (-dt.max(0.0) / FADE_TAU).exp();
        self.visibility += (target - self.visibility) * k;
    }

    pub fn visibility(&self) -> f32 {
        self.visibility
    }

    pub fn opacity(&self) -> f32 {
        self.intensity * self.visibility
    }

    pub fn instance(&self) -> Option<DotInstance> {
        if !self.enabled || self.visibility < MIN_VISIBLE {
            return None;
        }
        Some(DotInstance {
            position: self.pos.into(),
            radius: self.radius,
            color: pack_rgba(GLOW_COLOR, self.opacity()),
            shape: SHAPE_GLOW,
            rotation: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_in_while_present() {
        let mut g = CursorGlow::new();
        assert!(g.instance().is_none());

        let mut prev = 0.0;
        for _ in 0..18 {
            g.update(Some(Vec2::new(100.0, 50.0)), 1.0 / 60.0);
            assert!(g.visibility() > prev);
            prev = g.visibility();
        }
        // 300ms in, the transition is about 95% done.
        assert!(g.visibility() > 0.9 && g.visibility() < 1.0);
        assert!(g.opacity() <= GLOW_INTENSITY);

        let inst = g.instance().unwrap();
        assert_eq!(inst.position, [100.0, 50.0]);
        assert_eq!(inst.shape, SHAPE_GLOW);
        assert_eq!(inst.color >> 8, 0x0CF2A0);
    }

    #[test]
    fn fades_out_in_place_after_leave() {
        let mut g = CursorGlow::new();
        for _ in 0..120 {
            g.update(Some(Vec2::new(30.0, 40.0)), 1.0 / 60.0);
        }
        for _ in 0..600 {
            g.update(None, 1.0 / 60.0);
        }
        assert!(g.visibility() < MIN_VISIBLE);
        assert!(g.instance().is_none());
    }

    #[test]
    fn disabled_glow_is_not_drawn() {
        let mut g = CursorGlow::new();
        g.enabled = false;
        g.update(Some(Vec2::ONE), 10.0);
        assert!(g.instance().is_none());
    }
}
