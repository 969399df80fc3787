use glam::Vec2;

use crate::render::instance::{pack_rgba, DotInstance, SHAPE_CIRCLE, SHAPE_SQUARE};

/// Pieces spawned per burst.
pub const BURST_SIZE: usize = 50;
/// Maximum concurrent pieces.
const MAX_PIECES: usize = 2048;
/// Spawn height above the top edge (px).
const SPAWN_Y: f32 = -10.0;
/// Total spin over a piece's lifetime (two full turns).
const SPIN_TOTAL: f32 = 2.0 * std::f32::consts::TAU;

const PALETTE: [[u8; 3]; 7] = [
    [0x0C, 0xF2, 0xA0],
    [0x00, 0xFF, 0x9D],
    [0x18, 0xCC, 0xFC],
    [0x63, 0x44, 0xF5],
    [0xAE, 0x48, 0xFF],
    [0xFF, 0x6B, 0x6B],
    [0x4E, 0xCD, 0xC4],
];

/// A single piece of confetti falling from the top edge.
#[derive(Debug, Clone, Copy)]
struct Piece {
    pos: Vec2,
    vel: Vec2,
    rotation: f32,
    spin: f32,
    /// Edge length / diameter in px.
    size: f32,
    color: [u8; 3],
    opacity: f32,
    shape: u32,
    lifetime: f32,
    max_lifetime: f32,
}

/// Celebration confetti: bursts of pieces that fall, spin and fade out.
pub struct ConfettiSystem {
    pieces: Vec<Piece>,
}

impl ConfettiSystem {
    pub fn new() -> Self {
        Self {
            pieces: Vec::with_capacity(BURST_SIZE * 4),
        }
    }

    /// Drop a burst across the full width; each piece crosses the full height.
    pub fn burst(&mut self, screen_w: f32, screen_h: f32, rng: &mut fastrand::Rng) {
        let room = MAX_PIECES.saturating_sub(self.pieces.len());
        for _ in 0..BURST_SIZE.min(room) {
            let lifetime = 2.0 + rng.f32() * 3.0;
            self.pieces.push(Piece {
                pos: Vec2::new(rng.f32() * screen_w, SPAWN_Y),
                vel: Vec2::new(0.0, (screen_h - SPAWN_Y) / lifetime),
                rotation: rng.f32() * std::f32::consts::TAU,
                spin: SPIN_TOTAL / lifetime,
                size: 5.0 + rng.f32() * 10.0,
                color: PALETTE[rng.usize(0..PALETTE.len())],
                opacity: 0.2 + rng.f32() * 0.8,
                shape: if rng.bool() { SHAPE_CIRCLE } else { SHAPE_SQUARE },
                lifetime,
                max_lifetime: lifetime,
            });
        }
        log::debug!("Confetti burst, {} pieces live", self.pieces.len());
    }

    /// Update all pieces: move, spin, age, remove finished.
    pub fn update(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.pieces.len() {
            let p = &mut self.pieces[i];
            p.pos += p.vel * dt;
            p.rotation += p.spin * dt;
            p.lifetime -= dt;

            if p.lifetime <= 0.0 {
                self.pieces.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Append piece instances to the render buffer.
    pub fn build_instances(&self, buf: &mut Vec<DotInstance>) {
        for p in &self.pieces {
            // Linear fade over the whole fall.
            let remaining = (p.lifetime / p.max_lifetime).clamp(0.0, 1.0);
            buf.push(DotInstance {
                position: p.pos.into(),
                radius: p.size * 0.5,
                color: pack_rgba(p.color, p.opacity * remaining),
                shape: p.shape,
                rotation: p.rotation,
            });
        }
    }

    /// Number of live pieces.
    pub fn count(&self) -> usize {
        self.pieces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_spawns_along_top_edge() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut c = ConfettiSystem::new();
        c.burst(800.0, 600.0, &mut rng);
        assert_eq!(c.count(), BURST_SIZE);

        let mut buf = Vec::new();
        c.build_instances(&mut buf);
        for inst in &buf {
            assert!(inst.position[0] >= 0.0 && inst.position[0] < 800.0);
            assert_eq!(inst.position[1], SPAWN_Y);
            assert!(inst.radius >= 2.5 && inst.radius <= 7.5);
            assert!(inst.shape == SHAPE_CIRCLE || inst.shape == SHAPE_SQUARE);
        }
    }

    #[test]
    fn pieces_fall_fade_and_expire() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut c = ConfettiSystem::new();
        c.burst(400.0, 300.0, &mut rng);

        let mut before = Vec::new();
        c.build_instances(&mut before);
        c.update(1.0);
        let mut after = Vec::new();
        c.build_instances(&mut after);

        for (a, b) in before.iter().zip(&after) {
            assert!(b.position[1] > a.position[1]);
            assert!((b.color & 0xFF) <= (a.color & 0xFF));
        }

        // Longest fall is 5s.
        for _ in 0..6 {
            c.update(1.0);
        }
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn live_pieces_are_capped() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut c = ConfettiSystem::new();
        for _ in 0..100 {
            c.burst(100.0, 100.0, &mut rng);
        }
        assert_eq!(c.count(), MAX_PIECES);
    }
}
