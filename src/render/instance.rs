use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::field::interaction::DotVisual;

/// Anti-aliased filled circle.
pub const SHAPE_CIRCLE: u32 = 0;
/// Filled square (confetti).
pub const SHAPE_SQUARE: u32 = 1;
/// Soft radial falloff (cursor glow).
pub const SHAPE_GLOW: u32 = 2;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DotInstance {
    /// Centre in surface pixels (x, y).
    pub position: [f32; 2],
    /// Radius (circle/glow) or half-extent (square) in pixels.
    pub radius: f32,
    /// sRGB colour + alpha packed as 0xRRGGBBAA.
    pub color: u32,
    /// One of the `SHAPE_*` constants.
    pub shape: u32,
    /// Rotation in radians.
    pub rotation: f32,
}

impl DotInstance {
    /// A grid dot as resolved for this frame.
    pub fn dot(pos: Vec2, visual: &DotVisual, rgb: [u8; 3]) -> Self {
        Self {
            position: pos.into(),
            radius: visual.radius,
            color: pack_rgba(rgb, visual.opacity),
            shape: SHAPE_CIRCLE,
            rotation: 0.0,
        }
    }
}

/// Pack an sRGB triple and a `[0, 1]` alpha as 0xRRGGBBAA.
pub fn pack_rgba(rgb: [u8; 3], alpha: f32) -> u32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
    (rgb[0] as u32) << 24 | (rgb[1] as u32) << 16 | (rgb[2] as u32) << 8 | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels_in_order() {
        assert_eq!(pack_rgba([87, 220, 205], 1.0), 0x57DCCDFF);
        assert_eq!(pack_rgba([0, 0, 0], 0.0), 0x0000_0000);
        assert_eq!(pack_rgba([255, 255, 255], 2.0) & 0xFF, 0xFF);
    }

    #[test]
    fn stride_matches_vertex_layout() {
        assert_eq!(std::mem::size_of::<DotInstance>(), 24);
    }
}
