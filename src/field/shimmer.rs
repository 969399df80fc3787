//! Ambient opacity animation every dot performs while at rest.

use super::Dot;

/// Per-frame opacity speed range: `[SPEED_MIN, SPEED_MIN + SPEED_RANGE)`.
pub const SPEED_MIN: f32 = 0.002;
pub const SPEED_RANGE: f32 = 0.005;
/// Chance per frame that a dot abandons its target early.
const RETARGET_CHANCE: f32 = 0.01;

/// Uniform sample in `[min, max)`.
pub fn random_in_band(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

pub fn random_speed(rng: &mut fastrand::Rng) -> f32 {
    SPEED_MIN + rng.f32() * SPEED_RANGE
}

/// Advance one frame: move toward the target without overshooting, pick a
/// new target on arrival. The result is always inside `[min, max]`.
pub fn step(dot: &mut Dot, min: f32, max: f32, rng: &mut fastrand::Rng) {
    let delta = dot.target_opacity - dot.current_opacity;
    if delta.abs() <= dot.opacity_speed {
        dot.current_opacity = dot.target_opacity;
        dot.target_opacity = random_in_band(rng, min, max);
    } else {
        dot.current_opacity += dot.opacity_speed.copysign(delta);
    }

    if rng.f32() < RETARGET_CHANCE {
        dot.target_opacity = random_in_band(rng, min, max);
    }

    dot.current_opacity = dot.current_opacity.clamp(min, max);
}
