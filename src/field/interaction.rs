use crate::config::FieldConfig;

/// What a dot looks like this frame. Never written back to the dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotVisual {
    pub opacity: f32,
    pub radius: f32,
}

/// Pointer influence for a dot at squared distance `dist_sq`.
///
/// Squared linear falloff: 1 under the pointer, 0 at `radius` and beyond.
pub fn interaction_factor(dist_sq: f32, radius: f32) -> f32 {
    if radius <= 0.0 || !(dist_sq < radius * radius) {
        return 0.0;
    }
    let linear = (1.0 - dist_sq.sqrt() / radius).max(0.0);
    linear * linear
}

/// Combine the resting opacity with the pointer boost.
pub fn resolve(current_opacity: f32, base_radius: f32, factor: f32, cfg: &FieldConfig) -> DotVisual {
    DotVisual {
        opacity: (current_opacity + factor * cfg.opacity_boost).min(1.0),
        radius: base_radius + factor * cfg.radius_boost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_peaks_under_pointer_and_vanishes_at_radius() {
        assert_eq!(interaction_factor(0.0, 150.0), 1.0);
        assert_eq!(interaction_factor(150.0 * 150.0, 150.0), 0.0);
        assert_eq!(interaction_factor(400.0 * 400.0, 150.0), 0.0);
        assert!((interaction_factor(75.0 * 75.0, 150.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn factor_is_non_increasing_with_distance() {
        let radius = 150.0;
        let mut prev = f32::INFINITY;
        for step in 0..=300 {
            let d = step as f32 * 0.5;
            let f = interaction_factor(d * d, radius);
            assert!(f <= prev, "factor rose at distance {d}");
            assert!((0.0..=1.0).contains(&f));
            prev = f;
        }
    }

    #[test]
    fn zero_radius_never_interacts() {
        assert_eq!(interaction_factor(0.0, 0.0), 0.0);
    }

    #[test]
    fn opacity_is_capped_at_one() {
        let cfg = FieldConfig {
            opacity_boost: 5.0,
            ..FieldConfig::default()
        };
        let v = resolve(0.5, 1.0, 1.0, &cfg);
        assert_eq!(v.opacity, 1.0);
        assert_eq!(v.radius, 1.0 + cfg.radius_boost);
    }

    #[test]
    fn no_influence_leaves_resting_state() {
        let cfg = FieldConfig::default();
        let v = resolve(0.43, 1.0, 0.0, &cfg);
        assert_eq!(v, DotVisual { opacity: 0.43, radius: 1.0 });
    }
}
