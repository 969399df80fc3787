/// Colour theme. Fields differ only in their dot colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Aqua,
    Emerald,
}

impl Theme {
    pub fn label(self) -> &'static str {
        match self {
            Theme::Aqua => "Aqua",
            Theme::Emerald => "Emerald",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Theme::Aqua => Theme::Emerald,
            Theme::Emerald => Theme::Aqua,
        }
    }

    /// Base dot colour (r, g, b).
    pub fn base_color(self) -> [u8; 3] {
        match self {
            Theme::Aqua => [87, 220, 205],
            Theme::Emerald => [34, 197, 94],
        }
    }

    pub fn all() -> &'static [Theme] {
        &ALL_THEMES
    }
}

const ALL_THEMES: [Theme; 2] = [Theme::Aqua, Theme::Emerald];

/// Distance between neighbouring dots (px).
pub const DEFAULT_SPACING: f32 = 25.0;
/// Ambient shimmer band.
pub const DEFAULT_OPACITY_MIN: f32 = 0.40;
pub const DEFAULT_OPACITY_MAX: f32 = 0.50;
/// Resting dot radius (px).
pub const DEFAULT_BASE_RADIUS: f32 = 1.0;
/// Pointer influence distance (px).
pub const DEFAULT_INTERACTION_RADIUS: f32 = 150.0;
/// Peak extra opacity right under the pointer.
pub const DEFAULT_OPACITY_BOOST: f32 = 0.6;
/// Peak extra radius right under the pointer (px).
pub const DEFAULT_RADIUS_BOOST: f32 = 2.5;
/// Smallest spatial index cell (px).
const MIN_CELL_SIZE: f32 = 50.0;

/// Construction-time parameters of a dot field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub spacing: f32,
    pub opacity_min: f32,
    pub opacity_max: f32,
    pub base_radius: f32,
    pub interaction_radius: f32,
    pub opacity_boost: f32,
    pub radius_boost: f32,
    pub base_color: [u8; 3],
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::themed(Theme::Aqua)
    }
}

impl FieldConfig {
    /// Default parameters with the colour of `theme`.
    pub fn themed(theme: Theme) -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            opacity_min: DEFAULT_OPACITY_MIN,
            opacity_max: DEFAULT_OPACITY_MAX,
            base_radius: DEFAULT_BASE_RADIUS,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            opacity_boost: DEFAULT_OPACITY_BOOST,
            radius_boost: DEFAULT_RADIUS_BOOST,
            base_color: theme.base_color(),
        }
    }

    /// Copy with every value forced into a usable range.
    /// Spacing is at least 1px, the band is ordered and inside [0, 1],
    /// radii and boosts are non-negative.
    pub fn sanitized(self) -> Self {
        let clamp01 = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let non_neg = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };

        let a = clamp01(self.opacity_min);
        let b = clamp01(self.opacity_max);
        let spacing = if self.spacing.is_finite() {
            self.spacing.max(1.0)
        } else {
            DEFAULT_SPACING
        };

        Self {
            spacing,
            opacity_min: a.min(b),
            opacity_max: a.max(b),
            base_radius: non_neg(self.base_radius),
            interaction_radius: non_neg(self.interaction_radius),
            opacity_boost: non_neg(self.opacity_boost),
            radius_boost: non_neg(self.radius_boost),
            base_color: self.base_color,
        }
    }

    /// Spatial index cell size. An interaction radius spans roughly 1-2 cells.
    pub fn grid_cell_size(&self) -> f32 {
        MIN_CELL_SIZE.max((self.interaction_radius / 1.5).floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_has_floor_of_fifty() {
        let mut cfg = FieldConfig::default();
        assert_eq!(cfg.grid_cell_size(), 100.0);

        cfg.interaction_radius = 30.0;
        assert_eq!(cfg.grid_cell_size(), 50.0);

        cfg.interaction_radius = 200.0;
        assert_eq!(cfg.grid_cell_size(), 133.0);
    }

    #[test]
    fn sanitized_orders_band_and_rejects_bad_spacing() {
        let cfg = FieldConfig {
            spacing: 0.0,
            opacity_min: 0.9,
            opacity_max: 1.4,
            radius_boost: -3.0,
            ..FieldConfig::default()
        }
        .sanitized();

        assert_eq!(cfg.spacing, 1.0);
        assert_eq!(cfg.opacity_min, 0.9);
        assert_eq!(cfg.opacity_max, 1.0);
        assert_eq!(cfg.radius_boost, 0.0);

        let nan = FieldConfig {
            spacing: f32::NAN,
            ..FieldConfig::default()
        }
        .sanitized();
        assert_eq!(nan.spacing, DEFAULT_SPACING);
    }

    #[test]
    fn themes_cycle() {
        assert_eq!(Theme::Aqua.next(), Theme::Emerald);
        assert_eq!(Theme::Emerald.next(), Theme::Aqua);
        assert_eq!(FieldConfig::themed(Theme::Emerald).base_color, [34, 197, 94]);
    }
}
