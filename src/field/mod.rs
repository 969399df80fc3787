pub mod interaction;
pub mod shimmer;

use glam::Vec2;

use crate::config::FieldConfig;
use crate::render::instance::DotInstance;
use crate::spatial::SpatialGrid;

use self::interaction::{interaction_factor, resolve, DotVisual};

/// One grid point. Only the opacity animation changes after creation.
#[derive(Debug, Clone, Copy)]
pub struct Dot {
    pub pos: Vec2,
    pub target_opacity: f32,
    pub current_opacity: f32,
    /// Opacity change per frame.
    pub opacity_speed: f32,
    pub base_radius: f32,
}

/// A parameterized field of shimmering dots that light up around the pointer.
pub struct DotField {
    config: FieldConfig,
    width: u32,
    height: u32,
    dots: Vec<Dot>,
    grid: SpatialGrid,
    /// Output of the last `update`, one entry per dot.
    visuals: Vec<DotVisual>,
    /// Candidate flags, reused every frame.
    candidates: Vec<bool>,
    candidate_count: usize,
}

impl DotField {
    pub fn new(config: FieldConfig) -> Self {
        let config = config.sanitized();
        Self {
            grid: SpatialGrid::new(config.grid_cell_size()),
            config,
            width: 0,
            height: 0,
            dots: Vec::new(),
            visuals: Vec::new(),
            candidates: Vec::new(),
            candidate_count: 0,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[cfg(test)]
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    #[cfg(test)]
    pub fn visuals(&self) -> &[DotVisual] {
        &self.visuals
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Dots the spatial grid offered for the pointer in the last `update`.
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    #[cfg(test)]
    pub fn is_candidate(&self, index: usize) -> bool {
        self.candidates.get(index).copied().unwrap_or(false)
    }

    /// Replace the configuration and lay the field out again at the current size.
    pub fn set_config(&mut self, config: FieldConfig, rng: &mut fastrand::Rng) {
        self.config = config.sanitized();
        self.rebuild(self.width, self.height, rng);
    }

    /// Recolour in place; the layout and shimmer state are kept.
    pub fn set_base_color(&mut self, rgb: [u8; 3]) {
        self.config.base_color = rgb;
    }

    /// Lay out a fresh grid covering `width` x `height`.
    ///
    /// Produces `ceil(w / spacing) * ceil(h / spacing)` dots, each centred in its
    /// grid cell (the last column/row is clipped to the surface). Replaces the
    /// previous dots and spatial grid entirely. A zero-area size empties the field.
    pub fn rebuild(&mut self, width: u32, height: u32, rng: &mut fastrand::Rng) {
        self.width = width;
        self.height = height;
        self.dots.clear();
        self.grid.reset(self.config.grid_cell_size());

        if width == 0 || height == 0 {
            self.visuals.clear();
            self.candidates.clear();
            self.candidate_count = 0;
            return;
        }

        let cfg = self.config;
        let spacing = cfg.spacing;
        let w = width as f32;
        let h = height as f32;
        let cols = (w / spacing).ceil() as usize;
        let rows = (h / spacing).ceil() as usize;
        self.dots.reserve(cols * rows);

        for i in 0..cols {
            let x = cell_center(i, spacing, w);
            for j in 0..rows {
                let y = cell_center(j, spacing, h);
                let pos = Vec2::new(x, y);

                self.grid.insert(pos, self.dots.len() as u32);

                let opacity = shimmer::random_in_band(rng, cfg.opacity_min, cfg.opacity_max);
                self.dots.push(Dot {
                    pos,
                    target_opacity: opacity,
                    current_opacity: opacity,
                    opacity_speed: shimmer::random_speed(rng),
                    base_radius: cfg.base_radius,
                });
            }
        }

        self.visuals.clear();
        self.visuals.extend(self.dots.iter().map(|d| DotVisual {
            opacity: d.current_opacity,
            radius: d.base_radius,
        }));
        self.candidates.clear();
        self.candidates.resize(self.dots.len(), false);
        self.candidate_count = 0;

        log::debug!(
            "Dot field laid out: {}x{} px, {}x{} dots, {} grid cells",
            width,
            height,
            cols,
            rows,
            self.grid.cell_count()
        );
    }

    /// Advance the shimmer one frame and resolve every dot against the pointer.
    pub fn update(&mut self, pointer: Option<Vec2>, rng: &mut fastrand::Rng) {
        if self.dots.is_empty() {
            return;
        }

        let cfg = self.config;

        self.candidates.fill(false);
        let mut count = 0;
        if let Some(p) = pointer {
            let candidates = &mut self.candidates;
            self.grid.query_radius(p, cfg.interaction_radius, |i| {
                candidates[i as usize] = true;
                count += 1;
            });
        }
        self.candidate_count = count;

        for (i, dot) in self.dots.iter_mut().enumerate() {
            shimmer::step(dot, cfg.opacity_min, cfg.opacity_max, rng);

            let factor = match pointer {
                Some(p) if self.candidates[i] => {
                    interaction_factor(dot.pos.distance_squared(p), cfg.interaction_radius)
                }
                _ => 0.0,
            };

            self.visuals[i] = resolve(dot.current_opacity, dot.base_radius, factor, &cfg);
        }
    }

    /// Append one instance per dot to the render buffer.
    pub fn build_instances(&self, buf: &mut Vec<DotInstance>) {
        let color = self.config.base_color;
        buf.extend(
            self.dots
                .iter()
                .zip(&self.visuals)
                .map(|(dot, visual)| DotInstance::dot(dot.pos, visual, color)),
        );
    }
}

/// Centre of grid cell `i` along an axis of length `extent`, clipped to the axis.
fn cell_center(i: usize, spacing: f32, extent: f32) -> f32 {
    let lo = i as f32 * spacing;
    let hi = (lo + spacing).min(extent);
    (lo + hi) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field(width: u32, height: u32) -> (DotField, fastrand::Rng) {
        let mut rng = fastrand::Rng::with_seed(0xD07);
        let mut f = DotField::new(FieldConfig::default());
        f.rebuild(width, height, &mut rng);
        (f, rng)
    }

    #[test]
    fn hundred_square_canvas_has_sixteen_dots() {
        let (f, _) = field(100, 100);
        assert_eq!(f.len(), 16);

        let mut positions: Vec<(f32, f32)> = f.dots().iter().map(|d| (d.pos.x, d.pos.y)).collect();
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<(f32, f32)> = [12.5, 37.5, 62.5, 87.5]
            .iter()
            .flat_map(|&x| [12.5, 37.5, 62.5, 87.5].into_iter().map(move |y| (x, y)))
            .collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn centred_pointer_reaches_every_dot() {
        let (mut f, mut rng) = field(100, 100);
        f.update(Some(Vec2::new(50.0, 50.0)), &mut rng);

        assert_eq!(f.candidate_count(), 16);
        for (i, (dot, visual)) in f.dots().iter().zip(f.visuals()).enumerate() {
            assert!(f.is_candidate(i));
            assert!(visual.opacity > dot.current_opacity);
            assert!(visual.radius > dot.base_radius);
        }
    }

    #[test]
    fn absent_pointer_leaves_dots_at_rest() {
        let (mut f, mut rng) = field(200, 120);
        f.update(Some(Vec2::new(80.0, 60.0)), &mut rng);
        f.update(None, &mut rng);

        assert_eq!(f.candidate_count(), 0);
        for (dot, visual) in f.dots().iter().zip(f.visuals()) {
            assert_eq!(visual.opacity, dot.current_opacity);
            assert_eq!(visual.radius, dot.base_radius);
        }
    }

    #[test]
    fn pointer_boost_is_not_stored() {
        let (mut f, mut rng) = field(100, 100);
        for _ in 0..50 {
            f.update(Some(Vec2::new(12.5, 12.5)), &mut rng);
        }
        let cfg = *f.config();
        for dot in f.dots() {
            assert!(dot.current_opacity >= cfg.opacity_min);
            assert!(dot.current_opacity <= cfg.opacity_max);
        }
        assert!(f.visuals().iter().all(|v| v.opacity <= 1.0));
    }

    #[test]
    fn partial_cells_stay_inside_canvas() {
        let (f, _) = field(30, 10);
        assert_eq!(f.len(), 2);
        assert_eq!(f.dots()[0].pos, Vec2::new(12.5, 5.0));
        assert_eq!(f.dots()[1].pos, Vec2::new(27.5, 5.0));
    }

    #[test]
    fn resize_replaces_every_dot() {
        let (mut f, mut rng) = field(300, 200);
        assert_eq!(f.len(), 12 * 8);

        f.rebuild(100, 50, &mut rng);
        assert_eq!(f.len(), 4 * 2);
        assert_eq!(f.visuals().len(), f.len());
        assert!(f.dots().iter().all(|d| d.pos.x < 100.0 && d.pos.y < 50.0));

        let mut seen: Vec<(u32, u32)> = f
            .dots()
            .iter()
            .map(|d| (d.pos.x.to_bits(), d.pos.y.to_bits()))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), f.len());
    }

    #[test]
    fn zero_area_empties_field() {
        let (mut f, mut rng) = field(100, 100);
        f.rebuild(0, 100, &mut rng);
        assert_eq!(f.len(), 0);

        f.update(Some(Vec2::new(10.0, 10.0)), &mut rng);
        assert!(f.visuals().is_empty());
        assert_eq!(f.candidate_count(), 0);
    }

    #[test]
    fn config_change_relays_out_at_current_size() {
        let (mut f, mut rng) = field(100, 100);
        let cfg = FieldConfig {
            spacing: 50.0,
            ..FieldConfig::default()
        };
        f.set_config(cfg, &mut rng);
        assert_eq!(f.len(), 4);
        assert_eq!(f.size(), (100, 100));
    }

    #[test]
    fn instances_follow_dot_order() {
        let (mut f, mut rng) = field(100, 100);
        f.update(None, &mut rng);
        let mut buf = Vec::new();
        f.build_instances(&mut buf);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf[0].position, [12.5, 12.5]);
        assert_eq!(buf[1].position, [12.5, 37.5]);
    }

    proptest! {
        #[test]
        fn dot_count_and_bounds_hold_for_any_size(
            width in 0u32..1200,
            height in 0u32..900,
            spacing in 4u32..80,
            seed in any::<u64>(),
        ) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut f = DotField::new(FieldConfig {
                spacing: spacing as f32,
                ..FieldConfig::default()
            });
            f.rebuild(width, height, &mut rng);

            let cols = (width as f32 / spacing as f32).ceil() as usize;
            let rows = (height as f32 / spacing as f32).ceil() as usize;
            prop_assert_eq!(f.len(), cols * rows);

            let cfg = *f.config();
            for d in f.dots() {
                prop_assert!(d.pos.x >= 0.0 && d.pos.x < width as f32);
                prop_assert!(d.pos.y >= 0.0 && d.pos.y < height as f32);
                prop_assert!(d.current_opacity >= cfg.opacity_min);
                prop_assert!(d.current_opacity <= cfg.opacity_max);
            }
        }
    }
}
