pub mod timer;

use std::collections::VecDeque;

use glam::Vec2;
use winit::window::Window;

use self::timer::{SystemPhase, SystemTimers};
use crate::config::{FieldConfig, Theme};
use crate::render::GpuState;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;

/// Present modes the overlay can offer, in menu order.
const PRESENT_MODE_CHOICES: [wgpu::PresentMode; 3] = [
    wgpu::PresentMode::Fifo,
    wgpu::PresentMode::Mailbox,
    wgpu::PresentMode::Immediate,
];

/// Per-frame numbers the app hands to the overlay.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameReport {
    pub dot_count: usize,
    pub candidate_count: usize,
    pub confetti_count: usize,
    pub field_size: (u32, u32),
    pub pointer: Option<Vec2>,
    pub glow_visibility: f32,
    pub frame_count: u64,
}

/// Debug overlay powered by egui. Shows frame timing and edits the field config live.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Rolling window of frame times (seconds).
    frame_times: VecDeque<f64>,
    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    pub report: FrameReport,

    /// Editable field parameters, applied by the app when `config_changed`.
    pub config: FieldConfig,
    pub config_changed: bool,
    pub theme: Theme,
    pub theme_changed: bool,
    pub show_glow: bool,
    /// Modes the surface supports, Fifo first.
    present_modes: Vec<wgpu::PresentMode>,
    pub present_mode_index: usize,
    pub present_mode_changed: bool,

    /// Textures egui released last frame, freed once that frame is submitted.
    pending_free: Vec<egui::TextureId>,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState, config: FieldConfig, theme: Theme) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            frame_times: VecDeque::with_capacity(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            report: FrameReport::default(),
            config,
            config_changed: false,
            theme,
            theme_changed: false,
            show_glow: true,
            present_modes: offered_present_modes(&gpu.present_modes),
            present_mode_index: 0,
            present_mode_changed: false,
            pending_free: Vec::new(),
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Record a frame time and refresh the rolling stats.
    pub fn record_frame(&mut self, dt: f64) {
        if self.frame_times.len() == FRAME_HISTORY_LEN {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);

        let len = self.frame_times.len() as f64;
        let sum: f64 = self.frame_times.iter().sum();
        self.frame_time_avg = sum / len;
        self.frame_time_min = self.frame_times.iter().copied().fold(f64::MAX, f64::min);
        self.frame_time_max = self.frame_times.iter().copied().fold(0.0, f64::max);
        self.fps = if self.frame_time_avg > 0.0 {
            1.0 / self.frame_time_avg
        } else {
            0.0
        };
    }

    /// Mirror changes made outside the overlay (theme hotkey) into the controls.
    pub fn sync(&mut self, config: FieldConfig, theme: Theme) {
        self.config = config;
        self.theme = theme;
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        self.visible && response.consumed
    }

    /// The selected present mode.
    pub fn selected_present_mode(&self) -> wgpu::PresentMode {
        self.present_modes
            .get(self.present_mode_index)
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo)
    }

    /// Run the egui frame and encode it on top of `view`.
    /// Returns command buffers egui needs submitted before `encoder`.
    pub fn paint(
        &mut self,
        window: &Window,
        gpu: &GpuState,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        timers: &SystemTimers,
    ) -> Vec<wgpu::CommandBuffer> {
        // The frame that released these has been submitted by now.
        for id in self.pending_free.drain(..) {
            self.egui_renderer.free_texture(&id);
        }

        let output = self.run_ui(window, timers);
        self.egui_state
            .handle_platform_output(window, output.platform_output);

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.surface_config.width, gpu.surface_config.height],
            pixels_per_point: output.pixels_per_point,
        };
        let primitives = self
            .egui_ctx
            .tessellate(output.shapes, output.pixels_per_point);

        for (id, delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        let cmd_bufs = self.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            encoder,
            &primitives,
            &screen,
        );

        let mut pass = overlay_pass(encoder, view);
        self.egui_renderer.render(&mut pass, &primitives, &screen);
        drop(pass);

        self.pending_free.extend(output.textures_delta.free);
        cmd_bufs
    }

    /// Lay out the window and fold control edits back into the change flags.
    fn run_ui(&mut self, window: &Window, timers: &SystemTimers) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        // egui_ctx.run borrows self, so the closure works on copies.
        let snapshot = UiSnapshot {
            visible: self.visible,
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_time_min: self.frame_time_min,
            frame_time_max: self.frame_time_max,
            frame_times: self.frame_times.iter().copied().collect(),
            phase_us: timers.durations_us,
            total_us: timers.total_us(),
            report: self.report,
            present_modes: self.present_modes.clone(),
        };
        let mut controls = Controls {
            config: self.config,
            theme: self.theme,
            show_glow: self.show_glow,
            present_mode_index: self.present_mode_index,
        };

        let ctx = self.egui_ctx.clone();
        let output = ctx.run(raw_input, |ctx| draw_ui(ctx, &snapshot, &mut controls));

        self.config_changed |= controls.config != self.config;
        self.theme_changed |= controls.theme != self.theme;
        self.present_mode_changed |= controls.present_mode_index != self.present_mode_index;
        self.config = controls.config;
        self.theme = controls.theme;
        self.show_glow = controls.show_glow;
        self.present_mode_index = controls.present_mode_index;

        output
    }
}

/// Pass that draws over the field without clearing it.
fn overlay_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
) -> wgpu::RenderPass<'static> {
    encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
        .forget_lifetime()
}

/// The choices from `PRESENT_MODE_CHOICES` that `supported` lists. Fifo is
/// always offered since every surface must support it.
fn offered_present_modes(supported: &[wgpu::PresentMode]) -> Vec<wgpu::PresentMode> {
    PRESENT_MODE_CHOICES
        .into_iter()
        .filter(|m| *m == wgpu::PresentMode::Fifo || supported.contains(m))
        .collect()
}

fn present_mode_label(mode: wgpu::PresentMode) -> &'static str {
    match mode {
        wgpu::PresentMode::Fifo => "Fifo (vsync)",
        wgpu::PresentMode::Mailbox => "Mailbox",
        wgpu::PresentMode::Immediate => "Immediate",
        _ => "Other",
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    fps: f64,
    frame_time_avg: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frame_times: Vec<f64>,
    phase_us: [f64; 6],
    total_us: f64,
    report: FrameReport,
    present_modes: Vec<wgpu::PresentMode>,
}

/// Values the UI may edit.
struct Controls {
    config: FieldConfig,
    theme: Theme,
    show_glow: bool,
    present_mode_index: usize,
}

fn draw_ui(ctx: &egui::Context, s: &UiSnapshot, c: &mut Controls) {
    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(320.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", s.fps));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                s.frame_time_avg * 1000.0,
                s.frame_time_min * 1000.0,
                s.frame_time_max * 1000.0,
            ));
            frame_histogram(ui, &s.frame_times);
            ui.add_space(4.0);

            // --- Phase timers ---
            ui.heading("Frame Phases");
            let total = s.total_us.max(1.0);
            for phase in SystemPhase::ALL {
                let us = s.phase_us[phase as usize];
                ui.label(
                    egui::RichText::new(format!(
                        "{:<12}{:>6.0}us ({:>2.0}%)",
                        phase.label(),
                        us,
                        us / total * 100.0
                    ))
                    .monospace(),
                );
            }
            ui.label(format!("Total: {:.0}us | Frames: {}", s.total_us, s.report.frame_count));
            ui.add_space(4.0);

            // --- Field ---
            ui.heading("Field");
            let (w, h) = s.report.field_size;
            ui.label(format!("Surface: {w}x{h} | Dots: {}", s.report.dot_count));
            ui.label(format!(
                "Candidates: {} | Confetti: {}",
                s.report.candidate_count, s.report.confetti_count
            ));
            match s.report.pointer {
                Some(p) => ui.label(format!("Pointer: ({:.0}, {:.0})", p.x, p.y)),
                None => ui.label("Pointer: outside"),
            };
            ui.label(format!("Glow: {:.0}%", s.report.glow_visibility * 100.0));
            ui.add_space(4.0);

            // --- Controls ---
            ui.heading("Controls");
            let cfg = &mut c.config;
            ui.add(egui::Slider::new(&mut cfg.spacing, 5.0..=100.0).text("Spacing"));
            ui.add(egui::Slider::new(&mut cfg.opacity_min, 0.0..=1.0).text("Opacity min"));
            ui.add(egui::Slider::new(&mut cfg.opacity_max, 0.0..=1.0).text("Opacity max"));
            ui.add(egui::Slider::new(&mut cfg.base_radius, 0.25..=6.0).text("Base radius"));
            ui.add(
                egui::Slider::new(&mut cfg.interaction_radius, 0.0..=500.0)
                    .text("Interaction radius"),
            );
            ui.add(egui::Slider::new(&mut cfg.opacity_boost, 0.0..=1.0).text("Opacity boost"));
            ui.add(egui::Slider::new(&mut cfg.radius_boost, 0.0..=10.0).text("Radius boost"));

            ui.horizontal(|ui| {
                ui.label("Theme:");
                egui::ComboBox::from_id_salt("theme")
                    .selected_text(c.theme.label())
                    .show_ui(ui, |ui| {
                        for &t in Theme::all() {
                            ui.selectable_value(&mut c.theme, t, t.label());
                        }
                    });
            });
            ui.checkbox(&mut c.show_glow, "Cursor glow");

            let selected = s
                .present_modes
                .get(c.present_mode_index)
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo);
            ui.horizontal(|ui| {
                ui.label("Present:");
                egui::ComboBox::from_id_salt("present_mode")
                    .selected_text(present_mode_label(selected))
                    .show_ui(ui, |ui| {
                        for (i, &mode) in s.present_modes.iter().enumerate() {
                            ui.selectable_value(
                                &mut c.present_mode_index,
                                i,
                                present_mode_label(mode),
                            );
                        }
                    });
            });
            ui.add_space(4.0);

            ui.label("T: Theme | Click: Confetti | F12: Toggle | ESC: Quit");
        });
}

fn frame_histogram(ui: &mut egui::Ui, frame_times: &[f64]) {
    if frame_times.is_empty() {
        return;
    }
    let max_time = frame_times.iter().copied().fold(0.0f64, f64::max).max(0.020);

    let (response, painter) = ui.allocate_painter(egui::vec2(300.0, 60.0), egui::Sense::hover());
    let rect = response.rect;
    let bar_width = rect.width() / frame_times.len() as f32;
    let target_y = rect.bottom() - (0.01667 / max_time as f32) * rect.height();

    for (i, &t) in frame_times.iter().enumerate() {
        let h = (t / max_time) as f32 * rect.height();
        let x = rect.left() + i as f32 * bar_width;
        let color = if t > 0.01667 {
            egui::Color32::from_rgb(255, 100, 80)
        } else {
            egui::Color32::from_rgb(80, 200, 120)
        };
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(x, rect.bottom() - h),
                egui::pos2(x + bar_width, rect.bottom()),
            ),
            0.0,
            color,
        );
    }

    // 60 Hz budget line
    painter.line_segment(
        [
            egui::pos2(rect.left(), target_y),
            egui::pos2(rect.right(), target_y),
        ],
        egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 255, 100)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn only_supported_present_modes_are_offered() {
        let offered = offered_present_modes(&[PresentMode::Fifo, PresentMode::Immediate]);
        assert_eq!(offered, vec![PresentMode::Fifo, PresentMode::Immediate]);
    }

    #[test]
    fn fifo_is_offered_even_if_unlisted() {
        assert_eq!(offered_present_modes(&[]), vec![PresentMode::Fifo]);
        assert_eq!(
            offered_present_modes(&[PresentMode::Mailbox, PresentMode::AutoVsync]),
            vec![PresentMode::Fifo, PresentMode::Mailbox]
        );
    }
}
