use std::error::Error;
use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::{FieldConfig, Theme};
use crate::confetti::ConfettiSystem;
use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::debug::{DebugOverlay, FrameReport};
use crate::field::DotField;
use crate::frame_loop::FrameLoop;
use crate::glow::CursorGlow;
use crate::pointer::PointerState;
use crate::render::instance::DotInstance;
use crate::render::GpuState;
use crate::resize::ResizeDebounce;

const WINDOW_TITLE: &str = "dotfield";
const INITIAL_WIDTH: u32 = 1280;
const INITIAL_HEIGHT: u32 = 720;
/// Enough for a 1080p field plus a few bursts of confetti.
const INITIAL_INSTANCE_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<DebugOverlay>,

    theme: Theme,
    field: DotField,
    pointer: PointerState,
    glow: CursorGlow,
    confetti: ConfettiSystem,

    resize: ResizeDebounce,
    frame_loop: FrameLoop,
    timers: SystemTimers,

    rng: fastrand::Rng,

    // Surface dimensions
    screen_w: u32,
    screen_h: u32,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<DotInstance>,
}

impl App {
    fn new(theme: Theme) -> Self {
        Self {
            window: None,
            gpu: None,
            overlay: None,
            theme,
            field: DotField::new(FieldConfig::themed(theme)),
            pointer: PointerState::new(),
            glow: CursorGlow::new(),
            confetti: ConfettiSystem::new(),
            resize: ResizeDebounce::new(),
            frame_loop: FrameLoop::new(),
            timers: SystemTimers::new(),
            rng: fastrand::Rng::new(),
            screen_w: 0,
            screen_h: 0,
            instance_buf: Vec::with_capacity(INITIAL_INSTANCE_CAPACITY),
        }
    }

    /// Acquire the window and GPU resources and start the frame loop.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let attrs = WindowAttributes::default()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(PhysicalSize::new(INITIAL_WIDTH, INITIAL_HEIGHT));
                let window = Arc::new(event_loop.create_window(attrs)?);
                self.window = Some(window.clone());
                window
            }
        };

        if self.gpu.is_none() {
            let gpu = GpuState::new(window.clone())?;
            self.overlay = Some(DebugOverlay::new(
                &window,
                &gpu,
                *self.field.config(),
                self.theme,
            ));
            self.gpu = Some(gpu);
            log::info!("wgpu + dot pipeline initialized");
        }

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;
        self.resize.request(size.width, size.height, Instant::now());
        log::info!("Window ready: {}x{}", size.width, size.height);

        self.frame_loop.start();
        event_loop.set_control_flow(ControlFlow::Poll);
        window.request_redraw();
        Ok(())
    }

    /// Stop the frame loop and release everything tied to the surface.
    fn stop(&mut self) {
        self.frame_loop.stop();
        self.pointer.leave();
        self.overlay = None;
        self.gpu = None;
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.field.set_base_color(theme.base_color());
        if let Some(overlay) = &mut self.overlay {
            overlay.sync(*self.field.config(), theme);
        }
        log::info!("Theme: {}", theme.label());
    }

    /// Apply edits made in the debug overlay last frame.
    fn apply_overlay_changes(&mut self) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };

        if overlay.theme_changed {
            overlay.theme_changed = false;
            self.theme = overlay.theme;
            self.field.set_base_color(self.theme.base_color());
            overlay.config.base_color = self.theme.base_color();
            log::info!("Theme: {}", self.theme.label());
        }

        if overlay.config_changed {
            overlay.config_changed = false;
            let config = FieldConfig {
                base_color: self.theme.base_color(),
                ..overlay.config
            };
            self.field.set_config(config, &mut self.rng);
            overlay.config = *self.field.config();
            log::info!("Field config updated: {} dots", self.field.len());
        }

        self.glow.enabled = overlay.show_glow;

        if overlay.present_mode_changed {
            overlay.present_mode_changed = false;
            if let Some(gpu) = &mut self.gpu {
                gpu.set_present_mode(overlay.selected_present_mode());
            }
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: &Key) {
        match key {
            Key::Named(NamedKey::Escape) => {
                log::info!("ESC pressed, exiting");
                self.stop();
                event_loop.exit();
            }
            Key::Named(NamedKey::F12) => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.toggle();
                }
            }
            Key::Character(c) if c.eq_ignore_ascii_case("t") => {
                self.apply_theme(self.theme.next());
            }
            _ => {}
        }
    }

    /// One animation frame: layout, shimmer + pointer, effects, draw.
    fn redraw(&mut self) {
        let now = Instant::now();
        let Some(dt) = self.frame_loop.begin_frame(now) else {
            return;
        };

        if let Some(overlay) = &mut self.overlay {
            if dt > 0.0 {
                overlay.record_frame(dt);
            }
        }
        self.apply_overlay_changes();

        // --- Layout (debounced resize) ---
        self.timers.time(SystemPhase::Layout, || {
            if let Some((w, h)) = self.resize.poll(now) {
                self.field.rebuild(w, h, &mut self.rng);
                log::info!("Dot field laid out for {}x{}: {} dots", w, h, self.field.len());
            }
        });

        // --- Field ---
        let pointer = self.pointer.position();
        self.timers
            .time(SystemPhase::Field, || self.field.update(pointer, &mut self.rng));

        // --- Effects ---
        let dt = dt as f32;
        self.timers.time(SystemPhase::Effects, || {
            self.glow.update(pointer, dt);
            self.confetti.update(dt);
        });

        // --- Build instance buffer: glow under dots, confetti on top ---
        self.timers.time(SystemPhase::BuildInstances, || {
            self.instance_buf.clear();
            if let Some(glow) = self.glow.instance() {
                self.instance_buf.push(glow);
            }
            self.field.build_instances(&mut self.instance_buf);
            self.confetti.build_instances(&mut self.instance_buf);
        });

        if let Some(overlay) = &mut self.overlay {
            overlay.report = FrameReport {
                dot_count: self.field.len(),
                candidate_count: self.field.candidate_count(),
                confetti_count: self.confetti.count(),
                field_size: self.field.size(),
                pointer,
                glow_visibility: self.glow.visibility(),
                frame_count: self.frame_loop.frame_count(),
            };
        }

        // --- Render ---
        let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) else {
            return;
        };
        self.timers
            .time(SystemPhase::GpuUpload, || gpu.update_instances(&self.instance_buf));

        let start = Instant::now();
        render_frame(gpu, window, self.overlay.as_mut(), &self.timers);
        self.timers.record(
            SystemPhase::RenderSubmit,
            start.elapsed().as_secs_f64() * 1_000_000.0,
        );
    }
}

/// Draw the field and, when visible, the debug overlay; then present.
fn render_frame(
    gpu: &GpuState,
    window: &Window,
    overlay: Option<&mut DebugOverlay>,
    timers: &SystemTimers,
) {
    let overlay = overlay.filter(|o| o.visible);
    gpu.render(|gpu, encoder, view| match overlay {
        Some(overlay) => overlay.paint(window, gpu, encoder, view, timers),
        None => Vec::new(),
    });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.start(event_loop) {
            log::error!("Failed to start renderer: {e}");
            event_loop.exit();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop();
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            return;
        }
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&mut self.overlay, &self.window) {
            (Some(overlay), Some(window)) => overlay.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                if new_size.width > 0 && new_size.height > 0 {
                    self.screen_w = new_size.width;
                    self.screen_h = new_size.height;
                }
                self.resize
                    .request(new_size.width, new_size.height, Instant::now());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.move_to(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.leave();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !consumed => {
                self.confetti
                    .burst(self.screen_w as f32, self.screen_h as f32, &mut self.rng);
            }
            WindowEvent::KeyboardInput { event, .. }
                if !consumed && event.state == ElementState::Pressed && !event.repeat =>
            {
                self.handle_key(event_loop, &event.logical_key);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

/// Entry point: create the event loop and run.
pub fn run() -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(Theme::Aqua);
    event_loop.run_app(&mut app)?;
    Ok(())
}
