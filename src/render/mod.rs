pub mod instance;
pub mod pipeline;

use std::error::Error;
use std::sync::Arc;
use winit::window::Window;

use self::instance::DotInstance;
use self::pipeline::DotPipeline;

/// Background behind the field.
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Device, surface and the single dot pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Present modes the surface reported at creation.
    pub present_modes: Vec<wgpu::PresentMode>,
    pub dot_pipeline: DotPipeline,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {:?} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("dotfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format =
            preferred_format(&caps.formats).ok_or("surface reports no supported formats")?;
        let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            wgpu::CompositeAlphaMode::Auto
        };

        // Fifo paces the loop to the display and is the one mode every surface has.
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface: {:?}, alpha {:?}, present modes {:?}",
            format,
            alpha_mode,
            caps.present_modes
        );

        let dot_pipeline = DotPipeline::new(&device, format);
        dot_pipeline.update_screen_size(
            &queue,
            surface_config.width as f32,
            surface_config.height as f32,
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            present_modes: caps.present_modes,
            dot_pipeline,
        })
    }

    /// Resize the surface. Zero-sized (minimized) windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.dot_pipeline
            .update_screen_size(&self.queue, width as f32, height as f32);
    }

    pub fn update_instances(&mut self, instances: &[DotInstance]) {
        self.dot_pipeline
            .update_instances(&self.device, &self.queue, instances);
    }

    /// Switch present mode, falling back to Fifo when the surface lacks `mode`.
    pub fn set_present_mode(&mut self, mode: wgpu::PresentMode) {
        let applied = supported_present_mode(mode, &self.present_modes);
        if applied != mode {
            log::warn!("Present mode {:?} unsupported, using {:?}", mode, applied);
        }
        if applied == self.surface_config.present_mode {
            return;
        }
        self.surface_config.present_mode = applied;
        self.surface.configure(&self.device, &self.surface_config);
        log::info!("Present mode changed to {:?}", applied);
    }

    /// Draw one frame: the field pass, then whatever `overlay` encodes on top.
    ///
    /// `overlay` may return command buffers that must be submitted before the
    /// frame encoder. Returns false when no surface texture was available.
    pub fn render<F>(&self, overlay: F) -> bool
    where
        F: FnOnce(&Self, &mut wgpu::CommandEncoder, &wgpu::TextureView) -> Vec<wgpu::CommandBuffer>,
    {
        let Some(output) = self.acquire() else {
            return false;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.draw_field(&mut encoder, &view);
        let extra = overlay(self, &mut encoder, &view);

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        true
    }

    /// Next surface texture, or None to skip the frame.
    fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                None
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                None
            }
        }
    }

    fn draw_field(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("field_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.dot_pipeline.draw(&mut pass);
    }
}

/// First sRGB format, else whatever the surface lists first.
fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// `requested` if `supported` lists it, otherwise Fifo.
pub fn supported_present_mode(
    requested: wgpu::PresentMode,
    supported: &[wgpu::PresentMode],
) -> wgpu::PresentMode {
    if supported.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{PresentMode, TextureFormat};

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let supported = [PresentMode::Fifo, PresentMode::Immediate];
        assert_eq!(
            supported_present_mode(PresentMode::Immediate, &supported),
            PresentMode::Immediate
        );
        assert_eq!(
            supported_present_mode(PresentMode::Mailbox, &supported),
            PresentMode::Fifo
        );
        assert_eq!(supported_present_mode(PresentMode::Mailbox, &[]), PresentMode::Fifo);
    }

    #[test]
    fn srgb_format_is_preferred() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(preferred_format(&formats), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(
            preferred_format(&[TextureFormat::Rgba16Float]),
            Some(TextureFormat::Rgba16Float)
        );
        assert_eq!(preferred_format(&[]), None);
    }
}
