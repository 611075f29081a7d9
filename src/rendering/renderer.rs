use std::{
    borrow::Cow,
    f32::consts::FRAC_PI_2,
    sync::Arc
};

use bytemuck::{
    Pod,
    Zeroable
};

use wgpu::{
    util::DeviceExt, Device, RenderPipeline
};

use winit::window::Window;

use crate::game::math::{
    Rect2F,
    Vector2F,
    Vector2U
};

use super::{Canvas, Color, DrawSurface};

const CORNER_SEGMENTS: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Could not create surface, reason='{0}'")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),

    #[error("No graphics adapter compatible with the window surface")]
    NoAdapter,

    #[error("Could not open device, reason='{0}'")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported texture format")]
    NoSurfaceFormat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 2],
    color: [f32; 4],
}

#[derive(Debug)]
pub struct TriangleBatch {
    size: Vector2U,
    clear_color: Color,
    vertices: Vec<Vertex>,
}

impl TriangleBatch {
    fn new(size: Vector2U) -> Self {
        Self {
            size,
            clear_color: Color::rgb(0, 0, 0),
            vertices: vec![],
        }
    }

    fn reset(&mut self, size: Vector2U) {
        self.size = size;
        self.vertices.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    fn to_ndc(&self, point: Vector2F) -> [f32; 2] {
        let w = self.size.x.max(1) as f32;
        let h = self.size.y.max(1) as f32;
        [
            (point.x / w) * 2.0 - 1.0,
            1.0 - (point.y / h) * 2.0,
        ]
    }

    fn push_triangle(&mut self, a: Vector2F, b: Vector2F, c: Vector2F, color: [f32; 4]) {
        for point in [a, b, c] {
            let pos = self.to_ndc(point);
            self.vertices.push(Vertex { pos, color });
        }
    }

    fn push_quad(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let top_left = Vector2F::new(x, y);
        let top_right = Vector2F::new(x + w, y);
        let bottom_right = Vector2F::new(x + w, y + h);
        let bottom_left = Vector2F::new(x, y + h);
        self.push_triangle(top_left, top_right, bottom_right, color);
        self.push_triangle(bottom_right, bottom_left, top_left, color);
    }

    fn push_corner(&mut self, center: Vector2F, radius: f32, start_angle: f32, color: [f32; 4]) {
        let step = FRAC_PI_2 / CORNER_SEGMENTS as f32;
        for i in 0..CORNER_SEGMENTS {
            let a0 = start_angle + step * i as f32;
            let a1 = a0 + step;
            let p0 = Vector2F::new(center.x + radius * a0.cos(), center.y + radius * a0.sin());
            let p1 = Vector2F::new(center.x + radius * a1.cos(), center.y + radius * a1.sin());
            self.push_triangle(center, p0, p1, color);
        }
    }
}

impl Canvas for TriangleBatch {
    fn size(&self) -> Vector2U {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
    }

    fn draw_line(&mut self, from: Vector2F, to: Vector2F, width: f32, color: Color) {
        let direction = to - from;
        let length = (direction.x.powi(2) + direction.y.powi(2)).sqrt();
        if length == 0.0 {
            return;
        }

        let half = width / 2.0;
        let normal = Vector2F::new(-direction.y / length * half, direction.x / length * half);
        let color = color.to_f32_array();

        let a = from + normal;
        let b = to + normal;
        let c = to - normal;
        let d = from - normal;
        self.push_triangle(a, b, c, color);
        self.push_triangle(c, d, a, color);
    }

    fn fill_round_rect(&mut self, rect: Rect2F, corner_radius: f32, color: Color) {
        let Rect2F { pos, size } = rect;
        let r = corner_radius.min(size.x / 2.0).min(size.y / 2.0).max(0.0);
        let color = color.to_f32_array();

        // Middle column, then the two side strips between the corners
        self.push_quad(pos.x + r, pos.y, size.x - 2.0 * r, size.y, color);
        self.push_quad(pos.x, pos.y + r, r, size.y - 2.0 * r, color);
        self.push_quad(pos.x + size.x - r, pos.y + r, r, size.y - 2.0 * r, color);

        if r > 0.0 {
            // y grows downwards, so angle 0 points right and PI/2 points down
            let right = pos.x + size.x - r;
            let bottom = pos.y + size.y - r;
            self.push_corner(Vector2F::new(right, bottom), r, 0.0, color);
            self.push_corner(Vector2F::new(pos.x + r, bottom), r, FRAC_PI_2, color);
            self.push_corner(Vector2F::new(pos.x + r, pos.y + r), r, 2.0 * FRAC_PI_2, color);
            self.push_corner(Vector2F::new(right, pos.y + r), r, 3.0 * FRAC_PI_2, color);
        }
    }
}

// Tracks the window size on every acquire, resizes need no message from the event loop.
pub struct WgpuSurface {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    render_pipeline: RenderPipeline,
    acquired: Option<wgpu::SurfaceTexture>,
    batch: TriangleBatch,
}

impl WgpuSurface {
    pub async fn new(window: Arc<Window>) -> Result<WgpuSurface, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .ok_or(RendererError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor::default(),
                None
            )
            .await?;

        let size = window.inner_size();

        let cap = surface.get_capabilities(&adapter);
        let surface_format = *cap.formats.first().ok_or(RendererError::NoSurfaceFormat)?;
        log::info!("Surface format {surface_format:?}, size {}x{}", size.width, size.height);

        let render_pipeline = Self::prepare_pipeline(&device, surface_format);

        let state = WgpuSurface {
            window,
            device,
            queue,
            size,
            surface,
            surface_format,
            render_pipeline,
            acquired: None,
            batch: TriangleBatch::new(Vector2U::new(size.width, size.height)),
        };

        state.configure_surface();

        Ok(state)
    }

    fn prepare_pipeline(device: &Device, surface_format: wgpu::TextureFormat) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Valley Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Valley Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Valley Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format.add_srgb_suffix(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn configure_surface(&self) {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.surface_format,
            view_formats: vec![self.surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width,
            height: self.size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    fn follow_window_size(&mut self) {
        let window_size = self.window.inner_size();
        if window_size != self.size && window_size.width > 0 && window_size.height > 0 {
            log::debug!("Reconfiguring surface to {}x{}", window_size.width, window_size.height);
            self.size = window_size;
            self.configure_surface();
        }
    }
}

impl DrawSurface for WgpuSurface {
    type Canvas = TriangleBatch;

    fn try_acquire(&mut self) -> bool {
        self.follow_window_size();
        if self.size.width == 0 || self.size.height == 0 {
            return false;
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                self.acquired = Some(surface_texture);
                self.batch.reset(Vector2U::new(self.size.width, self.size.height));
                true
            },
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::debug!("Surface outdated, reconfiguring");
                self.configure_surface();
                false
            },
            Err(wgpu::SurfaceError::Timeout) => {
                log::trace!("Surface texture timeout");
                false
            },
            Err(e) => {
                log::error!("Could not acquire surface texture: {e}");
                false
            },
        }
    }

    fn canvas_mut(&mut self) -> &mut Self::Canvas {
        &mut self.batch
    }

    fn present(&mut self) {
        let Some(surface_texture) = self.acquired.take() else {
            return;
        };

        let texture_view = surface_texture.texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.surface_format.add_srgb_suffix()),
                ..Default::default()
            });

        let mut encoder = self.device.create_command_encoder(&Default::default());

        let vertex_buffer = (!self.batch.vertices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Valley Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.batch.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        {
            let [r, g, b, a] = self.batch.clear_color.to_f32_array();
            let mut renderpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Valley Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(vertex_buffer) = vertex_buffer.as_ref() {
                renderpass.set_pipeline(&self.render_pipeline);
                renderpass.set_vertex_buffer(0, vertex_buffer.slice(..));
                renderpass.draw(0..self.batch.vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();
        self.batch.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_maps_corners_to_ndc() {
        let batch = TriangleBatch::new(Vector2U::new(200, 100));
        assert_eq!(batch.to_ndc(Vector2F::new(0.0, 0.0)), [-1.0, 1.0]);
        assert_eq!(batch.to_ndc(Vector2F::new(200.0, 100.0)), [1.0, -1.0]);
        assert_eq!(batch.to_ndc(Vector2F::new(100.0, 50.0)), [0.0, 0.0]);
    }

    #[test]
    fn test_line_is_two_triangles() {
        let mut batch = TriangleBatch::new(Vector2U::new(100, 100));
        batch.draw_line(Vector2F::new(0.0, 0.0), Vector2F::new(0.0, 100.0), 2.0, Color::rgb(1, 1, 1));
        batch.draw_line(Vector2F::new(5.0, 5.0), Vector2F::new(5.0, 5.0), 2.0, Color::rgb(1, 1, 1));
        assert_eq!(batch.triangle_count(), 2);
    }

    #[test]
    fn test_round_rect_tessellation() {
        let mut batch = TriangleBatch::new(Vector2U::new(512, 512));
        batch.fill_round_rect(Rect2F::new(128.0, 128.0, 128.0, 128.0), 24.0, Color::rgb(76, 175, 80));
        assert_eq!(batch.triangle_count(), 3 * 2 + 4 * CORNER_SEGMENTS as usize);

        batch.clear(Color::rgb(0, 0, 0));
        batch.fill_round_rect(Rect2F::new(0.0, 0.0, 128.0, 128.0), 0.0, Color::rgb(76, 175, 80));
        assert_eq!(batch.triangle_count(), 2);
    }

    #[test]
    fn test_round_rect_stays_inside_bounds() {
        let mut batch = TriangleBatch::new(Vector2U::new(256, 256));
        batch.fill_round_rect(Rect2F::new(0.0, 0.0, 256.0, 256.0), 200.0, Color::rgb(1, 2, 3));

        let epsilon = 1e-5;
        assert!(batch.vertices.iter().all(|v| {
            v.pos.iter().all(|c| *c >= -1.0 - epsilon && *c <= 1.0 + epsilon)
        }));
    }
}
