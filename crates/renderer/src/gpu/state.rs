use anyhow::Result;
use paddle::DrawList;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::cache::TextureCache;
use crate::types::RendererConfig;

use super::batch::{build_geometry, QuadVertex};
use super::context::GpuContext;
use super::pipeline::QuadPipeline;
use super::textures::{GpuTextures, WHITE_TEXTURE};

const INITIAL_VERTEX_CAPACITY: usize = 1024;

/// Everything needed to turn a [`DrawList`] into pixels on the window surface.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: QuadPipeline,
    textures: TextureCache<GpuTextures>,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    clear_colour: wgpu::Color,
    reported_text: bool,
}

impl GpuState {
    pub(crate) fn new<T>(target: &T, size: PhysicalSize<u32>, config: &RendererConfig) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, config.vsync)?;
        let textures = GpuTextures::new(&context.device, &context.queue, context.texture_format());
        let pipeline = QuadPipeline::new(
            &context.device,
            context.surface_format,
            textures.layout(),
            (context.size.width, context.size.height),
        );
        let vertex_buffer = create_vertex_buffer(&context.device, INITIAL_VERTEX_CAPACITY);
        let [r, g, b] = config.background;

        Ok(Self {
            context,
            pipeline,
            textures: TextureCache::new(textures),
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            clear_colour: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            reported_text: false,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
        self.pipeline
            .update_viewport(&self.context.queue, (self.context.size.width, self.context.size.height));
    }

    pub(crate) fn textures_mut(&mut self) -> &mut TextureCache<GpuTextures> {
        &mut self.textures
    }

    pub(crate) fn render(&mut self, list: &DrawList) -> Result<(), wgpu::SurfaceError> {
        let geometry = build_geometry(list, WHITE_TEXTURE);
        if geometry.skipped_text > 0 && !self.reported_text {
            tracing::debug!(
                count = geometry.skipped_text,
                "text commands are left to the font backend"
            );
            self.reported_text = true;
        }

        if geometry.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = geometry.vertices.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.context.device, self.vertex_capacity);
            tracing::trace!(capacity = self.vertex_capacity, "grew vertex buffer");
        }
        if !geometry.vertices.is_empty() {
            self.context.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&geometry.vertices),
            );
        }

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !geometry.batches.is_empty() {
                let backend = self.textures.backend();
                pass.set_pipeline(&self.pipeline.pipeline);
                pass.set_bind_group(0, &self.pipeline.viewport_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                for batch in &geometry.batches {
                    let Some(bind_group) = backend
                        .bind_group(batch.texture)
                        .or_else(|| backend.bind_group(WHITE_TEXTURE))
                    else {
                        continue;
                    };
                    pass.set_bind_group(1, bind_group, &[]);
                    pass.draw(batch.vertices.clone(), 0..1);
                }
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad vertices"),
        size: (capacity * std::mem::size_of::<QuadVertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
