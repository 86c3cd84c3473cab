use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use paddle::{DrawCommand, DrawList, Rect, TextureId, UvQuad};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub colour: [f32; 4],
}

impl QuadVertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Consecutive vertices sharing one texture binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Batch {
    pub texture: TextureId,
    pub vertices: Range<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct FrameGeometry {
    pub vertices: Vec<QuadVertex>,
    pub batches: Vec<Batch>,
    /// Text commands are rasterised by a font backend, not by the quad pipeline.
    pub skipped_text: usize,
}

impl FrameGeometry {
    fn push_quad(&mut self, rect: Rect, uv: UvQuad, colour: [f32; 4], texture: TextureId) {
        let corners = rect.corners();
        let start = self.vertices.len() as u32;
        // two triangles: top-left, bottom-left, bottom-right / top-left, bottom-right, top-right
        for index in [0usize, 1, 2, 0, 2, 3] {
            self.vertices.push(QuadVertex {
                position: corners[index].to_array(),
                uv: uv.0[index].to_array(),
                colour,
            });
        }
        let end = self.vertices.len() as u32;

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture && batch.vertices.end == start => {
                batch.vertices.end = end;
            }
            _ => self.batches.push(Batch {
                texture,
                vertices: start..end,
            }),
        }
    }
}

/// Flattens a draw list into triangles, splitting batches when the texture changes.
pub(crate) fn build_geometry(list: &DrawList, white: TextureId) -> FrameGeometry {
    let mut geometry = FrameGeometry::default();
    for command in list.commands() {
        match command {
            DrawCommand::Quad { rect, colour } => {
                geometry.push_quad(*rect, UvQuad::TOP_DOWN, colour.to_array(), white);
            }
            DrawCommand::TexturedQuad {
                rect,
                texture,
                uv,
                tint,
            } => {
                geometry.push_quad(*rect, *uv, tint.to_array(), *texture);
            }
            DrawCommand::Text { .. } => geometry.skipped_text += 1,
        }
    }
    geometry
}
