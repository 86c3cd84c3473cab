//! Minimal draw-command interface shared by widgets and render backends.
//!
//! Coordinates are in pixels with the origin in the top-left corner and y
//! growing downwards. Widgets talk to a [`Canvas`]; the GPU backend consumes
//! the commands a [`DrawList`] recorded during the frame.

use glam::{Vec2, Vec4};

/// Opaque handle to a texture owned by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle whose left edge sits at `anchor.x`, vertically centred on `anchor.y`.
    pub fn from_left_centre(anchor: Vec2, width: f32, height: f32) -> Self {
        let half = height / 2.0;
        Self {
            min: Vec2::new(anchor.x, anchor.y - half),
            max: Vec2::new(anchor.x + width, anchor.y + half),
        }
    }

    pub fn offset(self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Corners in drawing order: top-left, bottom-left, bottom-right, top-right.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.min.x, self.max.y),
            self.max,
            Vec2::new(self.max.x, self.min.y),
        ]
    }
}

/// Texture coordinates matching [`Rect::corners`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvQuad(pub [Vec2; 4]);

impl UvQuad {
    /// Maps `v = 1` to the top edge, for textures stored bottom row first.
    pub const BOTTOM_UP: UvQuad = UvQuad([
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
    ]);

    /// Maps `v = 0` to the top edge.
    pub const TOP_DOWN: UvQuad = UvQuad([
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
    ]);
}

/// Text placement flags understood by font backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    /// The origin marks the top of the glyph box instead of the baseline.
    pub align_top: bool,
    /// The origin marks the right edge of the text instead of the left.
    pub align_right: bool,
    pub drop_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Quad {
        rect: Rect,
        colour: Vec4,
    },
    TexturedQuad {
        rect: Rect,
        texture: TextureId,
        uv: UvQuad,
        tint: Vec4,
    },
    Text {
        origin: Vec2,
        colour: Vec4,
        text: String,
        style: TextStyle,
    },
}

pub trait Canvas {
    fn fill_quad(&mut self, rect: Rect, colour: Vec4);

    fn textured_quad(&mut self, rect: Rect, texture: TextureId, uv: UvQuad, tint: Vec4);

    fn text(&mut self, origin: Vec2, colour: Vec4, text: &str, style: TextStyle);

    /// Maximum glyph height of the active font, in pixels.
    fn line_height(&self) -> f32;
}

/// Records draw commands for later replay by a backend.
#[derive(Debug, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    line_height: f32,
}

impl DrawList {
    pub const DEFAULT_LINE_HEIGHT: f32 = 12.0;

    pub fn new(line_height: f32) -> Self {
        Self {
            commands: Vec::new(),
            line_height,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Empties the list while keeping its allocation for the next frame.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LINE_HEIGHT)
    }
}

impl Canvas for DrawList {
    fn fill_quad(&mut self, rect: Rect, colour: Vec4) {
        self.commands.push(DrawCommand::Quad { rect, colour });
    }

    fn textured_quad(&mut self, rect: Rect, texture: TextureId, uv: UvQuad, tint: Vec4) {
        self.commands.push(DrawCommand::TexturedQuad {
            rect,
            texture,
            uv,
            tint,
        });
    }

    fn text(&mut self, origin: Vec2, colour: Vec4, text: &str, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            origin,
            colour,
            text: text.to_string(),
            style,
        });
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_centre_rect_spans_height_around_anchor() {
        let rect = Rect::from_left_centre(Vec2::new(100.0, 200.0), 10.0, 50.0);
        assert_eq!(rect.min, Vec2::new(100.0, 175.0));
        assert_eq!(rect.max, Vec2::new(110.0, 225.0));
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn corners_follow_quad_winding() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0));
        assert_eq!(
            rect.corners(),
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 4.0),
                Vec2::new(2.0, 4.0),
                Vec2::new(2.0, 0.0),
            ]
        );
    }

    #[test]
    fn draw_list_records_in_order_and_clears() {
        let mut list = DrawList::new(16.0);
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        list.fill_quad(rect, Vec4::ONE);
        list.text(Vec2::ZERO, Vec4::ONE, "hi", TextStyle::default());
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands()[0], DrawCommand::Quad { .. }));
        assert!(matches!(&list.commands()[1], DrawCommand::Text { text, .. } if text == "hi"));
        assert_eq!(list.line_height(), 16.0);

        list.clear();
        assert!(list.is_empty());
    }
}
