use glam::Vec2;

/// Immutable configuration passed to the renderer at start-up.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window title shown until the scene reports a status.
    pub title: String,
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Clear colour behind the scene.
    pub background: [f32; 3],
    /// Wait for vertical blank before presenting.
    pub vsync: bool,
    /// Line height reported to widgets laying out text.
    pub line_height: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "logpaddle".to_string(),
            surface_size: (1280, 720),
            background: [0.0, 0.0, 0.0],
            vsync: true,
            line_height: paddle::DrawList::DEFAULT_LINE_HEIGHT,
        }
    }
}

/// Input sampled by the window loop and handed to the scene each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Cursor position in window pixels, `None` while outside the window.
    pub mouse: Option<Vec2>,
}
