use glam::{Vec2, Vec3};

/// Text-display collaborator filled in when the mouse hovers a widget.
pub trait TextArea {
    fn set_text(&mut self, lines: Vec<String>);
    fn set_pos(&mut self, pos: Vec2);
    fn set_colour(&mut self, colour: Vec3);
}

/// Plain [`TextArea`] that keeps whatever it was last told.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverLabel {
    pub lines: Vec<String>,
    pub pos: Vec2,
    pub colour: Vec3,
}

impl HoverLabel {
    /// Joins the lines into a single status string.
    pub fn summary(&self) -> String {
        self.lines.join(" ")
    }
}

impl TextArea for HoverLabel {
    fn set_text(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn set_colour(&mut self, colour: Vec3) {
        self.colour = colour;
    }
}
