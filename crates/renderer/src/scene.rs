use paddle::Canvas;

use crate::cache::TextureSource;
use crate::types::FrameInput;

/// Application state driven by the window loop.
///
/// Each frame the loop calls [`Scene::update`] with the elapsed time, then
/// [`Scene::draw`] into a fresh draw list.
pub trait Scene {
    /// Called once after the GPU is ready; resolve texture paths here rather than per frame.
    fn load_textures(&mut self, _textures: &mut dyn TextureSource) {}

    fn resize(&mut self, width: f32, height: f32);

    fn update(&mut self, dt: f32, input: &FrameInput);

    fn draw(&self, canvas: &mut dyn Canvas);

    /// Short status line, shown in the window title when present.
    fn status(&self) -> Option<String> {
        None
    }
}
