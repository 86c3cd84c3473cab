//! Renderer crate for logpaddle.
//!
//! Widgets record [`paddle::DrawCommand`]s into a [`paddle::DrawList`]; this
//! crate replays them with `wgpu` inside a `winit` window. The flow is:
//!
//! ```text
//!   logpaddle
//!       │ RendererConfig + Scene
//!       ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ Scene::update / Scene::draw
//!                                                            │
//!                                                            └─▶ GpuState::render(DrawList)
//! ```
//!
//! PNG assets go through [`texture::decode_png`] and are made resident once
//! by a [`TextureCache`]; scenes receive handles in [`Scene::load_textures`]
//! and never decode during a frame.

pub mod cache;
mod gpu;
mod scene;
pub mod texture;
mod types;
mod window;

use anyhow::Result;

pub use cache::{LoadedTexture, TextureBackend, TextureCache, TextureSource};
pub use scene::Scene;
pub use texture::{decode_png, DecodedImage, PixelLayout, PngColorType, TextureError};
pub use types::{FrameInput, RendererConfig};

/// Entry point that opens the window and drives a [`Scene`] until it closes.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks on the event loop. Must be called from the main thread.
    pub fn run<S: Scene>(self, scene: S) -> Result<()> {
        tracing::info!(title = %self.config.title, "starting renderer");
        window::run_window(self.config, scene)
    }
}
