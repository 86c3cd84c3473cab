use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use paddle::DrawList;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::scene::Scene;
use crate::types::{FrameInput, RendererConfig};

/// Longest step handed to the scene; stalls (drags, suspends) must not teleport paddles.
const MAX_FRAME_DT: f32 = 0.1;

/// Window, GPU state and the scene being shown. `gpu` is declared first so the
/// surface is dropped before the window it was created from.
struct WindowState<S> {
    gpu: GpuState,
    window: Arc<Window>,
    scene: S,
    input: FrameInput,
    draw_list: DrawList,
    last_frame: Instant,
    title: String,
    applied_title: String,
}

impl<S: Scene> WindowState<S> {
    fn new(window: Arc<Window>, config: &RendererConfig, mut scene: S) -> Result<Self> {
        let size = window.inner_size();
        let mut gpu = GpuState::new(window.as_ref(), size, config)?;
        let size = gpu.size();
        scene.resize(size.width as f32, size.height as f32);
        scene.load_textures(gpu.textures_mut());

        Ok(Self {
            gpu,
            window,
            scene,
            input: FrameInput::default(),
            draw_list: DrawList::new(config.line_height),
            last_frame: Instant::now(),
            title: config.title.clone(),
            applied_title: config.title.clone(),
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        let size = self.gpu.size();
        self.scene.resize(size.width as f32, size.height as f32);
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        self.last_frame = now;

        self.scene.update(dt, &self.input);
        self.draw_list.clear();
        self.scene.draw(&mut self.draw_list);
        self.sync_title();
        self.gpu.render(&self.draw_list)
    }

    fn sync_title(&mut self) {
        let title = match self.scene.status() {
            Some(status) => format!("{} - {status}", self.title),
            None => self.title.clone(),
        };
        if title != self.applied_title {
            self.window.set_title(&title);
            self.applied_title = title;
        }
    }
}

pub(crate) fn run_window<S: Scene>(config: RendererConfig, scene: S) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.surface_size.0, config.surface_size.1))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config, scene)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;
    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        "window renderer ready"
    );

    event_loop.set_control_flow(ControlFlow::Poll);
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && matches!(event.logical_key, Key::Named(NamedKey::Escape))
                {
                    elwt.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                state.input.mouse = None;
            }
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::RedrawRequested => match state.frame() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.gpu.size();
                    state.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("surface out of memory; exiting");
                    elwt.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    tracing::warn!("surface timeout; retrying next frame");
                }
                Err(other) => {
                    tracing::warn!(error = ?other, "surface error; retrying next frame");
                }
            },
            _ => {}
        },
        Event::AboutToWait => state.window.request_redraw(),
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
