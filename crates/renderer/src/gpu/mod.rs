//! wgpu backend for recorded draw lists.
//!
//! - `context` owns the instance/device/surface wiring and reconfigures the
//!   swapchain on resize.
//! - `textures` keeps uploaded textures and their bind groups, and acts as
//!   the upload target for the texture cache.
//! - `batch` flattens a `DrawList` into triangles grouped by texture.
//! - `pipeline` compiles the single quad shader.
//! - `state` glues everything together for the window loop.

mod batch;
mod context;
mod pipeline;
mod state;
mod textures;

pub(crate) use state::GpuState;
