//! Animated paddle widget for the request visualiser.
//!
//! A paddle is a coloured bar that slides vertically towards the predicted
//! arrival point of the request it is tracking. The crate has no rendering
//! backend of its own:
//! - `paddle` holds the widget state and the per-frame interpolation.
//! - `draw` defines the `Canvas` seam plus a recording `DrawList` that a GPU
//!   backend replays.
//! - `target` describes the request entities a paddle can follow.
//! - `settings` carries the display facts the paddle needs each retarget.
//! - `hover` is the text-display collaborator populated on mouse-over.
//! - `colour` derives stable per-token colours.

pub mod colour;
pub mod draw;
pub mod hover;
pub mod paddle;
pub mod settings;
pub mod target;

pub use colour::colour_hash;
pub use draw::{Canvas, DrawCommand, DrawList, Rect, TextStyle, TextureId, UvQuad};
pub use hover::{HoverLabel, TextArea};
pub use paddle::{Paddle, DEFAULT_RETURN_DURATION, PADDLE_HEIGHT, PADDLE_WIDTH};
pub use settings::{PaddleMode, SceneSettings};
pub use target::{RequestId, RequestTarget};
