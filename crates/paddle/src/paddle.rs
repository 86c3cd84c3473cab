use glam::{Vec2, Vec4};

use crate::colour::colour_hash;
use crate::draw::{Canvas, Rect, TextStyle, TextureId, UvQuad};
use crate::hover::TextArea;
use crate::settings::SceneSettings;
use crate::target::{RequestId, RequestTarget};

pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 50.0;

/// Seconds a paddle takes to drift back to the centre once it loses its target.
pub const DEFAULT_RETURN_DURATION: f32 = 4.0;

const SHADOW_OFFSET: Vec2 = Vec2::new(1.0, 1.0);
const SHADOW_ALPHA: f32 = 0.7;
const LABEL_GAP: f32 = 10.0;
const DECORATION_WIDTH: f32 = 40.0;
const DECORATION_HEIGHT: f32 = 50.0;
const VISIBILITY_EPSILON: f32 = 0.01;

/// A vertical move in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Motion {
    start_y: f32,
    dest_y: f32,
    eta: f32,
    elapsed: f32,
}

impl Motion {
    /// Fraction of the move still to go, in `[0, 1]`.
    ///
    /// `None` once the move has run its course, which includes every move
    /// with a zero, negative or non-finite duration.
    fn remaining_fraction(&self) -> Option<f32> {
        let remaining = self.eta - self.elapsed;
        if !self.eta.is_finite() || remaining.is_nan() || remaining <= 0.0 {
            return None;
        }
        Some((remaining / self.eta).clamp(0.0, 1.0))
    }
}

/// Coloured bar that slides towards the request it is tracking.
#[derive(Debug, Clone)]
pub struct Paddle {
    token: String,
    token_colour: Vec4,
    pos: Vec2,
    width: f32,
    height: f32,
    colour: Vec4,
    lastcol: Vec4,
    nextcol: Vec4,
    default_colour: Vec4,
    motion: Option<Motion>,
    target: Option<RequestId>,
    return_duration: f32,
    label_style: TextStyle,
}

impl Paddle {
    pub fn new(pos: Vec2, colour: Vec4, token: impl Into<String>) -> Self {
        let token = token.into();
        let token_colour = colour_hash(&token).extend(1.0);
        Self {
            token,
            token_colour,
            pos,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            colour,
            lastcol: colour,
            nextcol: colour,
            default_colour: colour,
            motion: None,
            target: None,
            return_duration: DEFAULT_RETURN_DURATION,
            label_style: TextStyle {
                align_top: true,
                align_right: true,
                drop_shadow: true,
            },
        }
    }

    /// Overrides how long the paddle takes to return to the centre when idle.
    pub fn with_return_duration(mut self, seconds: f32) -> Self {
        self.return_duration = seconds;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_colour(&self) -> Vec4 {
        self.token_colour
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    /// Moves the paddle horizontally, e.g. after the viewport is resized.
    pub fn set_x(&mut self, x: f32) {
        self.pos.x = x;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn colour(&self) -> Vec4 {
        self.colour
    }

    pub fn default_colour(&self) -> Vec4 {
        self.default_colour
    }

    pub fn target(&self) -> Option<RequestId> {
        self.target
    }

    /// Destination of the current move, if any.
    pub fn destination(&self) -> Option<f32> {
        self.motion.map(|motion| motion.dest_y)
    }

    pub fn moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn visible(&self) -> bool {
        self.colour.w > VISIBILITY_EPSILON
    }

    /// Starts a linear move from the current position to `y` over `eta` seconds.
    pub fn move_to(&mut self, y: f32, eta: f32, nextcol: Vec4) {
        self.motion = Some(Motion {
            start_y: self.pos.y,
            dest_y: y,
            eta,
            elapsed: 0.0,
        });
        self.nextcol = nextcol;
        tracing::trace!(token = %self.token, from = self.pos.y, to = y, eta, "paddle move");
    }

    /// Follows `target`, or drifts back to the centre of the viewport when `None`.
    pub fn set_target<T>(&mut self, target: Option<&T>, settings: &SceneSettings)
    where
        T: RequestTarget + ?Sized,
    {
        let Some(target) = target else {
            self.target = None;
            self.move_to(
                settings.centre_y(),
                self.return_duration,
                self.default_colour,
            );
            return;
        };

        self.target = Some(target.id());
        let dest = target.finish();
        let colour = if settings.paddle_mode.groups_by_token() {
            self.token_colour
        } else {
            target.colour().extend(1.0)
        };
        tracing::debug!(
            token = %self.token,
            target = %target.id(),
            dest_y = dest.y,
            eta = target.arrival_time(),
            "paddle retargeted"
        );
        self.move_to(dest.y, target.arrival_time(), colour);
    }

    /// Advances the current move by `dt` seconds.
    pub fn logic(&mut self, dt: f32) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };
        motion.elapsed += dt;

        match motion.remaining_fraction() {
            None => {
                self.pos.y = motion.dest_y;
                self.motion = None;
                self.target = None;
                self.colour = self.nextcol;
                self.lastcol = self.colour;
            }
            Some(alpha) => {
                self.pos.y = motion.start_y + (motion.dest_y - motion.start_y) * (1.0 - alpha);
                self.colour = self.lastcol * alpha + self.nextcol * (1.0 - alpha);
            }
        }
    }

    /// Hit-tests `mouse` against the bar and fills `text_area` with the token on a hit.
    pub fn mouse_over<A>(&self, text_area: &mut A, mouse: Vec2) -> bool
    where
        A: TextArea + ?Sized,
    {
        let inside_x = self.pos.x <= mouse.x && self.pos.x + self.width >= mouse.x;
        let inside_y = (self.pos.y - mouse.y).abs() < self.height / 2.0;
        if !(inside_x && inside_y) {
            return false;
        }

        text_area.set_text(vec![self.token.clone()]);
        text_area.set_pos(mouse);
        text_area.set_colour(self.colour.truncate());
        true
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_left_centre(self.pos, self.width, self.height)
    }

    pub fn draw_token<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let origin = Vec2::new(
            self.pos.x - LABEL_GAP,
            self.pos.y - canvas.line_height() / 2.0,
        );
        canvas.text(origin, self.colour, &self.token, self.label_style);
    }

    pub fn draw_shadow<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let shadow = Vec4::new(0.0, 0.0, 0.0, SHADOW_ALPHA * self.colour.w);
        canvas.fill_quad(self.bounds().offset(SHADOW_OFFSET), shadow);
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_quad(self.bounds(), self.colour);
    }

    /// Draws the decorative overlay. `texture` must already be resident on the backend.
    pub fn draw_decoration<C: Canvas + ?Sized>(&self, canvas: &mut C, texture: TextureId) {
        let rect = Rect::from_left_centre(self.pos, DECORATION_WIDTH, DECORATION_HEIGHT);
        canvas.textured_quad(rect, texture, UvQuad::BOTTOM_UP, Vec4::ONE);
    }
}
