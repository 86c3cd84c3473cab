use std::path::PathBuf;

use glam::{Vec2, Vec3, Vec4};
use paddle::{
    colour_hash, Canvas, HoverLabel, Paddle, PaddleMode, Rect, RequestId, RequestTarget,
    SceneSettings, TextureId, PADDLE_HEIGHT,
};
use rand::prelude::*;
use renderer::{FrameInput, Scene, TextureSource};
use sceneconfig::SceneConfig;

const BALL_SIZE: f32 = 6.0;
/// Paddles closer than this to the centre count as parked.
const CENTRE_TOLERANCE: f32 = 0.5;

/// Simulated request travelling from the left edge to the paddle column.
#[derive(Debug, Clone)]
struct RequestBall {
    id: RequestId,
    token: String,
    start: Vec2,
    finish: Vec2,
    travel: f32,
    elapsed: f32,
    colour: Vec3,
}

impl RequestBall {
    fn pos(&self) -> Vec2 {
        let t = (self.elapsed / self.travel).clamp(0.0, 1.0);
        self.start.lerp(self.finish, t)
    }

    fn arrived(&self) -> bool {
        self.elapsed >= self.travel
    }
}

impl RequestTarget for RequestBall {
    fn id(&self) -> RequestId {
        self.id
    }

    fn finish(&self) -> Vec2 {
        self.finish
    }

    fn arrival_time(&self) -> f32 {
        (self.travel - self.elapsed).max(0.0)
    }

    fn colour(&self) -> Vec3 {
        self.colour
    }
}

/// Snapshot of one paddle for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddleReport {
    pub token: String,
    pub y: f32,
    pub moving: bool,
    pub target: Option<RequestId>,
}

/// Paddles catching a stream of simulated requests.
pub struct PaddleScene {
    settings: SceneSettings,
    x_fraction: f32,
    paddles: Vec<Paddle>,
    balls: Vec<RequestBall>,
    tokens: Vec<String>,
    rng: StdRng,
    request_interval: f32,
    travel_range: (f32, f32),
    spawn_timer: f32,
    next_id: u64,
    spawned: u64,
    arrived: u64,
    hover: HoverLabel,
    hovered: bool,
    texture_path: Option<PathBuf>,
    texture: Option<TextureId>,
}

impl PaddleScene {
    pub fn new(config: &SceneConfig) -> Self {
        let width = config.display.width as f32;
        let height = config.display.height as f32;
        let mode = config.display.paddle_mode;
        let settings = SceneSettings::new(width, height, mode);
        let x_fraction = config.paddle.x_fraction;
        let origin = Vec2::new(width * x_fraction, settings.centre_y());
        let colour = Vec4::from_array(config.paddle.default_colour);
        let return_duration = config.paddle.return_duration.as_secs_f32();

        let paddles = match mode {
            PaddleMode::None => Vec::new(),
            PaddleMode::Single => {
                vec![Paddle::new(origin, colour, "").with_return_duration(return_duration)]
            }
            PaddleMode::Vhost | PaddleMode::Pid => config
                .simulation
                .tokens
                .iter()
                .map(|token| {
                    Paddle::new(origin, colour, token.as_str())
                        .with_return_duration(return_duration)
                })
                .collect(),
        };
        tracing::info!(mode = %mode, paddles = paddles.len(), "paddle scene created");

        let simulation = &config.simulation;
        Self {
            settings,
            x_fraction,
            paddles,
            balls: Vec::new(),
            tokens: simulation.tokens.clone(),
            rng: StdRng::seed_from_u64(simulation.seed),
            request_interval: simulation.request_interval.as_secs_f32(),
            travel_range: (
                simulation.min_travel.as_secs_f32(),
                simulation.max_travel.as_secs_f32(),
            ),
            spawn_timer: 0.0,
            next_id: 0,
            spawned: 0,
            arrived: 0,
            hover: HoverLabel::default(),
            hovered: false,
            texture_path: config.paddle.texture.clone(),
            texture: None,
        }
    }

    pub fn paddles(&self) -> &[Paddle] {
        &self.paddles
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn arrived(&self) -> u64 {
        self.arrived
    }

    pub fn in_flight(&self) -> usize {
        self.balls.len()
    }

    pub fn report(&self) -> Vec<PaddleReport> {
        self.paddles
            .iter()
            .map(|paddle| PaddleReport {
                token: paddle.token().to_string(),
                y: paddle.y(),
                moving: paddle.moving(),
                target: paddle.target(),
            })
            .collect()
    }

    fn spawn_due(&mut self, dt: f32) {
        self.spawn_timer += dt;
        while self.spawn_timer >= self.request_interval {
            self.spawn_timer -= self.request_interval;
            self.spawn_ball();
        }
    }

    fn spawn_ball(&mut self) {
        let token = self.tokens.choose(&mut self.rng).cloned().unwrap_or_default();
        let height = self.settings.viewport_height;
        let margin = (PADDLE_HEIGHT / 2.0).min(height / 2.0);
        let start = Vec2::new(0.0, self.rng.gen_range(0.0..=height));
        let finish = Vec2::new(
            self.paddle_x(),
            self.rng.gen_range(margin..=height - margin),
        );
        let travel = self.rng.gen_range(self.travel_range.0..=self.travel_range.1);

        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.spawned += 1;
        tracing::trace!(%id, token = %token, travel, "request spawned");

        self.balls.push(RequestBall {
            id,
            colour: colour_hash(&token),
            token,
            start,
            finish,
            travel,
            elapsed: 0.0,
        });
    }

    fn paddle_x(&self) -> f32 {
        self.settings.viewport_width * self.x_fraction
    }

    fn advance_balls(&mut self, dt: f32) {
        for ball in &mut self.balls {
            ball.elapsed += dt;
        }
        let before = self.balls.len();
        self.balls.retain(|ball| !ball.arrived());
        self.arrived += (before - self.balls.len()) as u64;
    }

    /// Earliest-arriving ball a paddle with `token` should catch.
    fn next_ball_for<'a>(
        balls: &'a [RequestBall],
        mode: PaddleMode,
        token: &str,
    ) -> Option<&'a RequestBall> {
        balls
            .iter()
            .filter(|ball| !mode.groups_by_token() || ball.token == token)
            .min_by(|a, b| a.arrival_time().total_cmp(&b.arrival_time()))
    }

    fn steer_paddles(&mut self) {
        let settings = self.settings;
        let centre = settings.centre_y();
        for paddle in &mut self.paddles {
            if paddle.target().is_some() {
                continue;
            }

            if let Some(ball) = Self::next_ball_for(&self.balls, settings.paddle_mode, paddle.token())
            {
                paddle.set_target(Some(ball), &settings);
            } else if !paddle.moving() && (paddle.y() - centre).abs() > CENTRE_TOLERANCE {
                paddle.set_target(None::<&RequestBall>, &settings);
            }
        }
    }

    fn update_hover(&mut self, mouse: Option<Vec2>) {
        self.hovered = false;
        let Some(mouse) = mouse else {
            return;
        };
        for paddle in &self.paddles {
            if paddle.mouse_over(&mut self.hover, mouse) {
                self.hovered = true;
                break;
            }
        }
    }
}

impl Scene for PaddleScene {
    fn load_textures(&mut self, textures: &mut dyn TextureSource) {
        if let Some(path) = &self.texture_path {
            self.texture = textures.texture(path).map(|loaded| loaded.id);
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.settings.viewport_width = width;
        self.settings.viewport_height = height;
        let x = self.paddle_x();
        for paddle in &mut self.paddles {
            paddle.set_x(x);
        }
        for ball in &mut self.balls {
            ball.finish.x = x;
        }
    }

    fn update(&mut self, dt: f32, input: &FrameInput) {
        self.advance_balls(dt);
        self.spawn_due(dt);
        for paddle in &mut self.paddles {
            paddle.logic(dt);
        }
        self.steer_paddles();
        self.update_hover(input.mouse);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        for ball in &self.balls {
            let centre = ball.pos();
            let half = Vec2::splat(BALL_SIZE / 2.0);
            canvas.fill_quad(Rect::new(centre - half, centre + half), ball.colour.extend(1.0));
        }

        let labelled = self.settings.paddle_mode.groups_by_token();
        for paddle in self.paddles.iter().filter(|paddle| paddle.visible()) {
            paddle.draw_shadow(canvas);
            paddle.draw(canvas);
            if labelled {
                paddle.draw_token(canvas);
            }
            if let Some(texture) = self.texture {
                paddle.draw_decoration(canvas, texture);
            }
        }
    }

    fn status(&self) -> Option<String> {
        if !self.hovered {
            return None;
        }
        let summary = self.hover.summary();
        (!summary.is_empty()).then_some(summary)
    }
}
