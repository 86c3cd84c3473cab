use std::io::{self, Write};

use anyhow::{Context, Result};
use paddle::PaddleMode;
use renderer::{FrameInput, Renderer, RendererConfig, Scene};
use sceneconfig::SceneConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{RunArgs, SimulateArgs};
use crate::paths::AppPaths;
use crate::scene::PaddleScene;

pub fn run(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let renderer_config = RendererConfig {
        surface_size: (config.display.width, config.display.height),
        background: config.display.background,
        vsync: !args.no_vsync,
        ..RendererConfig::default()
    };
    tracing::info!(
        mode = %config.display.paddle_mode,
        width = config.display.width,
        height = config.display.height,
        texture = ?config.paddle.texture,
        "starting logpaddle"
    );

    let scene = PaddleScene::new(&config);
    Renderer::new(renderer_config).run(scene)
}

pub fn simulate(args: &RunArgs, sim: &SimulateArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let mut scene = PaddleScene::new(&config);
    scene.resize(config.display.width as f32, config.display.height as f32);
    tracing::debug!(frames = sim.frames, dt = sim.dt, every = sim.every, "simulating");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let input = FrameInput::default();
    for frame in 1..=sim.frames {
        scene.update(sim.dt, &input);
        if frame % sim.every == 0 || frame == sim.frames {
            for report in scene.report() {
                let token = if report.token.is_empty() {
                    "-"
                } else {
                    report.token.as_str()
                };
                let target = report
                    .target
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                writeln!(
                    out,
                    "frame={frame} token={token} y={:.2} moving={} target={target}",
                    report.y, report.moving
                )?;
            }
        }
    }
    writeln!(
        out,
        "simulated {} frames: spawned={} arrived={} in_flight={}",
        sim.frames,
        scene.spawned(),
        scene.arrived(),
        scene.in_flight()
    )?;
    Ok(())
}

pub fn print_paths() -> Result<()> {
    let paths = AppPaths::discover()?;
    println!("config dir:  {}", paths.config_dir().display());
    println!("config file: {}", paths.config_file().display());
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Loads the configuration file and applies command-line overrides on top.
fn resolve_config(args: &RunArgs) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let path = AppPaths::discover()?.config_file();
            tracing::debug!(path = %path.display(), "looking for default config");
            SceneConfig::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
    };

    apply_overrides(&mut config, args);
    config
        .validate()
        .context("invalid configuration after command-line overrides")?;
    Ok(config)
}

fn apply_overrides(config: &mut SceneConfig, args: &RunArgs) {
    if let Some(mode) = args.mode {
        config.display.paddle_mode = mode;
    }
    if let Some((width, height)) = args.size {
        config.display.width = width;
        config.display.height = height;
    }
    if let Some(texture) = &args.texture {
        config.paddle.texture = Some(texture.clone());
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if config.display.paddle_mode == PaddleMode::None {
        tracing::info!("paddle mode is 'none'; no paddles will be drawn");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = SceneConfig::default();
        let args = RunArgs {
            mode: Some(PaddleMode::Vhost),
            size: Some((640, 480)),
            texture: Some(PathBuf::from("paddle.png")),
            seed: Some(42),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.display.paddle_mode, PaddleMode::Vhost);
        assert_eq!((config.display.width, config.display.height), (640, 480));
        assert_eq!(config.paddle.texture, Some(PathBuf::from("paddle.png")));
        assert_eq!(config.simulation.seed, 42);
    }

    #[test]
    fn missing_overrides_keep_config() {
        let mut config = SceneConfig::default();
        config.display.width = 1024;
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.display.width, 1024);
        assert_eq!(config.display.paddle_mode, PaddleMode::Single);
    }
}
