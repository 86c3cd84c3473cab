use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use paddle::PaddleMode;

#[derive(Parser, Debug)]
#[command(
    name = "logpaddle",
    author,
    version,
    about = "Animated request paddles",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Scene configuration file (defaults to `logpaddle.toml` in the user config directory).
    #[arg(long, value_name = "FILE", env = "LOGPADDLE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// How requests are grouped onto paddles (`none`, `single`, `vhost`, `pid`).
    #[arg(long, value_name = "MODE", value_parser = parse_mode, global = true)]
    pub mode: Option<PaddleMode>,

    /// Viewport size in pixels, e.g. `1280x720`.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions, global = true)]
    pub size: Option<(u32, u32)>,

    /// PNG drawn over each paddle.
    #[arg(long, value_name = "PATH", global = true)]
    pub texture: Option<PathBuf>,

    /// Seed for the request simulation.
    #[arg(long, value_name = "N", global = true)]
    pub seed: Option<u64>,

    /// Present frames as fast as possible instead of waiting for vblank.
    #[arg(long)]
    pub no_vsync: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the request simulation without a window and print paddle positions.
    Simulate(SimulateArgs),
    /// Print the resolved configuration file location.
    Where,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of frames to advance.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Seconds per frame.
    #[arg(long, value_name = "SECS", default_value_t = 1.0 / 60.0, value_parser = parse_step)]
    pub dt: f32,

    /// Print paddle state every N frames.
    #[arg(long, value_name = "N", default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub every: u32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_mode(value: &str) -> Result<PaddleMode, String> {
    if value.trim().is_empty() {
        return Err("paddle mode must not be empty".to_string());
    }
    value.parse()
}

fn parse_step(value: &str) -> Result<f32, String> {
    let step: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame step '{value}'"))?;
    if !step.is_finite() || step <= 0.0 {
        return Err("frame step must be a positive number of seconds".into());
    }
    Ok(step)
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in viewport size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in viewport size".to_string())?;
    if width == 0 || height == 0 {
        return Err("viewport dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions() {
        assert_eq!(parse_dimensions("800x600").unwrap(), (800, 600));
        assert_eq!(parse_dimensions(" 640 X 480 ").unwrap(), (640, 480));
        assert!(parse_dimensions("800").is_err());
        assert!(parse_dimensions("0x600").is_err());
        assert!(parse_dimensions("wide x 600").is_err());
    }

    #[test]
    fn parses_modes() {
        assert_eq!(parse_mode("vhost").unwrap(), PaddleMode::Vhost);
        assert_eq!(parse_mode("PID").unwrap(), PaddleMode::Pid);
        assert!(parse_mode("").is_err());
        assert!(parse_mode("hosts").is_err());
    }

    #[test]
    fn rejects_non_positive_steps() {
        assert!(parse_step("0").is_err());
        assert!(parse_step("-0.5").is_err());
        assert!(parse_step("NaN").is_err());
        assert_eq!(parse_step("0.25").unwrap(), 0.25);
    }

    #[test]
    fn simulate_subcommand_accepts_global_overrides() {
        let cli = Cli::try_parse_from([
            "logpaddle", "simulate", "--frames", "10", "--dt", "0.1", "--mode", "pid",
        ])
        .unwrap();
        assert_eq!(cli.run.mode, Some(PaddleMode::Pid));
        match cli.command {
            Some(Command::Simulate(args)) => {
                assert_eq!(args.frames, 10);
                assert_eq!(args.dt, 0.1);
                assert_eq!(args.every, 60);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
