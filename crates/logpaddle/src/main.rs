mod cli;
mod paths;
mod run;
mod scene;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Simulate(args)) => run::simulate(&cli.run, &args),
        Some(Command::Where) => run::print_paths(),
        None => run::run(&cli.run),
    }
}
