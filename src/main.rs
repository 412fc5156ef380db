mod config;
mod engine;
mod food;
mod game;
mod grid;
mod snake;
mod term;

use std::{fs::File, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Args, Settings};
use engine::Engine;

pub type TermInt = u16;
pub type GridInt = u16;
pub type Cell = (GridInt, GridInt);

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let settings = Settings::from_args(&args)?;
    let engine = Engine::new(settings.engine_config()?);

    let mut game = game::SnakeGame::new(engine, settings.tick_interval()?)?;
    game.initialize()?;

    if game.show_intro()? {
        // The game loop only returns once the player quits
        game.run()?;
    }

    Ok(())
}
