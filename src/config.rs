// Settings: defaults, then the optional TOML file, then command-line flags
use std::{fs, path::{Path, PathBuf}, time::Duration};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;

use crate::GridInt;
use crate::grid::Grid;

pub const DEFAULT_WIDTH: GridInt = 32;
pub const DEFAULT_HEIGHT: GridInt = 24;
pub const DEFAULT_TICK_RATE: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: GridInt, height: GridInt },
    #[error("a {width}x{height} grid has no room for food next to the snake")]
    GridTooSmall { width: GridInt, height: GridInt },
    #[error("tick rate must be at least one tick per second")]
    ZeroTickRate,
    #[error("could not read config file {path}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("could not parse config file {path}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

/// What happens when the head moves onto the cell the tail is leaving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TailRule {
    /// The tail moves out as the head moves in: safe.
    #[default]
    Vacate,
    /// Every current segment counts, the tail included: fatal.
    Solid,
}

#[derive(Parser, Debug, Default)]
#[command(version, about = "Snake on a wrap-around grid, in the terminal")]
pub struct Args {
    /// TOML file with game settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    pub width: Option<GridInt>,

    /// Grid height in cells
    #[arg(long)]
    pub height: Option<GridInt>,

    /// Game updates per second
    #[arg(short, long)]
    pub tick_rate: Option<u32>,

    /// Whether reaching the retreating tail is a collision
    #[arg(long, value_enum)]
    pub tail_rule: Option<TailRule>,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub width: GridInt,
    pub height: GridInt,
    pub tick_rate: u32,
    pub tail_rule: TailRule,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate: DEFAULT_TICK_RATE,
            tail_rule: TailRule::default(),
            seed: None,
        }
    }
}

/// Everything the engine needs, already validated.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub grid: Grid,
    pub tail_rule: TailRule,
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn new(width: GridInt, height: GridInt) -> Result<Self, ConfigError> {
        Ok(EngineConfig { grid: Grid::new(width, height)?, tail_rule: TailRule::default(), seed: None })
    }

    pub fn with_tail_rule(mut self, tail_rule: TailRule) -> Self {
        self.tail_rule = tail_rule;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Settings {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Settings::from_toml_str(&text, path)
    }

    /// Builds settings from the command line, reading `--config` if given.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let base = match &args.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Ok(base.merge_args(args))
    }

    pub fn merge_args(self, args: &Args) -> Self {
        Settings {
            width: args.width.unwrap_or(self.width),
            height: args.height.unwrap_or(self.height),
            tick_rate: args.tick_rate.unwrap_or(self.tick_rate),
            tail_rule: args.tail_rule.unwrap_or(self.tail_rule),
            seed: args.seed.or(self.seed),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig::new(self.width, self.height)?.with_tail_rule(self.tail_rule);
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        Ok(Duration::from_secs(1) / self.tick_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Settings, ConfigError> {
        Settings::from_toml_str(text, Path::new("snake.toml"))
    }

    #[test]
    fn defaults_match_classic_board() {
        let settings = Settings::default();

        assert_eq!((settings.width, settings.height), (32, 24));
        assert_eq!(settings.tick_rate, 20);
        assert_eq!(settings.tail_rule, TailRule::Vacate);
        assert_eq!(settings.tick_interval().unwrap(), Duration::from_millis(50));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = parse("width = 40\ntail_rule = \"solid\"\n").unwrap();

        assert_eq!(settings.width, 40);
        assert_eq!(settings.height, DEFAULT_HEIGHT);
        assert_eq!(settings.tail_rule, TailRule::Solid);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse("colour = \"red\""), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Settings::load(Path::new("/nonexistent/snake.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn args_override_file() {
        let file = parse("width = 40\nheight = 30\nseed = 5\n").unwrap();
        let args = Args { height: Some(10), seed: Some(9), ..Args::default() };

        let merged = file.merge_args(&args);
        assert_eq!((merged.width, merged.height), (40, 10));
        assert_eq!(merged.seed, Some(9));
    }

    #[test]
    fn cli_flags_parse() {
        let args = Args::try_parse_from(["toroid-snake", "--width", "12", "--tail-rule", "solid", "--seed", "3"]).unwrap();

        assert_eq!(args.width, Some(12));
        assert_eq!(args.tail_rule, Some(TailRule::Solid));
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.config, None);
    }

    #[test]
    fn zero_width_is_a_config_error() {
        let settings = Settings { width: 0, ..Settings::default() };
        assert!(matches!(settings.engine_config(), Err(ConfigError::ZeroDimension { .. })));
    }

    #[test]
    fn zero_tick_rate_is_a_config_error() {
        let settings = Settings { tick_rate: 0, ..Settings::default() };
        assert!(matches!(settings.tick_interval(), Err(ConfigError::ZeroTickRate)));
    }

    #[test]
    fn engine_config_carries_rule_and_seed() {
        let settings = Settings { tail_rule: TailRule::Solid, seed: Some(11), ..Settings::default() };
        let config = settings.engine_config().unwrap();

        assert_eq!(config.grid, Grid::new(32, 24).unwrap());
        assert_eq!(config.tail_rule, TailRule::Solid);
        assert_eq!(config.seed, Some(11));
    }
}
