use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::score::FileStore;

const DEFAULT_TICK_MS: u64 = 250;
const DEFAULT_LOG_FILE: &str = "/tmp/gridsnake.log";

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid snake in the terminal", long_about = None)]
pub struct Cli {
    /// Milliseconds between two moves of the snake
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Directory where the top score is kept
    #[arg(long, value_name = "DIRECTORY")]
    score_dir: Option<PathBuf>,

    /// Seed for fruit placement, random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Turn debugging information on
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tick_interval: Duration,
    pub score_dir: PathBuf,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Config> {
        if cli.tick_ms == 0 {
            return Err(anyhow!("tick interval must be at least 1ms"));
        }
        let score_dir = match cli.score_dir {
            Some(dir) => dir,
            None => FileStore::default_dir()
                .ok_or_else(|| anyhow!("no data directory, pass --score-dir"))?,
        };
        Ok(Config {
            tick_interval: Duration::from_millis(cli.tick_ms),
            score_dir,
            seed: cli.seed,
            log_file: cli.log_file,
            debug: cli.debug,
        })
    }
}
