use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use gridsnake::config::{Cli, Config};
use gridsnake::game::{GameLoop, GameSession};
use gridsnake::grid::Grid;
use gridsnake::logging;
use gridsnake::render::TerminalCanvas;
use gridsnake::score::FileStore;

fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    logging::setup(&config.log_file, config.debug)?;
    log::info!("Starting with {:?}", config);

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let grid = Grid::default();
    let store = FileStore::new(&config.score_dir);
    let session = GameSession::new(grid, rng, store);

    let mut game = GameLoop::new(session, TerminalCanvas::stdout(grid), config.tick_interval);
    let result = game.run();
    if let Err(e) = &result {
        log::error!("{e}");
    }
    result
}
