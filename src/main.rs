use anyhow::{Context, Result};
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

use chess_tree::config::EngineConfig;
use chess_tree::play::ConsoleGame;

fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the board on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => EngineConfig::default(),
    };

    let mut console = ConsoleGame::new(&config)?;
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();
    console.run(&mut reader, &mut stdout)
}
