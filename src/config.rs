use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::constants::{DEFAULT_HIGHSCORE_FILE, DEFAULT_LOG_FILE};

#[derive(Parser, Debug, Clone)]
#[command(name = "space-rocks", about = "Shoot the rocks, grab the gems, keep your hearts.")]
pub struct Options {
    /// Render into an in-memory buffer dumped to the log and play a scripted demo
    #[arg(long)]
    pub debug: bool,

    /// Screen buffer width in debug mode
    #[arg(long, default_value_t = 80)]
    pub width: u16,

    /// Screen buffer height in debug mode
    #[arg(long, default_value_t = 24)]
    pub height: u16,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Score log, one `score,wave` record per line
    #[arg(long, default_value = DEFAULT_HIGHSCORE_FILE)]
    pub highscores: PathBuf,

    /// Seed for the random source
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Ring the terminal bell on gem pickups and game over
    #[arg(long)]
    pub bell: bool,
}

impl Options {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
