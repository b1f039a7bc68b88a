use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::constants::{HIGHSCORE_DISPLAY_COUNT, HIGHSCORE_THRESHOLD};

/// One `score,wave` line of the score log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreRecord {
    pub score: u64,
    pub wave: u32,
}

impl ScoreRecord {
    pub fn parse(line: &str) -> io::Result<Self> {
        let invalid = || io::Error::new(io::ErrorKind::InvalidData, format!("malformed score line: {:?}", line));
        let (score, wave) = line.trim().split_once(',').ok_or_else(invalid)?;
        Ok(ScoreRecord {
            score: score.trim().parse().map_err(|_| invalid())?,
            wave: wave.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Plain-text score log. Appends go to the end of the file; there is no locking.
pub struct HighScores {
    path: PathBuf,
}

impl HighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScores { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn qualifies(score: u64) -> bool {
        score >= HIGHSCORE_THRESHOLD
    }

    /// Appends the record when it clears the threshold. Returns whether anything was written.
    pub fn record(&self, score: u64, wave: u32) -> io::Result<bool> {
        if !Self::qualifies(score) {
            return Ok(false);
        }
        let needs_newline = match fs::read(&self.path) {
            Ok(bytes) => bytes.last().is_some_and(|&b| b != b'\n'),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e),
        };
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{},{}", score, wave)?;
        info!("High score {} (wave {}) appended to {}", score, wave, self.path.display());
        Ok(true)
    }

    /// Every record in file order. A missing file reads as empty.
    pub fn load(&self) -> io::Result<Vec<ScoreRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ScoreRecord::parse)
            .collect()
    }

    /// Best scores, highest first.
    pub fn top(&self) -> io::Result<Vec<u64>> {
        let mut scores: Vec<u64> = self.load()?.into_iter().map(|r| r.score).collect();
        scores.sort_unstable();
        Ok(scores.into_iter().rev().take(HIGHSCORE_DISPLAY_COUNT).collect())
    }
}
