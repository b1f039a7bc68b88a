use std::io::{self, Write};

use log::{info, warn};

/// Named sound cues. Playback itself belongs to whatever sink is plugged in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Laser,
    Explosion,
    Reward,
    Lose,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Laser => "laser",
            Cue::Explosion => "boom",
            Cue::Reward => "reward",
            Cue::Lose => "lose",
        }
    }
}

/// Fire-and-forget playback.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Logs every cue and optionally rings the terminal bell for the ones the player should notice.
pub struct TerminalAudio {
    bell: bool,
}

impl TerminalAudio {
    pub fn new(bell: bool) -> Self {
        TerminalAudio { bell }
    }
}

impl AudioSink for TerminalAudio {
    fn play(&mut self, cue: Cue) {
        info!("Cue: {}", cue.name());
        if self.bell && matches!(cue, Cue::Reward | Cue::Lose) {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                warn!("Failed to ring bell: {}", e);
            }
        }
    }
}

/// Keeps every cue it is handed; used by headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordedAudio {
    pub played: Vec<Cue>,
}

impl AudioSink for RecordedAudio {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}
