use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement},
};
use log::{error, info, warn};

use space_rocks::audio::TerminalAudio;
use space_rocks::config::Options;
use space_rocks::constants::FRAME_RATE;
use space_rocks::game::{FrameClock, Game, GameSettings, Outcome};
use space_rocks::highscores::HighScores;
use space_rocks::input::{SimulatedInput, TerminalInput};
use space_rocks::rendering::{GameGrid, OutputTarget, ScreenBuffer};
use space_rocks::world::World;

fn main() -> ExitCode {
    let options = Options::parse();
    if let Err(e) = simple_logging::log_to_file(&options.log_file, options.log_level) {
        eprintln!("Failed to open log file {}: {}", options.log_file.display(), e);
        return ExitCode::FAILURE;
    }
    info!("Starting space-rocks with {:?}", options);

    let result = if options.debug { run_headless(&options) } else { run_terminal(&options) };

    match result {
        Ok(outcome) => {
            info!("Run finished: {:?}", outcome);
            if let Some(message) = outcome.message() {
                eprintln!("{}", message);
            }
            ExitCode::from(outcome.exit_code() as u8)
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("space-rocks: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn settings(options: &Options, interactive: bool, reports_releases: bool, clock: FrameClock) -> GameSettings {
    GameSettings {
        interactive,
        max_frames: options.max_frames,
        reports_releases,
        highscores: HighScores::new(&options.highscores),
        clock,
    }
}

fn run_headless(options: &Options) -> io::Result<Outcome> {
    info!("Debug mode enabled at {}x{}.", options.width, options.height);
    let output = OutputTarget::ScreenBuffer(ScreenBuffer::new(options.width, options.height));
    let mut game = Game::new(
        World::new(options.rng()),
        SimulatedInput::demo(),
        TerminalAudio::new(false),
        output,
        options.width,
        options.height,
        settings(options, false, false, FrameClock::unpaced()),
    );
    game.run()
}

fn run_terminal(options: &Options) -> io::Result<Outcome> {
    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let mut stdout_target = OutputTarget::Stdout(io::stdout());

    let reports_releases = supports_keyboard_enhancement().unwrap_or(false);
    let result = setup_terminal(&mut stdout_target, reports_releases).and_then(|(width, height)| {
        let mut game = Game::new(
            World::new(options.rng()),
            TerminalInput,
            TerminalAudio::new(options.bell),
            stdout_target,
            width,
            height,
            settings(options, true, reports_releases, FrameClock::new(FRAME_RATE)),
        );
        game.run()
    });

    restore_terminal(reports_releases);
    result
}

fn setup_terminal(stdout_target: &mut OutputTarget, reports_releases: bool) -> io::Result<(u16, u16)> {
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}, key releases reported: {}", width, height, reports_releases);

    GameGrid::new(width, height)
        .clear_screen_manual(stdout_target)
        .map_err(|e| { error!("Failed to clear screen manually: {}", e); e })?;
    stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
    stdout_target
        .execute_other_command(EnableMouseCapture)
        .map_err(|e| { error!("Failed to enable mouse capture: {}", e); e })?;
    if reports_releases {
        stdout_target
            .execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .map_err(|e| { error!("Failed to enable key release reporting: {}", e); e })?;
    }
    stdout_target.flush()?;
    Ok((width, height))
}

/// Best effort: the game may have failed halfway through setup.
fn restore_terminal(reports_releases: bool) {
    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    if reports_releases {
        if let Err(e) = stdout_target.execute_other_command(PopKeyboardEnhancementFlags) {
            warn!("Failed to pop keyboard flags on exit: {}", e);
        }
    }
    if let Err(e) = stdout_target.execute_other_command(DisableMouseCapture) {
        warn!("Failed to disable mouse capture on exit: {}", e);
    }
    if let Err(e) = stdout_target.execute_other_command(Show) {
        warn!("Failed to show cursor on exit: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        warn!("Failed to disable raw mode on exit: {}", e);
    }
    let _ = writeln!(stdout_target);
}
