use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind};
use crossterm::style::Color;
use log::{error, info};

use crate::audio::{AudioSink, Cue};
use crate::constants::{FRAME_RATE, WORLD_WIDTH};
use crate::highscores::HighScores;
use crate::input::{Controls, Exit, InputSource, exit_requested, is_click};
use crate::rendering::{GameGrid, OutputTarget};
use crate::world::{Phase, Transition, World};

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `q` or Ctrl-C, on any screen.
    Quit,
    /// Esc, on any screen but game over.
    Escaped,
    /// Out of lives; carries the death message.
    Died(String),
    /// `--max-frames` reached.
    FrameLimit,
}

impl Outcome {
    pub const ESCAPE_MESSAGE: &'static str = "Game script terminated.";

    /// Text to print once the terminal is restored.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Escaped => Some(Self::ESCAPE_MESSAGE),
            Outcome::Died(message) => Some(message),
            Outcome::Quit | Outcome::FrameLimit => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Quit | Outcome::FrameLimit => 0,
            Outcome::Escaped | Outcome::Died(_) => 1,
        }
    }
}

impl From<Exit> for Outcome {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Quit => Outcome::Quit,
            Exit::Escape => Outcome::Escaped,
        }
    }
}

/// Fixed-rate frame pacing. Falls back into step instead of bursting after a slow frame.
pub struct FrameClock {
    period: Option<Duration>,
    next: Instant,
}

impl FrameClock {
    pub fn new(frame_rate: u32) -> Self {
        FrameClock {
            period: Some(Duration::from_secs(1) / frame_rate.max(1)),
            next: Instant::now(),
        }
    }

    /// Never sleeps; for headless runs.
    pub fn unpaced() -> Self {
        FrameClock { period: None, next: Instant::now() }
    }

    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        self.next += period;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        } else {
            self.next = now;
        }
    }
}

pub struct GameSettings {
    /// Title screen and click-to-continue pauses are shown only when interactive.
    pub interactive: bool,
    pub max_frames: Option<u64>,
    pub reports_releases: bool,
    pub highscores: HighScores,
    pub clock: FrameClock,
}

pub struct Game<I: InputSource, A: AudioSink> {
    pub world: World,
    input: I,
    audio: A,
    output: OutputTarget,
    grid: GameGrid,
    controls: Controls,
    settings: GameSettings,
    frame_count: u64,
}

impl<I: InputSource, A: AudioSink> Game<I, A> {
    pub fn new(world: World, input: I, audio: A, output: OutputTarget, width: u16, height: u16, settings: GameSettings) -> Self {
        Game {
            world,
            input,
            audio,
            output,
            grid: GameGrid::new(width, height),
            controls: Controls::new(settings.reports_releases),
            settings,
            frame_count: 0,
        }
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn run(&mut self) -> io::Result<Outcome> {
        if self.settings.interactive {
            if let Some(exit) = self.show_title_screen()? {
                info!("Exit requested on title screen: {:?}", exit);
                return Ok(exit.into());
            }
        }
        info!("Entering game loop.");

        loop {
            if self.settings.max_frames.is_some_and(|max| self.frame_count >= max) {
                info!("Frame limit of {} reached.", self.frame_count);
                return Ok(Outcome::FrameLimit);
            }

            let frame = self.frame_count;
            for event in self.input.poll(frame)? {
                if let Event::Resize(width, height) = event {
                    self.grid.resize(width, height);
                    info!("Terminal resized to {}x{}", width, height);
                }
                if let Some(exit) = self.controls.handle(&event, frame) {
                    info!("Exit requested: {:?}", exit);
                    return Ok(exit.into());
                }
            }

            let now = Instant::now();
            for command in self.controls.commands(frame) {
                self.world.command(command, now);
            }
            self.world.update(now);
            self.play_cues();

            self.render()?;

            match self.world.end_frame() {
                Transition::None => {}
                Transition::WaveReady => {
                    if let Some(exit) = self.pause_for_next_wave()? {
                        info!("Exit requested between waves: {:?}", exit);
                        return Ok(exit.into());
                    }
                }
                Transition::GameOver => return self.game_over(),
            }

            self.frame_count += 1;
            self.settings.clock.wait();
        }
    }

    fn play_cues(&mut self) {
        for cue in self.world.take_cues() {
            self.audio.play(cue);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.grid.clear();
        for sprite in self.world.sprites() {
            sprite.draw(&mut self.grid);
        }
        let score = format!("Score: {}", self.world.score);
        let score_x = self.grid.width.saturating_sub(score.len() as u16 + 1);
        self.grid.put_text(score_x, 0, &score);

        self.grid.render(&mut self.output).map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
        if !self.world.message.is_empty() {
            let message = self.world.message.clone();
            let color = if self.world.phase == Phase::Dead { Color::Red } else { Color::Green };
            self.banner(&message, color)?;
        }
        self.output.flush().map_err(|e| { error!("Failed to flush stdout after rendering: {}", e); e })?;
        self.output.log_frame();
        Ok(())
    }

    /// Centred one-line message over whatever is on screen.
    fn banner(&mut self, text: &str, color: Color) -> io::Result<()> {
        let x = self.grid.centered_column(WORLD_WIDTH / 2.0, text);
        let y = self.grid.height / 2;
        self.output.write_at(x, y, text, color)
    }

    fn pause_for_next_wave(&mut self) -> io::Result<Option<Exit>> {
        let message = self.world.message.clone();
        self.banner(&message, Color::Green)?;
        self.output.flush()?;
        if self.settings.interactive {
            if let Some(exit) = self.wait_for_click()? {
                return Ok(Some(exit));
            }
        }
        self.controls.reset();
        self.world.next_wave();
        Ok(None)
    }

    fn game_over(&mut self) -> io::Result<Outcome> {
        let message = self.world.message.clone();
        self.banner(&message, Color::Red)?;
        self.output.flush()?;

        self.settings
            .highscores
            .record(self.world.score, self.world.wave)
            .map_err(|e| { error!("Failed to record high score: {}", e); e })?;
        let top = self
            .settings
            .highscores
            .top()
            .map_err(|e| { error!("Failed to read high scores: {}", e); e })?;

        self.grid.clear();
        let heading = "Game Over";
        let heading_x = self.grid.centered_column(350.0, heading);
        let heading_y = self.grid.row_of(70.0);
        for (i, score) in top.iter().enumerate() {
            let text = score.to_string();
            let x = self.grid.centered_column(375.0, &text);
            let y = self.grid.row_of(50.0 * i as f64 + 140.0);
            self.grid.put_text(x, y, &text);
        }
        self.grid.render(&mut self.output)?;
        self.output.write_at(heading_x, heading_y, heading, Color::Red)?;
        self.output.flush()?;
        self.output.log_frame();
        self.audio.play(Cue::Lose);
        info!("Game over. Top scores: {:?}", top);

        if self.settings.interactive {
            self.wait_for_click()?;
        }
        Ok(Outcome::Died(message))
    }

    /// Returns the exit key if the player left instead of starting.
    fn show_title_screen(&mut self) -> io::Result<Option<Exit>> {
        let title = "Asteroids!";
        let prompt = "Press any key or click to start!";
        let mut ticks = 0u64;
        loop {
            for event in self.input.poll(0)? {
                match &event {
                    Event::Key(key) if exit_requested(key).is_some() => return Ok(exit_requested(key)),
                    Event::Key(key) if key.kind != KeyEventKind::Repeat => return Ok(None),
                    Event::Resize(width, height) => self.grid.resize(*width, *height),
                    _ if is_click(&event) => return Ok(None),
                    _ => {}
                }
            }

            self.grid.clear();
            let bob = (2.5 * (ticks as f64 / FRAME_RATE as f64 - 3.0)).sin() * 30.0;
            let title_y = self.grid.row_of(180.0 + bob);
            let prompt_y = self.grid.row_of(400.0);
            let title_x = self.grid.centered_column(WORLD_WIDTH / 2.0, title);
            let prompt_x = self.grid.centered_column(WORLD_WIDTH / 2.0, prompt);
            self.grid.put_text(title_x, title_y, title);
            self.grid.put_text(prompt_x, prompt_y, prompt);
            self.grid.render(&mut self.output)?;
            self.output.flush()?;

            ticks += 1;
            self.settings.clock.wait();
        }
    }

    /// Blocks until a mouse click. Returns the exit key if the player left instead.
    fn wait_for_click(&mut self) -> io::Result<Option<Exit>> {
        let mut tick = self.frame_count;
        loop {
            for event in self.input.poll(tick)? {
                match &event {
                    Event::Key(key) if exit_requested(key).is_some() => return Ok(exit_requested(key)),
                    _ if is_click(&event) => return Ok(None),
                    _ => {}
                }
            }
            tick += 1;
            self.settings.clock.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordedAudio;
    use crate::constants::WAVE_CLEAR_DELAY_TICKS;
    use crate::input::SimulatedInput;
    use crate::rendering::ScreenBuffer;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn game(input: SimulatedInput, max_frames: Option<u64>, dir: &TempDir) -> Game<SimulatedInput, RecordedAudio> {
        game_with(input, max_frames, false, dir)
    }

    fn game_with(
        input: SimulatedInput,
        max_frames: Option<u64>,
        interactive: bool,
        dir: &TempDir,
    ) -> Game<SimulatedInput, RecordedAudio> {
        let settings = GameSettings {
            interactive,
            max_frames,
            reports_releases: false,
            highscores: HighScores::new(dir.path().join("highscores.txt")),
            clock: FrameClock::unpaced(),
        };
        let world = World::new(StdRng::seed_from_u64(99));
        let output = OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24));
        Game::new(world, input, RecordedAudio::default(), output, 80, 24, settings)
    }

    fn screen<I: InputSource, A: AudioSink>(game: &Game<I, A>) -> &ScreenBuffer {
        match game.output() {
            OutputTarget::ScreenBuffer(sb) => sb,
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }

    #[test]
    fn runs_until_the_frame_limit() {
        let dir = TempDir::new().unwrap();
        let mut game = game(SimulatedInput::demo(), Some(120), &dir);
        assert_eq!(game.run().unwrap(), Outcome::FrameLimit);
        assert_eq!(game.frame_count(), 120);
        assert!(screen(&game).contains("Score:"));
        assert!(game.audio().played.contains(&Cue::Laser));
    }

    #[test]
    fn escape_ends_the_run_with_a_message() {
        let dir = TempDir::new().unwrap();
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(5, Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        let mut game = game(input, Some(100), &dir);
        let outcome = game.run().unwrap();
        assert_eq!(outcome, Outcome::Escaped);
        assert_eq!(outcome.message(), Some("Game script terminated."));
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(game.frame_count(), 5);
    }

    #[test]
    fn quit_key_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(0, Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        let outcome = game(input, None, &dir).run().unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(outcome.message(), None);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn cleared_wave_rolls_over_to_the_next() {
        let dir = TempDir::new().unwrap();
        let mut game = game(SimulatedInput::new(HashMap::new()), Some(700), &dir);
        game.world.asteroids.clear();
        assert_eq!(game.run().unwrap(), Outcome::FrameLimit);
        assert_eq!(game.world.wave, 2);
        assert_eq!(game.world.asteroids.len(), 3);
    }

    #[test]
    fn escape_on_title_screen_prints_the_message() {
        let dir = TempDir::new().unwrap();
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(0, Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        let outcome = game_with(input, None, true, &dir).run().unwrap();
        assert_eq!(outcome, Outcome::Escaped);
        assert_eq!(outcome.message(), Some("Game script terminated."));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn escape_between_waves_prints_the_message() {
        let dir = TempDir::new().unwrap();
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(0, Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        // Frame `delay` is the last one played; the pause screen keeps counting from there.
        let delay = WAVE_CLEAR_DELAY_TICKS as u64;
        input.push(delay + 1, Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        let mut game = game_with(input, Some(2 * delay), true, &dir);
        game.world.asteroids.clear();
        assert_eq!(game.run().unwrap(), Outcome::Escaped);
        assert_eq!(game.world.wave, 1);
    }

    #[test]
    fn quit_between_waves_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(0, Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        let delay = WAVE_CLEAR_DELAY_TICKS as u64;
        input.push(delay + 1, Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        let mut game = game_with(input, Some(2 * delay), true, &dir);
        game.world.asteroids.clear();
        assert_eq!(game.run().unwrap(), Outcome::Quit);
    }

    #[test]
    fn frame_clock_paces_frames() {
        let mut clock = FrameClock::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            clock.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
