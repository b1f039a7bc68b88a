use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::error;

use crate::constants::KEY_REPEAT_FRAMES;
use crate::world::Command;

/// Held commands, in the order they are applied each frame.
const LEVEL_COMMANDS: [Command; 5] = [
    Command::RotateClockwise,
    Command::RotateCounterClockwise,
    Command::Thrust,
    Command::Reverse,
    Command::Brake,
];

/// Ways the player can end the program from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// `q` or Ctrl-C: leave immediately.
    Quit,
    /// Esc: leave with a message.
    Escape,
}

/// Something that hands over the events that arrived since the last frame.
pub trait InputSource {
    fn poll(&mut self, frame: u64) -> io::Result<Vec<Event>>;
}

/// Live crossterm events. Never blocks; pacing is the frame clock's job.
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll(&mut self, _frame: u64) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }
        Ok(events)
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// A short scripted flight: thrust, turn, fire a volley, brake, then quit after ten seconds.
    pub fn demo() -> Self {
        let mut script: HashMap<u64, Vec<Event>> = HashMap::new();
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        for frame in 1..20 {
            script.entry(frame).or_default().push(key(KeyCode::Up));
        }
        for frame in 20..38 {
            script.entry(frame).or_default().push(key(KeyCode::Right));
        }
        for frame in (40..100).step_by(10) {
            script.entry(frame).or_default().push(key(KeyCode::Char(' ')));
        }
        for frame in 100..110 {
            script.entry(frame).or_default().push(key(KeyCode::Char('b')));
        }
        script.entry(600).or_default().push(key(KeyCode::Char('q')));
        SimulatedInput::new(script)
    }

    pub fn push(&mut self, frame: u64, event: Event) {
        self.events.entry(frame).or_default().push(event);
    }
}

impl InputSource for SimulatedInput {
    fn poll(&mut self, frame: u64) -> io::Result<Vec<Event>> {
        Ok(self.events.remove(&frame).unwrap_or_default())
    }
}

/// Commands bound to a key. `S` both reverses and brakes.
pub fn bindings(code: KeyCode) -> &'static [Command] {
    match code {
        KeyCode::Right => &[Command::RotateClockwise],
        KeyCode::Left => &[Command::RotateCounterClockwise],
        KeyCode::Up => &[Command::Thrust],
        KeyCode::Down => &[Command::Reverse],
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'd' => &[Command::RotateClockwise],
            'a' => &[Command::RotateCounterClockwise],
            'w' => &[Command::Thrust],
            's' => &[Command::Reverse, Command::Brake],
            'b' => &[Command::Brake],
            ' ' => &[Command::Shoot],
            _ => &[],
        },
        _ => &[],
    }
}

pub fn exit_requested(key: &KeyEvent) -> Option<Exit> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(Exit::Escape),
        KeyCode::Char('q') => Some(Exit::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Exit::Quit),
        _ => None,
    }
}

/// True for the events that dismiss a title or pause screen.
pub fn is_click(event: &Event) -> bool {
    matches!(event, Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Up(_)))
}

/// Turns key events into per-frame ship commands.
///
/// Steering and thrust are level-triggered: they repeat every frame the key is held.
/// Terminals that report key releases end a hold exactly. Elsewhere a press counts
/// for its own frame only, and each auto-repeat keeps the key down for
/// `KEY_REPEAT_FRAMES` so the gaps between repeats don't stutter.
/// Shooting is edge-triggered and fires once per press.
pub struct Controls {
    reports_releases: bool,
    /// First frame at which each held command lapses, absent a release.
    held: HashMap<Command, u64>,
    shots: u32,
}

impl Controls {
    pub fn new(reports_releases: bool) -> Self {
        Controls { reports_releases, held: HashMap::new(), shots: 0 }
    }

    pub fn handle(&mut self, event: &Event, frame: u64) -> Option<Exit> {
        let Event::Key(key) = event else {
            return None;
        };
        if let Some(exit) = exit_requested(key) {
            return Some(exit);
        }
        for &command in bindings(key.code) {
            match (command, key.kind) {
                (_, KeyEventKind::Release) => {
                    self.held.remove(&command);
                }
                (Command::Shoot, KeyEventKind::Press) => self.shots += 1,
                (Command::Shoot, KeyEventKind::Repeat) => {}
                (_, KeyEventKind::Repeat) => {
                    self.held.insert(command, frame + KEY_REPEAT_FRAMES);
                }
                (_, KeyEventKind::Press) => {
                    let until = self.held.get(&command).copied().unwrap_or(0).max(frame + 1);
                    self.held.insert(command, until);
                }
            }
        }
        None
    }

    pub fn is_held(&self, command: Command, frame: u64) -> bool {
        match self.held.get(&command) {
            Some(_) if self.reports_releases => true,
            Some(&until) => frame < until,
            None => false,
        }
    }

    /// Commands for this frame: held ones first, then any queued shots.
    pub fn commands(&mut self, frame: u64) -> Vec<Command> {
        let mut commands: Vec<Command> = LEVEL_COMMANDS
            .into_iter()
            .filter(|&command| self.is_held(command, frame))
            .collect();
        commands.extend((0..self.shots).map(|_| Command::Shoot));
        self.shots = 0;
        commands
    }

    /// Forgets every hold, e.g. after a pause screen.
    pub fn reset(&mut self) {
        self.held.clear();
        self.shots = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent};

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn held_keys_repeat_every_frame() {
        let mut controls = Controls::new(true);
        controls.handle(&key(KeyCode::Up, KeyEventKind::Press), 0);
        assert_eq!(controls.commands(0), vec![Command::Thrust]);
        assert_eq!(controls.commands(500), vec![Command::Thrust]);
        controls.handle(&key(KeyCode::Up, KeyEventKind::Release), 501);
        assert!(controls.commands(501).is_empty());
    }

    #[test]
    fn single_tap_turns_once_without_release_reports() {
        let mut controls = Controls::new(false);
        controls.handle(&key(KeyCode::Right, KeyEventKind::Press), 0);
        let turns: usize = (0..120)
            .map(|frame| controls.commands(frame))
            .filter(|commands| commands.contains(&Command::RotateClockwise))
            .count();
        assert_eq!(turns, 1);
    }

    #[test]
    fn repeats_bridge_the_gap_without_release_reports() {
        let mut controls = Controls::new(false);
        controls.handle(&key(KeyCode::Up, KeyEventKind::Press), 10);
        controls.handle(&key(KeyCode::Up, KeyEventKind::Repeat), 11);
        for frame in 10..11 + KEY_REPEAT_FRAMES {
            assert_eq!(controls.commands(frame), vec![Command::Thrust], "frame {}", frame);
        }
        assert!(controls.commands(11 + KEY_REPEAT_FRAMES).is_empty());
    }

    #[test]
    fn shooting_fires_once_per_press() {
        let mut controls = Controls::new(true);
        controls.handle(&key(KeyCode::Char(' '), KeyEventKind::Press), 0);
        controls.handle(&key(KeyCode::Char(' '), KeyEventKind::Repeat), 0);
        assert_eq!(controls.commands(0), vec![Command::Shoot]);
        assert!(controls.commands(1).is_empty());
    }

    #[test]
    fn s_key_reverses_and_brakes() {
        let mut controls = Controls::new(true);
        controls.handle(&key(KeyCode::Char('S'), KeyEventKind::Press), 0);
        assert_eq!(controls.commands(0), vec![Command::Reverse, Command::Brake]);
    }

    #[test]
    fn commands_follow_a_fixed_order() {
        let mut controls = Controls::new(true);
        controls.handle(&key(KeyCode::Char(' '), KeyEventKind::Press), 0);
        controls.handle(&key(KeyCode::Char('b'), KeyEventKind::Press), 0);
        controls.handle(&key(KeyCode::Right, KeyEventKind::Press), 0);
        assert_eq!(
            controls.commands(0),
            vec![Command::RotateClockwise, Command::Brake, Command::Shoot]
        );
    }

    #[test]
    fn escape_and_quit_keys_exit() {
        let mut controls = Controls::new(false);
        assert_eq!(controls.handle(&key(KeyCode::Esc, KeyEventKind::Press), 0), Some(Exit::Escape));
        assert_eq!(controls.handle(&key(KeyCode::Char('q'), KeyEventKind::Press), 0), Some(Exit::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(controls.handle(&ctrl_c, 0), Some(Exit::Quit));
        assert_eq!(controls.handle(&key(KeyCode::Char('c'), KeyEventKind::Press), 0), None);
    }

    #[test]
    fn mouse_release_counts_as_click() {
        let up = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert!(is_click(&up));
        assert!(!is_click(&key(KeyCode::Enter, KeyEventKind::Press)));
    }

    #[test]
    fn simulated_input_replays_script_once() {
        let mut input = SimulatedInput::new(HashMap::new());
        input.push(3, key(KeyCode::Up, KeyEventKind::Press));
        assert!(input.poll(2).unwrap().is_empty());
        assert_eq!(input.poll(3).unwrap().len(), 1);
        assert!(input.poll(3).unwrap().is_empty());
    }
}
