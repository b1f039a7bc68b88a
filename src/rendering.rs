use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::info;

use crate::constants::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::types::Vector2D;

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        self.buffer = vec![vec![' '; self.width as usize]; self.height as usize];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn contains(&self, text: &str) -> bool {
        (0..self.height).any(|y| self.row(y).contains(text))
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Styling has no meaning in the buffer
        }
    }

    /// Writes `text` at a cell in the given colour.
    pub fn write_at(&mut self, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
        self.execute_move_to(MoveTo(x, y))?;
        self.execute_other_command(SetForegroundColor(color))?;
        write!(self, "{}", text)?;
        self.execute_other_command(ResetColor)
    }

    pub fn log_frame(&self) {
        if let OutputTarget::ScreenBuffer(sb) = self {
            sb.print_to_log();
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

// --- GameGrid: the world squeezed into terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = GameGrid::new(width, height);
    }

    fn cell_size(&self) -> (f64, f64) {
        (WORLD_WIDTH / self.width.max(1) as f64, WORLD_HEIGHT / self.height.max(1) as f64)
    }

    /// Cell covering a world position, if it is on screen.
    pub fn to_cell(&self, position: Vector2D) -> Option<(u16, u16)> {
        let (cell_w, cell_h) = self.cell_size();
        let x = (position.x / cell_w).floor();
        let y = (position.y / cell_h).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some((x as u16, y as u16))
    }

    pub fn row_of(&self, world_y: f64) -> u16 {
        let (_, cell_h) = self.cell_size();
        ((world_y / cell_h).floor().max(0.0) as u16).min(self.height.saturating_sub(1))
    }

    pub fn column_of(&self, world_x: f64) -> u16 {
        let (cell_w, _) = self.cell_size();
        ((world_x / cell_w).floor().max(0.0) as u16).min(self.width.saturating_sub(1))
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn plot(&mut self, position: Vector2D, c: char) {
        if let Some((x, y)) = self.to_cell(position) {
            self.set_char(x, y, c);
        }
    }

    /// Every cell whose centre lies inside the circle, plus the centre cell itself.
    pub fn fill_circle(&mut self, center: Vector2D, radius: f64, c: char) {
        let (cell_w, cell_h) = self.cell_size();
        self.plot(center, c);
        let left = self.column_of(center.x - radius);
        let top = self.row_of(center.y - radius);
        let right = self.column_of(center.x + radius);
        let bottom = self.row_of(center.y + radius);
        for y in top..=bottom {
            for x in left..=right {
                let cell_center = Vector2D::new((x as f64 + 0.5) * cell_w, (y as f64 + 0.5) * cell_h);
                if cell_center.distance_to(center) < radius {
                    self.set_char(x, y, c);
                }
            }
        }
    }

    /// Writes text into the grid starting at a cell, clipped at the right edge.
    pub fn put_text(&mut self, x: u16, y: u16, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_char(x.saturating_add(i as u16), y, c);
        }
    }

    /// Column that centres `text` on the given world x coordinate.
    pub fn centered_column(&self, world_x: f64, text: &str) -> u16 {
        self.column_of(world_x).saturating_sub(text.chars().count() as u16 / 2)
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width as usize]; self.height as usize];
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(grid: &GameGrid, y: u16) -> String {
        grid.grid[y as usize].iter().collect()
    }

    #[test]
    fn world_maps_onto_cells() {
        let grid = GameGrid::new(80, 24);
        assert_eq!(grid.to_cell(Vector2D::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(grid.to_cell(Vector2D::new(400.0, 300.0)), Some((40, 12)));
        assert_eq!(grid.to_cell(Vector2D::new(799.9, 599.9)), Some((79, 23)));
        assert_eq!(grid.to_cell(Vector2D::new(800.0, 10.0)), None);
        assert_eq!(grid.to_cell(Vector2D::new(-0.5, 10.0)), None);
    }

    #[test]
    fn circles_cover_their_centre() {
        let mut grid = GameGrid::new(80, 24);
        grid.fill_circle(Vector2D::new(5.0, 5.0), 1.0, 'o');
        assert_eq!(grid.grid[0][0], 'o');

        grid.clear();
        grid.fill_circle(Vector2D::new(400.0, 300.0), 55.0, '@');
        let filled: usize = grid.grid.iter().flatten().filter(|&&c| c == '@').count();
        assert!(filled > 10, "large rock covers {} cells", filled);
        assert_eq!(grid.grid[12][40], '@');
    }

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut grid = GameGrid::new(10, 2);
        grid.put_text(7, 1, "Score");
        assert_eq!(row(&grid, 1), "       Sco");
    }

    #[test]
    fn grid_renders_into_screen_buffer() {
        let mut grid = GameGrid::new(10, 3);
        grid.put_text(2, 1, "hi");
        let mut out = OutputTarget::ScreenBuffer(ScreenBuffer::new(10, 3));
        grid.render(&mut out).unwrap();
        out.write_at(0, 2, "ok", Color::Green).unwrap();
        let OutputTarget::ScreenBuffer(sb) = out else {
            unreachable!()
        };
        assert_eq!(sb.row(1), "  hi      ");
        assert!(sb.contains("ok"));
    }
}
