// drawing happens into a frame buffer, present() writes the whole frame at once
use colored::Colorize;
use std::io::{self, Write};

use crate::grid::{Grid, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    Snake,
    Fruit,
}

pub trait Surface {
    fn clear(&mut self);
    fn draw_grid(&mut self, grid: &Grid);
    fn fill_cell(&mut self, position: Position, color: CellColor);
    fn show_scores(&mut self, current: u32, top: u32);
    fn show_restart(&mut self, visible: bool);
    fn present(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Blank,
    GridLine,
    Filled(CellColor),
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "{}[2J", 27 as char)?;
    write!(out, "{}[1;1H", 27 as char)
}

pub struct TerminalCanvas<W: Write> {
    grid: Grid,
    cells: Vec<Cell>,
    current_score: u32,
    top_score: u32,
    restart_visible: bool,
    out: W,
}

impl TerminalCanvas<io::Stdout> {
    pub fn stdout(grid: Grid) -> Self {
        Self::new(grid, io::stdout())
    }
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(grid: Grid, out: W) -> Self {
        let size = (grid.columns() * grid.rows()) as usize;
        TerminalCanvas {
            grid,
            cells: vec![Cell::Blank; size],
            current_score: 0,
            top_score: 0,
            restart_visible: false,
            out,
        }
    }

    fn index(&self, column: usize, row: usize) -> usize {
        row * self.grid.columns() as usize + column
    }

    fn render_frame(&self) -> String {
        let columns = self.grid.columns() as usize;
        let mut frame = String::new();
        // border up
        frame.push('▗');
        frame.push_str(&"▄▄".repeat(columns));
        frame.push_str("▖\n");
        for row in 0..self.grid.rows() as usize {
            frame.push('▐');
            for column in 0..columns {
                let cell = match self.cells[self.index(column, row)] {
                    Cell::Blank => "  ".normal(),
                    Cell::GridLine => "· ".bright_black(),
                    Cell::Filled(CellColor::Snake) => "██".green(),
                    Cell::Filled(CellColor::Fruit) => "██".red(),
                };
                frame.push_str(&cell.to_string());
            }
            frame.push_str("▌\n");
        }
        // border down
        frame.push('▝');
        frame.push_str(&"▀▀".repeat(columns));
        frame.push_str("▘\n");
        frame.push_str(&format!(
            "Score: {}  Top: {}\n",
            self.current_score, self.top_score
        ));
        if self.restart_visible {
            frame.push_str(&format!(
                "{}\n",
                "Game Over! Press r to restart, q to quit".yellow()
            ));
        }
        frame
    }

    #[cfg(test)]
    fn cell_at(&self, column: usize, row: usize) -> Cell {
        self.cells[self.index(column, row)]
    }
}

impl<W: Write> Surface for TerminalCanvas<W> {
    fn clear(&mut self) {
        self.cells.fill(Cell::Blank);
    }

    fn draw_grid(&mut self, grid: &Grid) {
        self.grid = *grid;
        let size = (grid.columns() * grid.rows()) as usize;
        self.cells.resize(size, Cell::Blank);
        for cell in self.cells.iter_mut() {
            if *cell == Cell::Blank {
                *cell = Cell::GridLine;
            }
        }
    }

    fn fill_cell(&mut self, position: Position, color: CellColor) {
        // the head may already be past the wall on the last frame
        if let Some((column, row)) = self.grid.cell_of(&position) {
            let index = self.index(column, row);
            self.cells[index] = Cell::Filled(color);
        }
    }

    fn show_scores(&mut self, current: u32, top: u32) {
        self.current_score = current;
        self.top_score = top;
    }

    fn show_restart(&mut self, visible: bool) {
        self.restart_visible = visible;
    }

    fn present(&mut self) -> io::Result<()> {
        let frame = self.render_frame();
        clear_screen(&mut self.out)?;
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}
