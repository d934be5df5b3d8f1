// the board is measured in units, every entity sits on a multiple of SCALE
use rand::Rng;

pub const SCALE: i32 = 20;
pub const ROWS: i32 = 20;
pub const COLUMNS: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    pub fn moved_by(&self, velocity: Velocity) -> Position {
        Position::new(self.x + velocity.dx, self.y + velocity.dy)
    }
}

/// Per-tick displacement of the snake head, in units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub fn new(dx: i32, dy: i32) -> Velocity {
        Velocity { dx, dy }
    }

    pub fn is_horizontal(&self) -> bool {
        self.dx != 0
    }

    pub fn is_vertical(&self) -> bool {
        self.dy != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    columns: i32,
    rows: i32,
    scale: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(COLUMNS, ROWS, SCALE)
    }
}

impl Grid {
    pub fn new(columns: i32, rows: i32, scale: i32) -> Grid {
        Grid {
            columns,
            rows,
            scale,
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn width(&self) -> i32 {
        self.columns * self.scale
    }

    pub fn height(&self) -> i32 {
        self.rows * self.scale
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.x >= 0
            && position.x < self.width()
            && position.y >= 0
            && position.y < self.height()
    }

    /// Column and row of the cell holding `position`, if it is on the grid.
    pub fn cell_of(&self, position: &Position) -> Option<(usize, usize)> {
        if !self.contains(position) {
            return None;
        }
        Some((
            (position.x / self.scale) as usize,
            (position.y / self.scale) as usize,
        ))
    }

    // each axis is rolled on its own, so every cell is equally likely
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.random_range(0..self.columns) * self.scale,
            rng.random_range(0..self.rows) * self.scale,
        )
    }
}
