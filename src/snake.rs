// the snake moves one cell per tick, the tail follows the head's old positions
// and can only turn towards its left or its right, other inputs are ignored
use std::str::FromStr;

use thiserror::Error;

use crate::fruit::Fruit;
use crate::grid::{Grid, Position, Velocity};
use crate::render::{CellColor, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown direction: {0}")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    // key names come as "ArrowUp", "ArrowLeft"...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("Arrow").unwrap_or(s) {
            "Up" => Ok(Direction::Up),
            "Down" => Ok(Direction::Down),
            "Left" => Ok(Direction::Left),
            "Right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

impl Direction {
    pub fn velocity(&self, scale: i32) -> Velocity {
        match self {
            Direction::Up => Velocity::new(0, -scale),
            Direction::Down => Velocity::new(0, scale),
            Direction::Left => Velocity::new(-scale, 0),
            Direction::Right => Velocity::new(scale, 0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    head: Position,
    velocity: Velocity,
    scale: i32,
    // oldest segment first, newest (right behind the head) last
    tail: Vec<Position>,
    total: usize,
}

impl Default for Snake {
    fn default() -> Self {
        Snake::new(&Grid::default())
    }
}

impl Snake {
    pub fn new(grid: &Grid) -> Self {
        Snake {
            head: Position::new(0, 0),
            velocity: Direction::Right.velocity(grid.scale()),
            scale: grid.scale(),
            tail: Vec::new(),
            total: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn at(head: Position, direction: Direction) -> Self {
        let snake = Snake::default();
        Snake {
            head,
            velocity: direction.velocity(snake.scale),
            ..snake
        }
    }

    pub fn head(&self) -> Position {
        self.head
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn tail(&self) -> &[Position] {
        &self.tail
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn advance(&mut self) {
        // every segment slides one slot towards the head, the oldest falls off.
        // on the tick after eating the last slot is new, so the second newest
        // segment is briefly doubled
        let len = self.tail.len();
        for i in 0..len.saturating_sub(1) {
            self.tail[i] = self.tail[i + 1];
        }
        if self.total > 0 {
            let newest = self.total - 1;
            if newest < len {
                self.tail[newest] = self.head;
            } else {
                self.tail.push(self.head);
            }
        }
        self.head = self.head.moved_by(self.velocity);
    }

    pub fn change_direction(&mut self, direction: Direction) {
        // turning back on the current axis would run into the tail
        let accepted = if direction.is_horizontal() {
            !self.velocity.is_horizontal()
        } else {
            !self.velocity.is_vertical()
        };
        if accepted {
            self.velocity = direction.velocity(self.scale);
        }
    }

    pub fn eat(&mut self, fruit: &Fruit) -> bool {
        if self.head == fruit.position() {
            self.total += 1;
            return true;
        }
        false
    }

    pub fn check_collision(&self, grid: &Grid) -> bool {
        // snake hit the wall
        if !grid.contains(&self.head) {
            return true;
        }
        // snake bites itself
        self.tail.iter().any(|segment| *segment == self.head)
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for segment in self.tail.iter() {
            surface.fill_cell(*segment, CellColor::Snake);
        }
        surface.fill_cell(self.head, CellColor::Snake);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SCALE;
    use crate::render::testing::RecordingSurface;

    fn assert_single_axis(snake: &Snake) {
        let v = snake.velocity();
        assert!((v.dx == 0) != (v.dy == 0), "velocity {:?}", v);
        assert_eq!(v.dx.abs() + v.dy.abs(), SCALE);
    }

    #[test]
    fn parses_symbolic_and_key_names() {
        assert_eq!("Up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("ArrowLeft".parse::<Direction>(), Ok(Direction::Left));
        assert!("Enter".parse::<Direction>().is_err());
        assert!("ArrowSideways".parse::<Direction>().is_err());
    }

    #[test]
    fn three_ticks_right_from_origin() {
        let grid = Grid::default();
        let mut snake = Snake::default();
        for _ in 0..3 {
            snake.advance();
        }
        assert_eq!(snake.head(), Position::new(60, 0));
        assert!(!snake.check_collision(&grid));
    }

    #[test]
    fn leaving_the_right_wall_collides() {
        let grid = Grid::default();
        let mut snake = Snake::at(Position::new(380, 0), Direction::Right);
        assert!(!snake.check_collision(&grid));
        snake.advance();
        assert_eq!(snake.head(), Position::new(400, 0));
        assert!(snake.check_collision(&grid));
    }

    #[test]
    fn leaving_the_top_and_left_walls_collides() {
        let grid = Grid::default();
        let mut snake = Snake::default();
        snake.change_direction(Direction::Up);
        snake.advance();
        assert_eq!(snake.head(), Position::new(0, -20));
        assert!(snake.check_collision(&grid));

        let mut snake = Snake::at(Position::new(0, 100), Direction::Down);
        snake.change_direction(Direction::Left);
        snake.advance();
        assert!(snake.check_collision(&grid));
    }

    #[test]
    fn reversal_is_rejected() {
        let mut snake = Snake::default();
        snake.change_direction(Direction::Left);
        assert_eq!(snake.velocity(), Velocity::new(SCALE, 0));
        snake.change_direction(Direction::Right);
        assert_eq!(snake.velocity(), Velocity::new(SCALE, 0));

        snake.change_direction(Direction::Down);
        assert_eq!(snake.velocity(), Velocity::new(0, SCALE));
        snake.change_direction(Direction::Up);
        assert_eq!(snake.velocity(), Velocity::new(0, SCALE));
    }

    #[test]
    fn velocity_keeps_a_single_axis_through_any_input() {
        let directions = [
            Direction::Up,
            Direction::Left,
            Direction::Down,
            Direction::Down,
            Direction::Right,
            Direction::Left,
            Direction::Up,
            Direction::Right,
        ];
        let mut snake = Snake::default();
        assert_single_axis(&snake);
        for direction in directions.iter().cycle().take(64) {
            let before = snake.velocity();
            snake.change_direction(*direction);
            let after = snake.velocity();
            // never a sign flip on the same axis
            assert!(!(before.dx != 0 && after.dx == -before.dx));
            assert!(!(before.dy != 0 && after.dy == -before.dy));
            snake.advance();
            assert_single_axis(&snake);
        }
    }

    #[test]
    fn eat_only_on_exact_match() {
        let mut snake = Snake::default();
        let fruit = Fruit::at(Position::new(20, 0));
        assert!(!snake.eat(&fruit));
        assert_eq!(snake.total(), 0);
        snake.advance();
        assert!(snake.eat(&fruit));
        assert_eq!(snake.total(), 1);
    }

    #[test]
    fn tail_grows_one_segment_per_fruit() {
        let mut snake = Snake::default();
        for eaten in 1..=4 {
            snake.advance();
            let fruit = Fruit::at(snake.head());
            assert!(snake.eat(&fruit));
            assert_eq!(snake.total(), eaten);
        }
        // the new slot shows up on the following tick
        assert_eq!(snake.tail().len(), 3);
        snake.advance();
        assert_eq!(snake.tail().len(), 4);
        assert_eq!(
            snake.tail(),
            &[
                Position::new(40, 0),
                Position::new(60, 0),
                Position::new(60, 0),
                Position::new(80, 0),
            ]
        );
        snake.advance();
        assert_eq!(
            snake.tail(),
            &[
                Position::new(60, 0),
                Position::new(60, 0),
                Position::new(80, 0),
                Position::new(100, 0),
            ]
        );
    }

    #[test]
    fn growth_tick_frees_the_oldest_segment() {
        // eat on four ticks in a row around a 2x2 square
        let grid = Grid::default();
        let mut snake = Snake::at(Position::new(100, 100), Direction::Right);
        for turn in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
            snake.advance();
            assert!(snake.eat(&Fruit::at(snake.head())));
            snake.change_direction(turn);
        }
        assert_eq!(snake.head(), Position::new(100, 100));

        // the head moves back onto the cell of the first bite, which has
        // already slid off the end of the tail
        snake.advance();
        assert_eq!(snake.head(), Position::new(120, 100));
        assert_eq!(
            snake.tail(),
            &[
                Position::new(120, 120),
                Position::new(100, 120),
                Position::new(100, 120),
                Position::new(100, 100),
            ]
        );
        assert!(!snake.check_collision(&grid));
    }

    #[test]
    fn moves_by_the_grid_scale() {
        let grid = Grid::new(40, 40, 10);
        let mut snake = Snake::new(&grid);
        snake.advance();
        assert_eq!(snake.head(), Position::new(10, 0));
        snake.change_direction(Direction::Down);
        snake.advance();
        assert_eq!(snake.head(), Position::new(10, 10));
        assert_eq!(snake.velocity(), Velocity::new(0, 10));
    }

    #[test]
    fn biting_the_tail_collides() {
        let grid = Grid::default();
        let mut snake = Snake::at(Position::new(100, 100), Direction::Right);
        for _ in 0..4 {
            snake.advance();
            let fruit = Fruit::at(snake.head());
            snake.eat(&fruit);
        }
        snake.advance();
        snake.change_direction(Direction::Down);
        snake.advance();
        snake.change_direction(Direction::Left);
        snake.advance();
        assert!(!snake.check_collision(&grid));
        snake.change_direction(Direction::Up);
        snake.advance();
        assert!(snake.check_collision(&grid));
    }

    #[test]
    fn draw_fills_tail_then_head() {
        let mut snake = Snake::default();
        snake.advance();
        snake.eat(&Fruit::at(snake.head()));
        snake.advance();
        let mut surface = RecordingSurface::default();
        snake.draw(&mut surface);
        assert_eq!(
            surface.filled,
            vec![
                (Position::new(20, 0), CellColor::Snake),
                (Position::new(40, 0), CellColor::Snake),
            ]
        );
    }
}
