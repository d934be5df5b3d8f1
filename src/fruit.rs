use rand::Rng;

use crate::grid::{Grid, Position};
use crate::render::{CellColor, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    position: Position,
}

impl Fruit {
    pub fn new<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Self {
        let mut fruit = Fruit {
            position: Position::default(),
        };
        fruit.pick_location(grid, rng);
        fruit
    }

    #[cfg(test)]
    pub(crate) fn at(position: Position) -> Self {
        Fruit { position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    // the snake body is not excluded, the fruit may land under it
    pub fn pick_location<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        self.position = grid.random_position(rng);
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_cell(self.position, CellColor::Fruit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pick_location_stays_on_the_grid() {
        let grid = Grid::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut fruit = Fruit::new(&grid, &mut rng);
        for _ in 0..200 {
            fruit.pick_location(&grid, &mut rng);
            assert!(grid.contains(&fruit.position()));
        }
    }

    #[test]
    fn pick_location_reaches_every_corner() {
        let grid = Grid::new(2, 2, 20);
        let mut rng = StdRng::seed_from_u64(11);
        let mut fruit = Fruit::new(&grid, &mut rng);
        let mut seen = Vec::new();
        for _ in 0..200 {
            fruit.pick_location(&grid, &mut rng);
            if !seen.contains(&fruit.position()) {
                seen.push(fruit.position());
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn draw_fills_one_red_cell() {
        let fruit = Fruit::at(Position::new(40, 40));
        let mut surface = RecordingSurface::default();
        fruit.draw(&mut surface);
        assert_eq!(surface.filled, vec![(Position::new(40, 40), CellColor::Fruit)]);
        assert_eq!(fruit.position(), Position::new(40, 40));
    }
}
