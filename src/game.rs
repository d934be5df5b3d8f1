use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::Rng;

use crate::fruit::Fruit;
use crate::grid::Grid;
use crate::input::{self, InputDecoder, InputEvent, RawTerminal};
use crate::render::Surface;
use crate::score::{load_top_score, save_top_score, KeyValueStore, Scoreboard};
use crate::snake::{Direction, Snake};

// how long to sleep between polls of the input channel
const POLL_INTERVAL: Duration = Duration::from_millis(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    GameOver,
}

/// Everything one game needs, reset in place on restart.
pub struct GameSession<R: Rng, S: KeyValueStore> {
    grid: Grid,
    snake: Snake,
    fruit: Fruit,
    scoreboard: Scoreboard,
    state: GameState,
    rng: R,
    store: S,
}

impl<R: Rng, S: KeyValueStore> GameSession<R, S> {
    pub fn new(grid: Grid, mut rng: R, store: S) -> Self {
        let top = load_top_score(&store);
        let fruit = Fruit::new(&grid, &mut rng);
        let snake = Snake::new(&grid);
        log::info!("New session, top score {}", top);
        GameSession {
            grid,
            snake,
            fruit,
            scoreboard: Scoreboard::new(top),
            state: GameState::Running,
            rng,
            store,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn fruit(&self) -> &Fruit {
        &self.fruit
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn change_direction(&mut self, direction: Direction) {
        self.snake.change_direction(direction);
    }

    // shows the current state without moving anything, used before the first tick
    pub fn draw<F: Surface + ?Sized>(&self, surface: &mut F) {
        surface.clear();
        surface.draw_grid(&self.grid);
        self.fruit.draw(surface);
        self.snake.draw(surface);
        surface.show_scores(self.scoreboard.current(), self.scoreboard.top());
        surface.show_restart(self.state == GameState::GameOver);
    }

    pub fn tick<F: Surface + ?Sized>(&mut self, surface: &mut F) -> std::io::Result<GameState> {
        if self.state == GameState::GameOver {
            return Ok(self.state);
        }

        surface.clear();
        surface.draw_grid(&self.grid);
        self.fruit.draw(surface);
        self.snake.advance();
        self.snake.draw(surface);

        if self.snake.eat(&self.fruit) {
            self.fruit.pick_location(&self.grid, &mut self.rng);
            self.scoreboard.record_point();
            log::debug!(
                "Fruit eaten, score {}, next fruit at {:?}",
                self.scoreboard.current(),
                self.fruit.position()
            );
        }

        if self.snake.check_collision(&self.grid) {
            self.end_game(surface);
        }

        surface.show_scores(self.scoreboard.current(), self.scoreboard.top());
        surface.present()?;
        Ok(self.state)
    }

    pub fn end_game<F: Surface + ?Sized>(&mut self, surface: &mut F) {
        self.state = GameState::GameOver;
        surface.show_restart(true);
        log::info!(
            "Game over at {:?}, score {}",
            self.snake.head(),
            self.scoreboard.current()
        );

        if self.scoreboard.finish() {
            log::info!("New top score {}", self.scoreboard.top());
            save_top_score(&mut self.store, self.scoreboard.top());
        }
        surface.show_scores(self.scoreboard.current(), self.scoreboard.top());
    }

    /// Starts a new game. Returns false when the current game is still running.
    pub fn restart<F: Surface + ?Sized>(&mut self, surface: &mut F) -> bool {
        if self.state != GameState::GameOver {
            return false;
        }
        self.snake = Snake::new(&self.grid);
        self.fruit.pick_location(&self.grid, &mut self.rng);
        self.scoreboard.reset();
        self.state = GameState::Running;
        surface.show_scores(self.scoreboard.current(), self.scoreboard.top());
        surface.show_restart(false);
        log::info!("Restarted");
        true
    }

    #[cfg(test)]
    pub(crate) fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    #[cfg(test)]
    pub(crate) fn set_fruit(&mut self, fruit: Fruit) {
        self.fruit = fruit;
    }

    #[cfg(test)]
    pub(crate) fn scoreboard_mut(&mut self) -> &mut Scoreboard {
        &mut self.scoreboard
    }
}

/// Fixed period tick source. Stopped on game over, started fresh on restart.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval,
            last: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    /// True once per elapsed interval, never while stopped.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) >= self.interval => {
                self.last = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub struct GameLoop<R: Rng, S: KeyValueStore, F: Surface> {
    session: GameSession<R, S>,
    surface: F,
    ticker: Ticker,
    decoder: InputDecoder,
}

impl<R: Rng, S: KeyValueStore, F: Surface> GameLoop<R, S, F> {
    pub fn new(session: GameSession<R, S>, surface: F, tick_interval: Duration) -> Self {
        GameLoop {
            session,
            surface,
            ticker: Ticker::new(tick_interval),
            decoder: InputDecoder::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        // setup stdin to not require enter press and not showing the input
        let _raw = RawTerminal::enable()?;
        let stdin_channel = input::spawn_stdin_channel();

        self.session.draw(&mut self.surface);
        self.surface.present()?;
        self.ticker.start(Instant::now());

        // main game loop happens here
        loop {
            if !self.drain_input(&stdin_channel)? {
                break;
            }

            if !self.step(Instant::now())? {
                // wait for next frame
                std::thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(())
    }

    // ticks the session if the ticker is due, returns whether it did
    fn step(&mut self, now: Instant) -> Result<bool> {
        if !self.ticker.due(now) {
            return Ok(false);
        }
        if self.session.tick(&mut self.surface)? == GameState::GameOver {
            self.ticker.stop();
        }
        Ok(true)
    }

    // returns false when the player asked to quit
    fn drain_input(&mut self, channel: &Receiver<u8>) -> Result<bool> {
        loop {
            match channel.try_recv() {
                Ok(byte) => self.decoder.push(byte),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Input channel disconnected");
                    return Ok(false);
                }
            }
        }

        self.handle_events(Instant::now())
    }

    // applies every decoded event, returns false on quit
    fn handle_events(&mut self, now: Instant) -> Result<bool> {
        while let Some(event) = self.decoder.next_event() {
            match event {
                InputEvent::Turn(direction) => self.session.change_direction(direction),
                InputEvent::Restart => {
                    if self.session.restart(&mut self.surface) {
                        self.session.draw(&mut self.surface);
                        self.surface.present()?;
                        self.ticker.start(now);
                    }
                }
                InputEvent::Quit => return Ok(false),
            }
        }
        Ok(true)
    }
}
