pub mod config;
pub mod fruit;
pub mod game;
pub mod grid;
pub mod input;
pub mod logging;
pub mod render;
pub mod score;
pub mod snake;
