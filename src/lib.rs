//! Term Rex - a Chrome-dino style endless runner for the terminal
//!
//! Core modules:
//! - `session`: Simulation aggregate stepped once per tick
//! - `player`, `obstacle`, `stage`, `collision`: The simulation pieces
//! - `game`: Orchestrator wiring input, audio, persistence and rendering
//! - `render`, `input`, `audio`, `highscore`, `settings`: Terminal and OS collaborators

pub mod audio;
pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod highscore;
pub mod input;
pub mod obstacle;
pub mod player;
pub mod render;
pub mod scenery;
pub mod session;
pub mod settings;
pub mod sprite;
pub mod stage;

pub use error::{AppError, ConfigError};
pub use game::Game;
pub use session::{GameEvent, Session};
