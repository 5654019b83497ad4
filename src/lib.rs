pub mod ascii_utils;
pub mod cell;
pub mod config;
pub mod direction;
pub mod discovery;
pub mod edge;
pub mod error;
pub mod labyrinth_mock;
pub mod map;
pub mod navigator;
pub mod network;
pub mod planner;
pub mod player;
pub mod position;
pub mod protocol;
pub mod referee;
pub mod transport;
pub mod turn_loop;

pub use config::{Config, NavigatorConfig};
pub use direction::Direction;
pub use error::{LabyrinthError, Result};
pub use navigator::{Decision, NavState, Navigator, Step, StepKind};
pub use position::Position;
pub use turn_loop::{GameStreamHandler, RunOutcome, RunSummary};

pub const ADDRESS: &str = "localhost:8778";
