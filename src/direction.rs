use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LabyrinthError;

/// Les quatre directions de déplacement.
///
/// L'ordre des variantes est l'ordre canonique (Right, Down, Left, Up) :
/// il sert de départage dans toutes les décisions du navigateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Ordre canonique.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Index dans l'ordre canonique (sert d'index aux tableaux d'arêtes).
    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Fait demi tour (par ex. Right -> Left)
    pub fn turn_back(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    /// Décalage (ligne, colonne) d'un pas dans cette direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }

    /// Le mot envoyé au serveur pour ce déplacement.
    pub fn command(self) -> &'static str {
        match self {
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Up => "UP",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for Direction {
    type Err = LabyrinthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RIGHT" => Ok(Direction::Right),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            "UP" => Ok(Direction::Up),
            other => Err(LabyrinthError::MalformedInput(format!(
                "unknown move command {other:?}"
            ))),
        }
    }
}
