//! Messages échangés entre l'agent et le serveur de jeu.
//!
//! En mode binaire chaque message est un objet JSON encadré par sa longueur
//! (voir [`crate::network`]) :
//!
//! ```text
//! {"Setup":{"rows":4,"cols":3,"alarm_rounds":20}}
//! {"Turn":{"position":{"row":0,"col":0},"rows":["T..","#.#","?.?","???"]}}
//! {"Move":"RIGHT"}
//! {"GameOver":{"verdict":"Won"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{LabyrinthError, Result};
use crate::position::Position;

/// Paramètres de la partie, envoyés une seule fois.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub rows: usize,
    pub cols: usize,
    pub alarm_rounds: u32,
}

/// Ce que l'agent voit au début d'un tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub position: Position,
    /// Une chaîne par ligne de la grille ; `?` pour les cases hors de portée.
    pub rows: Vec<String>,
}

/// Issue de la partie côté arbitre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Setup(Setup),
    Turn(Observation),
    Move(Direction),
    GameOver { verdict: Verdict },
}

impl Message {
    /// Nom du message, pour les logs et les erreurs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Setup(_) => "Setup",
            Message::Turn(_) => "Turn",
            Message::Move(_) => "Move",
            Message::GameOver { .. } => "GameOver",
        }
    }
}

pub fn encode(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode(text: &str) -> Result<Message> {
    Ok(serde_json::from_str(text)?)
}

/// Erreur de protocole quand un message arrive hors séquence.
pub fn unexpected(expected: &str, got: &Message) -> LabyrinthError {
    LabyrinthError::MalformedInput(format!("expected {}, got {}", expected, got.name()))
}
