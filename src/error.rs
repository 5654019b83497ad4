//! Erreurs de l'agent.
//!
//! Une destination jugée trop lointaine pour l'alarme n'est pas une erreur :
//! le navigateur continue d'explorer.

use thiserror::Error;

use crate::position::Position;

#[derive(Error, Debug)]
pub enum LabyrinthError {
    /// Entrée incohérente (dimensions, entiers illisibles, position inattendue).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Aucun déplacement légal : graphe déconnecté ou mal modélisé.
    #[error("no legal direction from {position}")]
    NoLegalDirection { position: Position },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LabyrinthError {
    /// Code court pour les logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::NoLegalDirection { .. } => "NO_LEGAL_DIRECTION",
            Self::Io(_) => "IO",
            Self::Protocol(_) => "PROTOCOL",
            Self::Config(_) => "CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, LabyrinthError>;
