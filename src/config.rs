//! Configuration de l'agent.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{LabyrinthError, Result};

/// Réglages du navigateur.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Distance depuis le départ au-delà de laquelle les branches non
    /// explorées deviennent des murs artificiels. `None` : moitié des tours
    /// d'alarme.
    #[serde(default)]
    pub prune_horizon: Option<u32>,

    /// S'engager vers la salle de contrôle dès qu'une route connue tient
    /// dans les tours restants, sans attendre d'y être adjacent.
    #[serde(default = "default_route_commit")]
    pub route_commit: bool,

    /// Affiche la carte connue (niveau trace) à chaque tour.
    #[serde(default)]
    pub trace_map: bool,
}

fn default_route_commit() -> bool {
    true
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            prune_horizon: None,
            route_commit: default_route_commit(),
            trace_map: false,
        }
    }
}

impl NavigatorConfig {
    /// Horizon effectif pour une alarme donnée.
    pub fn horizon(&self, alarm_rounds: u32) -> u32 {
        self.prune_horizon.unwrap_or(alarm_rounds / 2)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub navigator: NavigatorConfig,
}

impl Config {
    /// Charge un fichier JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| LabyrinthError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LabyrinthError::Config(e.to_string()))
    }
}
