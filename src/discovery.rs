//! Découverte locale : inspection des quatre voisins d'une case, une seule
//! fois, à la première visite.

use log::debug;

use crate::cell::CellKind;
use crate::direction::Direction;
use crate::map::MazeMap;
use crate::position::Position;

/// Résultat de l'inspection d'une case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Directions ouvertes hors salle de contrôle, ordre canonique.
    pub directions: Vec<Direction>,
    /// Direction de la salle de contrôle si elle est adjacente.
    pub control_room: Option<Direction>,
    pub kind: CellKind,
}

/// Inspecte la case si elle ne l'a jamais été et enregistre le résultat.
///
/// Renvoie `None` pour une case déjà découverte ou inconnue de la carte.
pub fn discover(map: &mut MazeMap, position: Position) -> Option<Discovery> {
    if map.cell_at(position)?.is_discovered() {
        return None;
    }

    let mut directions = Vec::with_capacity(4);
    let mut control_room = None;
    for (direction, next) in map.open_neighbors(position) {
        let is_control_room = map
            .cell_at(next)
            .is_some_and(|cell| cell.kind == CellKind::ControlRoom);
        if is_control_room {
            // Jamais d'arête vers la salle de contrôle : elle est signalée à part.
            debug!("Control room adjacent to {} going {}", position, direction);
            control_room = Some(direction);
            continue;
        }
        directions.push(direction);
    }

    let cell = map.cell_at_mut(position)?;
    cell.settle(directions.clone(), control_room);
    Some(Discovery {
        directions,
        control_room,
        kind: cell.kind,
    })
}
