//! Planificateur de retour.
//!
//! Une fois la salle de contrôle jugée atteignable, le trajet ne dépend plus
//! des marques : on descend un champ de distances calculé par parcours en
//! largeur sur les cases ouvertes connues.

use log::debug;
use std::collections::{HashMap, VecDeque};

use crate::direction::Direction;
use crate::edge::ControlRoomDistance;
use crate::map::MazeMap;
use crate::position::Position;

/// L'aller-retour depuis le départ tient-il dans `remaining_rounds` ?
///
/// Sert à juger une salle depuis le départ (l'horizon d'élagage en découle).
pub fn is_round_trip_feasible(distance_from_start: u32, remaining_rounds: u32) -> bool {
    distance_from_start.saturating_mul(2) <= remaining_rounds
}

/// Une fois dans la salle, seul le retour compte.
pub fn is_return_feasible(distance_from_start: u32, remaining_rounds: u32) -> bool {
    distance_from_start <= remaining_rounds
}

/// Peut-on s'engager vers une salle à `steps` pas, elle-même à
/// `control_room_distance` du départ ?
///
/// Il reste exactement l'aller jusqu'à la salle puis le retour à payer.
pub fn can_commit(steps: u32, control_room_distance: u32, remaining_rounds: u32) -> bool {
    steps
        .checked_add(control_room_distance)
        .is_some_and(|trip| trip <= remaining_rounds)
}

/// Distances (en pas) depuis une case source vers toutes les cases connues
/// qui lui sont reliées.
#[derive(Debug, Clone)]
pub struct DistanceField {
    source: Position,
    distances: HashMap<Position, u32>,
}

impl DistanceField {
    /// Parcours en largeur depuis `source` sur la carte connue.
    pub fn from_source(map: &MazeMap, source: Position) -> Self {
        let mut distances = HashMap::new();
        let mut queue = VecDeque::new();
        if map.cell_exists(source) {
            distances.insert(source, 0);
            queue.push_back(source);
        }
        while let Some(current) = queue.pop_front() {
            let next_distance = distances[&current] + 1;
            for (_, next) in map.open_neighbors(current) {
                if !distances.contains_key(&next) {
                    distances.insert(next, next_distance);
                    queue.push_back(next);
                }
            }
        }
        Self { source, distances }
    }

    pub fn source(&self) -> Position {
        self.source
    }

    pub fn distance(&self, position: Position) -> Option<u32> {
        self.distances.get(&position).copied()
    }

    /// Voisin qui fait descendre strictement la distance ; départage canonique.
    pub fn descend(&self, map: &MazeMap, position: Position) -> Option<Direction> {
        let here = self.distance(position)?;
        map.open_neighbors(position)
            .filter_map(|(direction, next)| self.distance(next).map(|d| (d, direction)))
            .filter(|&(d, _)| d < here)
            .min()
            .map(|(_, direction)| direction)
    }
}

/// Route engagée : le champ à descendre et la destination.
#[derive(Debug, Clone)]
pub struct Route {
    pub field: DistanceField,
}

impl Route {
    pub fn toward(map: &MazeMap, destination: Position) -> Self {
        Self {
            field: DistanceField::from_source(map, destination),
        }
    }

    pub fn destination(&self) -> Position {
        self.field.source()
    }

    pub fn remaining(&self, position: Position) -> Option<u32> {
        self.field.distance(position)
    }
}

/// Trajet restant si l'agent s'engageait maintenant vers la salle de contrôle.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    pub route: Route,
    /// Pas jusqu'à la salle.
    pub steps: u32,
    /// Distance de la salle au départ.
    pub home: u32,
}

impl CommitPlan {
    pub fn fits(&self, remaining_rounds: u32) -> bool {
        can_commit(self.steps, self.home, remaining_rounds)
    }
}

/// Évalue un engagement vers la salle de contrôle depuis `position`.
///
/// `None` tant que la salle, ou un chemin connu vers elle et vers le départ,
/// manque.
pub fn plan_commit(map: &MazeMap, position: Position) -> Option<CommitPlan> {
    let control_room = map.control_room()?;
    let start = map.start()?;
    let route = Route::toward(map, control_room);
    let steps = route.remaining(position)?;
    let home = DistanceField::from_source(map, start).distance(control_room)?;
    debug!(
        "Control room from {}: {} steps there, {} back home",
        position, steps, home
    );
    Some(CommitPlan { route, steps, home })
}

/// Reporte les distances vers la salle de contrôle dans le registre des
/// nœuds déjà visités : chaque entrée reçoit la distance de la case à
/// laquelle elle mène, plus un.
pub fn propagate_control_room_distance(map: &mut MazeMap, field: &DistanceField) {
    let updates = ledger_updates(map, field);
    for (position, direction, distance) in updates {
        if let Some(edge) = map.cell_at_mut(position).and_then(|c| c.edge_mut(direction)) {
            edge.distance_to_control_room = ControlRoomDistance::Known(distance);
        }
    }
}

/// Même chose pour le retour : `distance_from_start` devient la distance
/// exacte connue de la case voisine.
pub fn propagate_distance_from_start(map: &mut MazeMap, field: &DistanceField) {
    let updates = ledger_updates(map, field);
    for (position, direction, distance) in updates {
        if let Some(edge) = map.cell_at_mut(position).and_then(|c| c.edge_mut(direction)) {
            edge.record_distance_from_start(distance - 1);
        }
    }
}

fn ledger_updates(map: &MazeMap, field: &DistanceField) -> Vec<(Position, Direction, u32)> {
    map.edges()
        .filter(|(position, _, _)| map.cell_at(*position).is_some_and(|c| c.is_visited()))
        .filter_map(|(position, direction, _)| {
            let next = map.neighbor(position, direction)?;
            field.distance(next).map(|d| (position, direction, d + 1))
        })
        .collect()
}
