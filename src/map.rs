use log::{debug, warn};
use std::collections::HashMap;

use crate::cell::{Cell, CellKind};
use crate::direction::Direction;
use crate::edge::Edge;
use crate::error::{LabyrinthError, Result};
use crate::position::Position;

/// Carte du labyrinthe, stockée dans une HashMap dynamique.
/// Les clés sont les coordonnées de chaque case ouverte connue ; une case
/// absente est un mur ou n'a pas encore été vue.
#[derive(Debug)]
pub struct MazeMap {
    rows: usize,
    cols: usize,
    grid: HashMap<Position, Cell>,
    start: Option<Position>,
    control_room: Option<Position>,
}

impl MazeMap {
    /// Crée une carte vide aux dimensions annoncées.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            grid: HashMap::new(),
            start: None,
            control_room: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn control_room(&self) -> Option<Position> {
        self.control_room
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.row >= 0
            && position.col >= 0
            && (position.row as usize) < self.rows
            && (position.col as usize) < self.cols
    }

    /// Récupère une case en lecture seule.
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.grid.get(&position)
    }

    pub fn cell_at_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.grid.get_mut(&position)
    }

    /// Vérifie si une case ouverte est connue à cette position.
    pub fn cell_exists(&self, position: Position) -> bool {
        self.grid.contains_key(&position)
    }

    /// Insère la case si le caractère désigne une case ouverte.
    /// Une case déjà connue n'est jamais écrasée. Renvoie vrai si la case est nouvelle.
    pub fn create_if_absent(&mut self, position: Position, observed: char) -> bool {
        let Some(kind) = CellKind::from_char(observed) else {
            return false;
        };
        if self.grid.contains_key(&position) || !self.in_bounds(position) {
            return false;
        }
        match kind {
            CellKind::Start if self.start.is_none() => self.start = Some(position),
            CellKind::ControlRoom => {
                if self.control_room.is_none() {
                    debug!("Control room spotted at {}", position);
                }
                self.control_room = Some(position);
            }
            _ => {}
        }
        self.grid.insert(position, Cell::new(kind));
        true
    }

    /// Fixe la case de départ (la position du premier tour fait foi).
    pub fn set_start(&mut self, position: Position) {
        if let Some(known) = self.start {
            if known != position {
                warn!("Start marker at {} but agent starts at {}", known, position);
            }
        }
        self.start = Some(position);
        let cell = self
            .grid
            .entry(position)
            .or_insert_with(|| Cell::new(CellKind::Start));
        if cell.kind == CellKind::Unknown {
            cell.kind = CellKind::Start;
        }
    }

    /// Case voisine ouverte dans la direction donnée (absente aux bords).
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        let next = position.step(direction);
        if self.in_bounds(next) && self.grid.contains_key(&next) {
            Some(next)
        } else {
            None
        }
    }

    /// Voisins ouverts connus, dans l'ordre canonique.
    pub fn open_neighbors(&self, position: Position) -> impl Iterator<Item = (Direction, Position)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(position, direction).map(|next| (direction, next)))
    }

    /// Met à jour la carte avec les lignes reçues pendant un tour.
    ///
    /// Les cases déjà connues sont ignorées. Renvoie le nombre de nouvelles cases.
    pub fn ingest_rows<S: AsRef<str>>(&mut self, rows: &[S]) -> Result<usize> {
        if rows.len() != self.rows {
            return Err(LabyrinthError::MalformedInput(format!(
                "expected {} rows, got {}",
                self.rows,
                rows.len()
            )));
        }
        let mut added = 0;
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != self.cols {
                return Err(LabyrinthError::MalformedInput(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.chars().count(),
                    self.cols
                )));
            }
            for (j, c) in row.chars().enumerate() {
                if self.create_if_absent(Position::new(i as i32, j as i32), c) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Toutes les arêtes du registre, avec leur nœud et leur direction.
    pub fn edges(&self) -> impl Iterator<Item = (Position, Direction, &Edge)> + '_ {
        self.grid.iter().flat_map(|(&position, cell)| {
            Direction::ALL
                .into_iter()
                .filter_map(move |direction| cell.edge(direction).map(|edge| (position, direction, edge)))
        })
    }
}
