use crate::direction::Direction;
use crate::edge::{Edge, Mark};

/// Nature d'une case.
///
/// `Start` et `ControlRoom` sont fixées à la création (d'après le caractère
/// lu) ; une case ouverte naît `Unknown` et devient `Corridor` ou `Junction`
/// lors de sa première visite, puis ne change plus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Unknown,
    Corridor,
    Junction,
    Start,
    ControlRoom,
}

impl CellKind {
    /// Caractère de la grille correspondant, s'il désigne une case ouverte.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellKind::Unknown),
            'T' => Some(CellKind::Start),
            'C' => Some(CellKind::ControlRoom),
            _ => None,
        }
    }
}

/// Représente une case ouverte du labyrinthe.
///
/// Les nœuds (carrefours et case de départ) possèdent une arête par
/// direction ouverte ; les couloirs ne gardent que la liste des directions.
#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellKind,
    /// Nombre d'arrivées sur la case.
    pub visits: u32,
    pub min_distance_from_start: Option<u32>,
    pub fully_explored: bool,
    /// Directions ouvertes (hors salle de contrôle), dans l'ordre canonique.
    pub directions: Vec<Direction>,
    pub edges: [Option<Edge>; 4],
    /// Direction de la salle de contrôle si elle est adjacente.
    pub control_room: Option<Direction>,
    discovered: bool,
}

impl Cell {
    /// Crée une case non visitée.
    pub fn new(kind: CellKind) -> Self {
        Self {
            kind,
            visits: 0,
            min_distance_from_start: None,
            fully_explored: false,
            directions: Vec::new(),
            edges: [None; 4],
            control_room: None,
            discovered: false,
        }
    }

    pub fn is_visited(&self) -> bool {
        self.visits > 0
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    /// Un nœud est un point de décision qui porte des marques.
    pub fn is_node(&self) -> bool {
        matches!(self.kind, CellKind::Junction | CellKind::Start)
    }

    pub fn edge(&self, direction: Direction) -> Option<&Edge> {
        self.edges[direction.index()].as_ref()
    }

    pub fn edge_mut(&mut self, direction: Direction) -> Option<&mut Edge> {
        self.edges[direction.index()].as_mut()
    }

    /// Enregistre le résultat de la découverte locale. Sans effet si déjà fait.
    pub fn settle(&mut self, directions: Vec<Direction>, control_room: Option<Direction>) {
        if self.discovered {
            return;
        }
        if self.kind == CellKind::Unknown {
            self.kind = if directions.len() > 2 {
                CellKind::Junction
            } else {
                CellKind::Corridor
            };
        }
        if self.is_node() {
            for &direction in &directions {
                self.edges[direction.index()] = Some(Edge::new());
            }
        }
        self.directions = directions;
        self.control_room = control_room;
        self.discovered = true;
    }

    /// Garde la plus petite distance depuis le départ.
    pub fn relax_distance(&mut self, distance: u32) {
        self.min_distance_from_start = Some(match self.min_distance_from_start {
            Some(known) => known.min(distance),
            None => distance,
        });
    }

    /// Recalcule `fully_explored` : toutes les entrées marquées deux fois.
    pub fn refresh_explored(&mut self) {
        if self.is_node() {
            self.fully_explored = self
                .directions
                .iter()
                .all(|&d| self.edge(d).is_some_and(|e| e.mark == Mark::Twice));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_classifies_once() {
        let mut cell = Cell::new(CellKind::Unknown);
        cell.settle(vec![Direction::Right, Direction::Down, Direction::Left], None);
        assert_eq!(cell.kind, CellKind::Junction);
        assert!(cell.edge(Direction::Down).is_some());
        assert!(cell.edge(Direction::Up).is_none());

        // Une seconde découverte ne change rien.
        cell.settle(vec![Direction::Up], Some(Direction::Right));
        assert_eq!(cell.kind, CellKind::Junction);
        assert_eq!(cell.directions.len(), 3);
        assert_eq!(cell.control_room, None);
    }

    #[test]
    fn test_corridor_owns_no_edges() {
        let mut cell = Cell::new(CellKind::Unknown);
        cell.settle(vec![Direction::Right, Direction::Left], Some(Direction::Up));
        assert_eq!(cell.kind, CellKind::Corridor);
        assert!(cell.edges.iter().all(Option::is_none));
        assert_eq!(cell.control_room, Some(Direction::Up));
    }

    #[test]
    fn test_start_is_node_even_with_one_exit() {
        let mut cell = Cell::new(CellKind::Start);
        cell.settle(vec![Direction::Right], None);
        assert_eq!(cell.kind, CellKind::Start);
        assert!(cell.is_node());
        assert!(cell.edge(Direction::Right).is_some());
    }

    #[test]
    fn test_refresh_explored() {
        let mut cell = Cell::new(CellKind::Start);
        cell.settle(vec![Direction::Right, Direction::Down], None);
        for direction in [Direction::Right, Direction::Down] {
            let edge = cell.edge_mut(direction).unwrap();
            edge.pass();
            edge.pass();
        }
        cell.refresh_explored();
        assert!(cell.fully_explored);
        assert_eq!(cell.edge(Direction::Right).unwrap().mark, Mark::Twice);
    }
}
