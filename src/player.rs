use crate::direction::Direction;
use crate::position::Position;

/// Référence à l'arête en cours de parcours : le nœud quitté et la direction prise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub node: Position,
    pub direction: Direction,
}

/// État de l'agent : position, cap, tours restants.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Position,
    /// Direction du dernier déplacement (`None` au premier tour).
    pub heading: Option<Direction>,
    pub remaining_rounds: u32,
    /// Arête en cours (`None` seulement avant le premier départ d'un nœud).
    pub current_edge: Option<EdgeRef>,
    /// Pas faits depuis le dernier nœud quitté.
    pub passage_length: u32,
    pub alarm_triggered: bool,
}

impl Player {
    pub fn new(position: Position, remaining_rounds: u32) -> Self {
        Self {
            position,
            heading: None,
            remaining_rounds,
            current_edge: None,
            passage_length: 0,
            alarm_triggered: false,
        }
    }

    /// Entrée par laquelle l'agent vient d'arriver sur sa case.
    pub fn entry(&self) -> Option<Direction> {
        self.heading.map(Direction::turn_back)
    }

    /// Enregistre le déplacement émis ; un tour est consommé.
    pub fn commit_move(&mut self, direction: Direction) {
        self.heading = Some(direction);
        self.remaining_rounds = self.remaining_rounds.saturating_sub(1);
    }

    /// Arrivée sur la case rapportée par le serveur.
    pub fn arrive(&mut self, position: Position) {
        self.position = position;
        self.passage_length += 1;
    }

    /// Départ d'un nœud par `direction`.
    pub fn leave_node(&mut self, node: Position, direction: Direction) {
        self.current_edge = Some(EdgeRef { node, direction });
        self.passage_length = 0;
    }

    /// Position attendue après le dernier déplacement émis.
    pub fn expected_position(&self) -> Option<Position> {
        self.heading.map(|direction| self.position.step(direction))
    }
}
