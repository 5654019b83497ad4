//! Registre des arêtes.
//!
//! Chaque entrée d'un nœud (carrefour ou case de départ) porte une `Edge` :
//! le nombre de passages (marques de Trémaux) et les distances connues.

/// Marques de Trémaux posées sur une entrée. Ne fait que croître.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Mark {
    /// Jamais empruntée.
    #[default]
    Untried,
    /// Empruntée une fois : la branche en cours d'exploration.
    Once,
    /// Empruntée deux fois : épuisée (cul-de-sac ou boucle).
    Twice,
}

impl Mark {
    /// Une marque de plus, plafonnée à deux.
    pub fn bump(self) -> Self {
        match self {
            Mark::Untried => Mark::Once,
            Mark::Once | Mark::Twice => Mark::Twice,
        }
    }

    pub fn count(self) -> u8 {
        match self {
            Mark::Untried => 0,
            Mark::Once => 1,
            Mark::Twice => 2,
        }
    }
}

/// Distance vers la salle de contrôle enregistrée sur une entrée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlRoomDistance {
    /// Aucun chemin confirmé.
    #[default]
    Unknown,
    /// Salle vue à côté de cette branche, mais l'aller-retour ne tenait pas.
    Nearby,
    /// Chemin confirmé de cette longueur (en passant par l'entrée).
    Known(u32),
}

impl ControlRoomDistance {
    pub fn known(self) -> Option<u32> {
        match self {
            ControlRoomDistance::Known(distance) => Some(distance),
            _ => None,
        }
    }
}

/// Une entrée de nœud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
    pub mark: Mark,
    /// Distance connue depuis le départ de la case atteinte par cette entrée
    /// (`None` tant qu'elle n'a pas été parcourue).
    pub distance_from_start: Option<u32>,
    /// Longueur parcourue dans le couloir depuis qu'on a quitté le nœud.
    pub local_distance: u32,
    pub distance_to_control_room: ControlRoomDistance,
}

impl Edge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passage par cette entrée (en sortant ou en arrivant).
    pub fn pass(&mut self) {
        self.mark = self.mark.bump();
    }

    /// Garde la plus petite distance observée.
    pub fn record_distance_from_start(&mut self, distance: u32) {
        self.distance_from_start = Some(match self.distance_from_start {
            Some(known) => known.min(distance),
            None => distance,
        });
    }

    /// Vrai si la distance enregistrée franchit l'horizon (`None` compte comme l'infini).
    pub fn exceeds(&self, horizon: u32) -> bool {
        self.distance_from_start.map_or(true, |distance| distance >= horizon)
    }

    /// Marque la salle de contrôle comme proche mais hors d'atteinte,
    /// sans écraser une distance déjà confirmée.
    pub fn note_control_room_nearby(&mut self) {
        if self.distance_to_control_room == ControlRoomDistance::Unknown {
            self.distance_to_control_room = ControlRoomDistance::Nearby;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_only_grow_and_cap_at_two() {
        let mut edge = Edge::new();
        let mut seen = vec![edge.mark.count()];
        for _ in 0..4 {
            edge.pass();
            seen.push(edge.mark.count());
        }
        assert_eq!(seen, vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_distance_keeps_minimum() {
        let mut edge = Edge::new();
        assert!(edge.exceeds(0));
        edge.record_distance_from_start(7);
        edge.record_distance_from_start(9);
        assert_eq!(edge.distance_from_start, Some(7));
        edge.record_distance_from_start(3);
        assert_eq!(edge.distance_from_start, Some(3));
        assert!(!edge.exceeds(4));
        assert!(edge.exceeds(3));
    }

    #[test]
    fn test_nearby_does_not_override_known() {
        let mut edge = Edge::new();
        edge.note_control_room_nearby();
        assert_eq!(edge.distance_to_control_room, ControlRoomDistance::Nearby);
        edge.distance_to_control_room = ControlRoomDistance::Known(4);
        edge.note_control_room_nearby();
        assert_eq!(edge.distance_to_control_room.known(), Some(4));
    }
}
