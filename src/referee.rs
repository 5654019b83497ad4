//! Arbitre en mémoire : tient le labyrinthe complet, révèle ce que le
//! scanner de l'agent voit, applique les déplacements et rend le verdict.

use log::{debug, info};

use crate::direction::Direction;
use crate::error::{LabyrinthError, Result};
use crate::position::Position;
use crate::protocol::{Observation, Setup, Verdict};
use crate::transport::Transport;

pub struct Referee {
    grid: Vec<Vec<char>>,
    revealed: Vec<Vec<bool>>,
    start: Position,
    position: Position,
    alarm_rounds: u32,
    rounds_used: u32,
    scan_radius: i32,
    alarm_triggered: bool,
}

impl Referee {
    /// Rayon par défaut : une fenêtre de 5x5 autour de l'agent.
    pub const DEFAULT_SCAN_RADIUS: i32 = 2;

    /// Lit une grille (`#`, `.`, `T`, `C`, une ligne par rangée).
    pub fn parse(maze: &str, alarm_rounds: u32) -> Result<Self> {
        let rows: Vec<&str> = maze
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(rows.as_slice(), alarm_rounds)
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S], alarm_rounds: u32) -> Result<Self> {
        let grid: Vec<Vec<char>> = rows.iter().map(|row| row.as_ref().chars().collect()).collect();
        let cols = grid.first().map_or(0, Vec::len);
        if grid.is_empty() || cols == 0 {
            return Err(LabyrinthError::MalformedInput("empty labyrinth".to_string()));
        }

        let mut start = None;
        for (r, row) in grid.iter().enumerate() {
            if row.len() != cols {
                return Err(LabyrinthError::MalformedInput(format!(
                    "row {} has {} columns, expected {}",
                    r,
                    row.len(),
                    cols
                )));
            }
            for (c, &tile) in row.iter().enumerate() {
                match tile {
                    '#' | '.' | 'C' => {}
                    'T' if start.is_none() => start = Some(Position::new(r as i32, c as i32)),
                    'T' => {
                        return Err(LabyrinthError::MalformedInput(
                            "more than one start".to_string(),
                        ))
                    }
                    other => {
                        return Err(LabyrinthError::MalformedInput(format!(
                            "unexpected tile {:?} at ({}, {})",
                            other, r, c
                        )))
                    }
                }
            }
        }
        let start =
            start.ok_or_else(|| LabyrinthError::MalformedInput("no start tile".to_string()))?;

        let mut referee = Self {
            revealed: vec![vec![false; cols]; grid.len()],
            grid,
            start,
            position: start,
            alarm_rounds,
            rounds_used: 0,
            scan_radius: Self::DEFAULT_SCAN_RADIUS,
            alarm_triggered: false,
        };
        referee.scan();
        Ok(referee)
    }

    /// Change le rayon du scanner avant le premier tour.
    pub fn with_scan_radius(mut self, radius: i32) -> Self {
        self.scan_radius = radius.max(1);
        self.revealed
            .iter_mut()
            .for_each(|line| line.iter_mut().for_each(|seen| *seen = false));
        self.scan();
        self
    }

    pub fn setup(&self) -> Setup {
        Setup {
            rows: self.grid.len(),
            cols: self.grid[0].len(),
            alarm_rounds: self.alarm_rounds,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rounds_used(&self) -> u32 {
        self.rounds_used
    }

    pub fn alarm_triggered(&self) -> bool {
        self.alarm_triggered
    }

    fn tile(&self, position: Position) -> Option<char> {
        if position.row < 0 || position.col < 0 {
            return None;
        }
        self.grid
            .get(position.row as usize)
            .and_then(|row| row.get(position.col as usize))
            .copied()
    }

    fn scan(&mut self) {
        let radius = self.scan_radius;
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let row = self.position.row + dr;
                let col = self.position.col + dc;
                if row < 0 || col < 0 {
                    continue;
                }
                if let Some(seen) = self
                    .revealed
                    .get_mut(row as usize)
                    .and_then(|line| line.get_mut(col as usize))
                {
                    *seen = true;
                }
            }
        }
    }

    /// Vue de l'agent : les cases jamais révélées valent `?`.
    pub fn observation(&self) -> Observation {
        let rows = self
            .grid
            .iter()
            .zip(&self.revealed)
            .map(|(row, seen)| {
                row.iter()
                    .zip(seen)
                    .map(|(&tile, &seen)| if seen { tile } else { '?' })
                    .collect()
            })
            .collect();
        Observation {
            position: self.position,
            rows,
        }
    }

    /// Applique un déplacement. Un pas dans un mur laisse l'agent sur place
    /// mais consomme le tour.
    pub fn apply(&mut self, direction: Direction) -> Verdict {
        self.rounds_used += 1;
        let next = self.position.step(direction);
        match self.tile(next) {
            Some('#') | None => debug!("Bumped into a wall going {} from {}", direction, self.position),
            Some(tile) => {
                self.position = next;
                if tile == 'C' && !self.alarm_triggered {
                    info!("Alarm triggered after {} rounds", self.rounds_used);
                    self.alarm_triggered = true;
                }
                self.scan();
            }
        }
        self.verdict()
    }

    pub fn verdict(&self) -> Verdict {
        if self.alarm_triggered && self.position == self.start && self.rounds_used <= self.alarm_rounds {
            Verdict::Won
        } else if self.rounds_used >= self.alarm_rounds {
            Verdict::Lost
        } else {
            Verdict::InProgress
        }
    }
}

impl Transport for Referee {
    fn read_setup(&mut self) -> Result<Setup> {
        Ok(self.setup())
    }

    fn read_turn(&mut self) -> Result<Option<Observation>> {
        match self.verdict() {
            Verdict::InProgress => Ok(Some(self.observation())),
            verdict => {
                info!("Game over: {:?} after {} rounds", verdict, self.rounds_used);
                Ok(None)
            }
        }
    }

    fn send_move(&mut self, direction: Direction) -> Result<()> {
        self.apply(direction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_reveals_window() {
        let referee = Referee::parse("T....C", 10).unwrap();
        let observation = referee.observation();
        assert_eq!(observation.rows, vec!["T..???"]);
        assert_eq!(observation.position, Position::new(0, 0));
    }

    #[test]
    fn test_short_scanner_reveals_neighbours_only() {
        let mut referee = Referee::parse("T....C\n......", 10)
            .unwrap()
            .with_scan_radius(1);
        assert_eq!(referee.observation().rows, vec!["T.????", "..????"]);
        referee.apply(Direction::Right);
        assert_eq!(referee.observation().rows, vec!["T..???", "...???"]);
    }

    #[test]
    fn test_revealed_cells_stay_revealed() {
        let mut referee = Referee::parse("T....C", 10).unwrap();
        referee.apply(Direction::Right);
        referee.apply(Direction::Right);
        referee.apply(Direction::Right);
        assert_eq!(referee.observation().rows, vec!["T....C"]);
    }

    #[test]
    fn test_wall_costs_a_round() {
        let mut referee = Referee::parse("T.\n#C", 10).unwrap();
        assert_eq!(referee.apply(Direction::Down), Verdict::InProgress);
        assert_eq!(referee.position(), Position::new(0, 0));
        assert_eq!(referee.rounds_used(), 1);
        assert_eq!(referee.apply(Direction::Up), Verdict::InProgress);
        assert_eq!(referee.position(), Position::new(0, 0));
    }

    #[test]
    fn test_won_and_lost() {
        let mut referee = Referee::parse("TC", 2).unwrap();
        referee.apply(Direction::Right);
        assert!(referee.alarm_triggered());
        assert_eq!(referee.apply(Direction::Left), Verdict::Won);

        let mut referee = Referee::parse("T.C", 2).unwrap();
        referee.apply(Direction::Right);
        assert_eq!(referee.apply(Direction::Right), Verdict::Lost);
    }

    #[test]
    fn test_transport_ends_with_the_game() {
        let mut referee = Referee::parse("TC", 2).unwrap();
        assert!(referee.read_turn().unwrap().is_some());
        referee.send_move(Direction::Right).unwrap();
        referee.send_move(Direction::Left).unwrap();
        assert!(referee.read_turn().unwrap().is_none());
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(Referee::parse("...", 5).is_err());
        assert!(Referee::parse("T.\n.", 5).is_err());
        assert!(Referee::parse("TT", 5).is_err());
        assert!(Referee::parse("T?", 5).is_err());
    }
}
