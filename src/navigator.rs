//! Navigateur : l'algorithme de Trémaux étendu.
//!
//! À chaque tour le navigateur choisit une seule direction :
//! - `Exploring` : marques de Trémaux sur les entrées des nœuds, murs
//!   artificiels au-delà de l'horizon, engagement vers la salle de contrôle
//!   dès que l'aller-retour tient dans les tours restants ;
//! - `ReturningHome` : descente d'un champ de distances, d'abord vers la
//!   salle de contrôle, puis vers le départ ;
//! - `Finished` : de retour au départ après avoir déclenché l'alarme.

use log::{debug, info, trace, warn};

use crate::ascii_utils::{describe_node, render_map};
use crate::cell::{Cell, CellKind};
use crate::config::NavigatorConfig;
use crate::direction::Direction;
use crate::discovery;
use crate::edge::Mark;
use crate::error::{LabyrinthError, Result};
use crate::map::MazeMap;
use crate::planner::{self, Route};
use crate::player::Player;
use crate::position::Position;
use crate::protocol::{Observation, Setup};

/// Étape du trajet engagé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    ToControlRoom,
    ToStart,
}

#[derive(Debug, Clone)]
pub enum NavState {
    Exploring,
    ReturningHome { leg: Leg, route: Route },
    Finished,
}

impl NavState {
    /// Nom de l'état pour les logs.
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Exploring => "Exploring",
            NavState::ReturningHome { leg: Leg::ToControlRoom, .. } => "ReturningHome(ToControlRoom)",
            NavState::ReturningHome { leg: Leg::ToStart, .. } => "ReturningHome(ToStart)",
            NavState::Finished => "Finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NavState::Finished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatReason {
    /// Couloir sans issue.
    DeadEnd,
    /// Nœud déjà visité atteint par une entrée vierge : on repart par elle.
    ForcedRetreat,
    /// Toutes les autres branches dépassent l'horizon.
    ArtificialWall,
    /// Sous-arbre épuisé.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Advance,
    Branch,
    Retreat(RetreatReason),
    TowardControlRoom,
    Homeward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub direction: Direction,
    pub kind: StepKind,
}

impl Step {
    fn new(direction: Direction, kind: StepKind) -> Self {
        Self { direction, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Move(Step),
    Finished,
}

/// Ce que l'arrivée sur un nœud a appris au registre.
#[derive(Debug, Clone, Copy)]
struct NodeArrival {
    entry: Option<Direction>,
    entry_mark_before: Mark,
    previously_visited: bool,
}

pub struct Navigator {
    map: MazeMap,
    player: Player,
    state: NavState,
    config: NavigatorConfig,
    alarm_rounds: u32,
    horizon: u32,
    decisions: u32,
}

impl Navigator {
    /// Crée le navigateur à partir de la configuration de la partie et de la
    /// première observation (qui fixe la case de départ).
    pub fn start(setup: &Setup, first: &Observation, config: NavigatorConfig) -> Result<Self> {
        let mut map = MazeMap::new(setup.rows, setup.cols);
        map.ingest_rows(first.rows.as_slice())?;
        if !map.in_bounds(first.position) {
            return Err(LabyrinthError::MalformedInput(format!(
                "start {} outside a {}x{} grid",
                first.position, setup.rows, setup.cols
            )));
        }
        map.set_start(first.position);
        if let Some(cell) = map.cell_at_mut(first.position) {
            cell.visits = 1;
            cell.relax_distance(0);
        }

        let horizon = config.horizon(setup.alarm_rounds);
        info!(
            "Starting at {} in a {}x{} maze, {} alarm rounds, horizon {}",
            first.position, setup.rows, setup.cols, setup.alarm_rounds, horizon
        );
        Ok(Self {
            map,
            player: Player::new(first.position, setup.alarm_rounds),
            state: NavState::Exploring,
            config,
            alarm_rounds: setup.alarm_rounds,
            horizon,
            decisions: 0,
        })
    }

    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn decisions(&self) -> u32 {
        self.decisions
    }

    /// Distance restante sur la route engagée, depuis la case courante.
    pub fn route_distance(&self) -> Option<u32> {
        match &self.state {
            NavState::ReturningHome { route, .. } => route.remaining(self.player.position),
            _ => None,
        }
    }

    /// Intègre l'observation qui suit le dernier déplacement émis.
    pub fn observe(&mut self, observation: &Observation) -> Result<()> {
        self.map.ingest_rows(observation.rows.as_slice())?;

        let expected = self.player.expected_position();
        if expected != Some(observation.position) {
            return Err(LabyrinthError::MalformedInput(format!(
                "agent reported at {} but the last move leads to {:?}",
                observation.position, expected
            )));
        }

        let previous = self.player.position;
        let previous_distance = self
            .map
            .cell_at(previous)
            .and_then(|cell| cell.min_distance_from_start);
        self.player.arrive(observation.position);

        let exploring = matches!(self.state, NavState::Exploring);
        if let Some(edge_ref) = self.player.current_edge.filter(|_| exploring) {
            if let Some(edge) = self
                .map
                .cell_at_mut(edge_ref.node)
                .and_then(|cell| cell.edge_mut(edge_ref.direction))
            {
                edge.local_distance += 1;
            }
        }

        let cell = self.map.cell_at_mut(observation.position).ok_or_else(|| {
            LabyrinthError::MalformedInput(format!(
                "agent reported on {} which is not an open cell",
                observation.position
            ))
        })?;
        cell.visits += 1;
        if let Some(distance) = previous_distance {
            cell.relax_distance(distance + 1);
        }
        if cell.kind == CellKind::ControlRoom && !self.player.alarm_triggered {
            self.player.alarm_triggered = true;
            info!(
                "Alarm triggered at {}, {} rounds left",
                observation.position, self.player.remaining_rounds
            );
        }
        Ok(())
    }

    /// Choisit le déplacement du tour.
    pub fn decide(&mut self) -> Result<Decision> {
        let position = self.player.position;
        if self.config.trace_map {
            trace!("\n{}", render_map(&self.map, &self.player));
        }
        discovery::discover(&mut self.map, position);

        let decision = match self.state {
            NavState::Finished => return Ok(Decision::Finished),
            NavState::Exploring => self.explore(position)?,
            NavState::ReturningHome { .. } => self.return_home(position)?,
        };
        if let Decision::Move(step) = decision {
            self.decisions += 1;
            self.player.commit_move(step.direction);
            debug!(
                "Turn {}: {} at {} ({:?}, {} rounds left, {})",
                self.decisions,
                step.direction,
                position,
                step.kind,
                self.player.remaining_rounds,
                self.state.name()
            );
        }
        Ok(decision)
    }

    fn cell(&self, position: Position) -> Result<&Cell> {
        self.map
            .cell_at(position)
            .ok_or(LabyrinthError::NoLegalDirection { position })
    }

    // -------------------------------------------------------------------------
    // Exploring
    // -------------------------------------------------------------------------

    fn explore(&mut self, position: Position) -> Result<Decision> {
        let (is_node, control_room_adjacent) = {
            let cell = self.cell(position)?;
            (cell.is_node(), cell.control_room)
        };

        let arrival = if is_node {
            Some(self.arrive_at_node(position))
        } else {
            None
        };

        if let Some(decision) = self.try_commit(position, control_room_adjacent)? {
            return Ok(decision);
        }

        let step = match arrival {
            Some(arrival) => self.choose_at_node(position, arrival)?,
            None => self.choose_in_corridor(position)?,
        };

        if is_node {
            self.leave_node(position, step.direction);
        }
        Ok(Decision::Move(step))
    }

    /// Marque l'entrée d'arrivée et note la longueur du couloir parcouru.
    fn arrive_at_node(&mut self, position: Position) -> NodeArrival {
        let entry = self.player.entry();
        let previous_distance = entry
            .and_then(|e| self.map.cell_at(position.step(e)))
            .and_then(|cell| cell.min_distance_from_start);
        let passage_length = self.player.passage_length;

        let mut arrival = NodeArrival {
            entry,
            entry_mark_before: Mark::Untried,
            previously_visited: false,
        };
        let Some(cell) = self.map.cell_at_mut(position) else {
            return arrival;
        };
        arrival.previously_visited = cell.visits > 1;
        let entry_edge = match entry {
            Some(e) => cell.edge_mut(e),
            None => None,
        };
        if let Some(edge) = entry_edge {
            arrival.entry_mark_before = edge.mark;
            edge.pass();
            edge.local_distance = passage_length;
            if let Some(distance) = previous_distance {
                edge.record_distance_from_start(distance);
            }
        }
        cell.refresh_explored();
        trace!("Node {}: {}", position, describe_node(cell));
        arrival
    }

    /// Marque l'entrée de sortie et en fait l'arête courante.
    fn leave_node(&mut self, position: Position, direction: Direction) {
        if let Some(cell) = self.map.cell_at_mut(position) {
            let next_distance = cell.min_distance_from_start.map(|d| d + 1);
            if let Some(edge) = cell.edge_mut(direction) {
                edge.pass();
                edge.local_distance = 0;
                if let Some(distance) = next_distance {
                    edge.record_distance_from_start(distance);
                }
            }
            cell.refresh_explored();
        }
        self.player.leave_node(position, direction);
    }

    /// S'engage vers la salle de contrôle si l'aller puis le retour tiennent.
    fn try_commit(
        &mut self,
        position: Position,
        control_room_adjacent: Option<Direction>,
    ) -> Result<Option<Decision>> {
        if !self.config.route_commit && control_room_adjacent.is_none() {
            return Ok(None);
        }
        let Some(plan) = planner::plan_commit(&self.map, position) else {
            return Ok(None);
        };
        let remaining = self.player.remaining_rounds;
        if plan.fits(remaining) {
            info!(
                "Control room within reach from {}: {} steps, {} back, {} rounds left",
                position, plan.steps, plan.home, remaining
            );
            planner::propagate_control_room_distance(&mut self.map, &plan.route.field);
            self.state = NavState::ReturningHome {
                leg: Leg::ToControlRoom,
                route: plan.route,
            };
            return self.return_home(position).map(Some);
        }

        if let Some(direction) = control_room_adjacent {
            if planner::is_round_trip_feasible(plan.home, self.alarm_rounds) {
                info!(
                    "Control room next door ({}) but {} + {} moves do not fit in {} rounds, exploring on",
                    direction, plan.steps, plan.home, remaining
                );
            } else {
                warn!(
                    "Control room is {} moves from the start, beyond a {} round alarm",
                    plan.home, self.alarm_rounds
                );
            }
            if let Some(edge_ref) = self.player.current_edge {
                if let Some(edge) = self
                    .map
                    .cell_at_mut(edge_ref.node)
                    .and_then(|cell| cell.edge_mut(edge_ref.direction))
                {
                    edge.note_control_room_nearby();
                }
            }
        }
        Ok(None)
    }

    fn is_pruning(&self, cell: &Cell) -> bool {
        cell.min_distance_from_start
            .is_some_and(|distance| distance >= self.horizon)
    }

    /// Règle de Trémaux sur un nœud.
    fn choose_at_node(&self, position: Position, arrival: NodeArrival) -> Result<Step> {
        if let Some(entry) = arrival.entry {
            if arrival.previously_visited && arrival.entry_mark_before == Mark::Untried {
                return Ok(Step::new(entry, StepKind::Retreat(RetreatReason::ForcedRetreat)));
            }
        }

        let cell = self.cell(position)?;
        let pruning = self.is_pruning(cell);
        let mut walled = false;
        let mut best: Option<(Mark, Direction)> = None;
        for &direction in &cell.directions {
            if Some(direction) == arrival.entry {
                continue;
            }
            let Some(edge) = cell.edge(direction) else {
                continue;
            };
            if edge.mark == Mark::Twice {
                continue;
            }
            if pruning && edge.exceeds(self.horizon) {
                walled = true;
                continue;
            }
            if best.map_or(true, |(mark, _)| edge.mark < mark) {
                best = Some((edge.mark, direction));
            }
        }

        match (best, arrival.entry) {
            (Some((_, direction)), _) => Ok(Step::new(direction, StepKind::Branch)),
            (None, Some(entry)) if cell.kind != CellKind::Start => {
                let reason = if walled {
                    RetreatReason::ArtificialWall
                } else {
                    RetreatReason::Exhausted
                };
                Ok(Step::new(entry, StepKind::Retreat(reason)))
            }
            _ => {
                warn!("Nothing left to explore from {}", position);
                Err(LabyrinthError::NoLegalDirection { position })
            }
        }
    }

    /// Dans un couloir on continue tout droit, sauf cul-de-sac ou horizon dépassé.
    fn choose_in_corridor(&self, position: Position) -> Result<Step> {
        let cell = self.cell(position)?;
        let entry = self.player.entry();
        let forward = cell.directions.iter().copied().find(|&d| Some(d) != entry);

        match (forward, entry) {
            (Some(direction), Some(back)) => {
                let beyond = self
                    .map
                    .cell_at(position.step(direction))
                    .and_then(|next| next.min_distance_from_start);
                let walled =
                    self.is_pruning(cell) && beyond.map_or(true, |distance| distance >= self.horizon);
                if walled {
                    debug!("Artificial wall {} of {}", direction, position);
                    Ok(Step::new(back, StepKind::Retreat(RetreatReason::ArtificialWall)))
                } else {
                    Ok(Step::new(direction, StepKind::Advance))
                }
            }
            (Some(direction), None) => Ok(Step::new(direction, StepKind::Advance)),
            (None, Some(back)) if cell.directions.contains(&back) => {
                Ok(Step::new(back, StepKind::Retreat(RetreatReason::DeadEnd)))
            }
            _ => Err(LabyrinthError::NoLegalDirection { position }),
        }
    }

    // -------------------------------------------------------------------------
    // ReturningHome
    // -------------------------------------------------------------------------

    fn return_home(&mut self, position: Position) -> Result<Decision> {
        let at_control_room = Some(position) == self.map.control_room();
        if at_control_room
            && matches!(
                self.state,
                NavState::ReturningHome {
                    leg: Leg::ToControlRoom,
                    ..
                }
            )
        {
            self.pivot_home(position)?;
        }

        let is_home = Some(position) == self.map.start();
        let (leg, route) = match &self.state {
            NavState::ReturningHome { leg, route } => (*leg, route),
            _ => return Err(LabyrinthError::NoLegalDirection { position }),
        };
        if leg == Leg::ToStart && is_home {
            info!(
                "Back home after {} moves, {} rounds to spare",
                self.decisions, self.player.remaining_rounds
            );
            self.state = NavState::Finished;
            return Ok(Decision::Finished);
        }

        let here = route
            .remaining(position)
            .ok_or(LabyrinthError::NoLegalDirection { position })?;
        let cell = self.cell(position)?;
        let from_ledger = if cell.is_node() && cell.is_visited() {
            lowest_recorded(cell, leg, here)
        } else {
            None
        };
        let direction = from_ledger
            .or_else(|| route.field.descend(&self.map, position))
            .ok_or(LabyrinthError::NoLegalDirection { position })?;

        let kind = match leg {
            Leg::ToControlRoom => StepKind::TowardControlRoom,
            Leg::ToStart => StepKind::Homeward,
        };
        Ok(Decision::Move(Step::new(direction, kind)))
    }

    /// Alarme déclenchée : nouvelle route vers le départ.
    fn pivot_home(&mut self, position: Position) -> Result<()> {
        let start = self
            .map
            .start()
            .ok_or(LabyrinthError::NoLegalDirection { position })?;
        let route = Route::toward(&self.map, start);
        let home = route
            .remaining(position)
            .ok_or(LabyrinthError::NoLegalDirection { position })?;
        if !planner::is_return_feasible(home, self.player.remaining_rounds) {
            warn!(
                "Return needs {} moves but only {} rounds are left",
                home, self.player.remaining_rounds
            );
        }
        info!("Heading home: {} moves", home);
        planner::propagate_distance_from_start(&mut self.map, &route.field);
        self.state = NavState::ReturningHome {
            leg: Leg::ToStart,
            route,
        };
        Ok(())
    }
}

/// Entrée dont la distance enregistrée (vers la salle ou vers le départ) est
/// la plus faible, à condition de descendre strictement sous `here`.
fn lowest_recorded(cell: &Cell, leg: Leg, here: u32) -> Option<Direction> {
    cell.directions
        .iter()
        .filter_map(|&direction| {
            let edge = cell.edge(direction)?;
            // Distance de la case voisine sur le champ suivi.
            let beyond = match leg {
                Leg::ToControlRoom => edge.distance_to_control_room.known()?.checked_sub(1)?,
                Leg::ToStart => edge.distance_from_start?,
            };
            (beyond < here).then_some((beyond, direction))
        })
        .min()
        .map(|(_, direction)| direction)
}
