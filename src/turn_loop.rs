//! Boucle de tour : une observation, une décision, un déplacement.

use log::{error, info};

use crate::config::NavigatorConfig;
use crate::error::Result;
use crate::navigator::{Decision, NavState, Navigator};
use crate::transport::Transport;

/// Fin d'une partie menée par la boucle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// De retour au départ après l'alarme.
    Finished,
    /// Le transport n'a plus envoyé de tour (partie close côté serveur).
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub moves: u32,
    pub outcome: RunOutcome,
    pub alarm_triggered: bool,
    pub remaining_rounds: u32,
}

pub struct GameStreamHandler<T: Transport> {
    transport: T,
    config: NavigatorConfig,
    navigator: Option<Navigator>,
}

impl<T: Transport> GameStreamHandler<T> {
    pub fn new(transport: T, config: NavigatorConfig) -> Self {
        Self {
            transport,
            config,
            navigator: None,
        }
    }

    /// Navigateur de la partie en cours (après le premier tour).
    pub fn navigator(&self) -> Option<&Navigator> {
        self.navigator.as_ref()
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Boucle principale
    pub fn handle(&mut self) -> Result<RunSummary> {
        let setup = self.transport.read_setup()?;
        let Some(first) = self.transport.read_turn()? else {
            info!("Game closed before the first turn");
            return Ok(RunSummary {
                moves: 0,
                outcome: RunOutcome::GameOver,
                alarm_triggered: false,
                remaining_rounds: setup.alarm_rounds,
            });
        };
        let navigator = self
            .navigator
            .insert(Navigator::start(&setup, &first, self.config.clone())?);

        let outcome = match Self::drive(&mut self.transport, navigator) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "[{}] {} ({} in {} moves)",
                    e.code(),
                    e,
                    navigator.state().name(),
                    navigator.decisions()
                );
                return Err(e);
            }
        };

        let summary = RunSummary {
            moves: navigator.decisions(),
            outcome,
            alarm_triggered: navigator.player().alarm_triggered,
            remaining_rounds: navigator.player().remaining_rounds,
        };
        match navigator.state() {
            NavState::Finished => info!("Run complete: {:?}", summary),
            state => info!("Run stopped in {}: {:?}", state.name(), summary),
        }
        Ok(summary)
    }

    /// Décide, envoie puis observe jusqu'à la fin de la partie.
    fn drive(transport: &mut T, navigator: &mut Navigator) -> Result<RunOutcome> {
        loop {
            match navigator.decide()? {
                Decision::Finished => return Ok(RunOutcome::Finished),
                Decision::Move(step) => transport.send_move(step.direction)?,
            }
            match transport.read_turn()? {
                Some(observation) => navigator.observe(&observation)?,
                None => return Ok(RunOutcome::GameOver),
            }
        }
    }
}
