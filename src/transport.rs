//! Couche de transport : comment la boucle de tour reçoit ses observations
//! et émet ses déplacements.

use log::{debug, info};
use std::collections::VecDeque;
use std::io::{BufRead, Read, Write};
use std::str::FromStr;

use crate::direction::Direction;
use crate::error::{LabyrinthError, Result};
use crate::network::{receive_message, send_message};
use crate::position::Position;
use crate::protocol::{self, Message, Observation, Setup};

pub trait Transport {
    /// Lit les paramètres de la partie.
    fn read_setup(&mut self) -> Result<Setup>;

    /// Lit l'observation du tour ; `None` quand la partie est terminée ou le
    /// flux fermé.
    fn read_turn(&mut self) -> Result<Option<Observation>>;

    fn send_move(&mut self, direction: Direction) -> Result<()>;
}

/// Protocole texte : des jetons séparés par des blancs.
///
/// ```text
/// 4 3 20        <- lignes, colonnes, tours d'alarme
/// 0 0           <- position (ligne, colonne)
/// T..           <- une ligne de grille par ligne
/// #.#
/// ...
/// ```
pub struct LineTransport<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
    rows: usize,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
            rows: 0,
        }
    }

    /// Prochain jeton ; `None` en fin de flux.
    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    fn expect_token(&mut self, what: &str) -> Result<String> {
        self.next_token()?
            .ok_or_else(|| LabyrinthError::MalformedInput(format!("input ended before {}", what)))
    }

    fn expect_number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.expect_token(what)?;
        token
            .parse()
            .map_err(|_| LabyrinthError::MalformedInput(format!("{}: not a number: {:?}", what, token)))
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn read_setup(&mut self) -> Result<Setup> {
        let rows = self.expect_number("row count")?;
        let cols = self.expect_number("column count")?;
        let alarm_rounds = self.expect_number("alarm rounds")?;
        self.rows = rows;
        Ok(Setup {
            rows,
            cols,
            alarm_rounds,
        })
    }

    fn read_turn(&mut self) -> Result<Option<Observation>> {
        let Some(first) = self.next_token()? else {
            return Ok(None);
        };
        let row = first
            .parse()
            .map_err(|_| LabyrinthError::MalformedInput(format!("row: not a number: {:?}", first)))?;
        let col = self.expect_number("column")?;
        let mut rows = Vec::with_capacity(self.rows);
        for i in 0..self.rows {
            rows.push(self.expect_token(&format!("grid row {}", i))?);
        }
        Ok(Some(Observation {
            position: Position::new(row, col),
            rows,
        }))
    }

    fn send_move(&mut self, direction: Direction) -> Result<()> {
        writeln!(self.writer, "{}", direction.command())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Protocole binaire : messages JSON précédés de leur longueur.
pub struct FramedTransport<S: Read + Write> {
    stream: S,
}

impl<S: Read + Write> FramedTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    fn receive(&mut self) -> Result<Message> {
        let text = receive_message(&mut self.stream)?;
        debug!("<- {}", text);
        protocol::decode(&text)
    }
}

impl<S: Read + Write> Transport for FramedTransport<S> {
    fn read_setup(&mut self) -> Result<Setup> {
        match self.receive()? {
            Message::Setup(setup) => Ok(setup),
            other => Err(protocol::unexpected("Setup", &other)),
        }
    }

    fn read_turn(&mut self) -> Result<Option<Observation>> {
        let message = match self.receive() {
            Ok(message) => message,
            Err(LabyrinthError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!("Server closed the connection");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        match message {
            Message::Turn(observation) => Ok(Some(observation)),
            Message::GameOver { verdict } => {
                info!("Game over: {:?}", verdict);
                Ok(None)
            }
            other => Err(protocol::unexpected("Turn", &other)),
        }
    }

    fn send_move(&mut self, direction: Direction) -> Result<()> {
        let text = protocol::encode(&Message::Move(direction))?;
        debug!("-> {}", text);
        send_message(&mut self.stream, &text)?;
        Ok(())
    }
}
