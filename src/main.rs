use clap::Parser;
use log::{error, info};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use rusty_labyrinth::network::connect_to_server;
use rusty_labyrinth::transport::{FramedTransport, LineTransport};
use rusty_labyrinth::{Config, GameStreamHandler, Result, RunSummary};

/// Agent du labyrinthe : explore, déclenche l'alarme, revient au départ.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Fichier de configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Joue le protocole binaire sur TCP (ex. localhost:8778) au lieu de stdin/stdout
    #[arg(long, value_name = "ADDR")]
    connect: Option<String>,
}

fn run(args: &Args) -> Result<RunSummary> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match &args.connect {
        Some(address) => {
            let stream = connect_to_server(address)?;
            info!("Connected to {}", address);
            GameStreamHandler::new(FramedTransport::new(stream), config.navigator).handle()
        }
        None => {
            let stdin = io::stdin().lock();
            let stdout = BufWriter::new(io::stdout().lock());
            GameStreamHandler::new(LineTransport::new(stdin, stdout), config.navigator).handle()
        }
    }
}

fn main() -> ExitCode {
    // stdout porte les déplacements : les logs vont sur stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            info!("{} moves, {:?}", summary.moves, summary.outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[{}] {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
