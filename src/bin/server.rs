use clap::Parser;
use log::{error, info, warn};
use std::fs;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;

use rusty_labyrinth::labyrinth_mock::{generate_labyrinth, get_labyrinth_mock};
use rusty_labyrinth::network::{receive_message, send_message};
use rusty_labyrinth::protocol::{self, Message, Verdict};
use rusty_labyrinth::referee::Referee;
use rusty_labyrinth::{LabyrinthError, Result, ADDRESS};

/// Serveur de démonstration : une partie par connexion.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = ADDRESS)]
    address: String,

    /// Fichier de labyrinthe (`#`, `.`, `T`, `C`)
    #[arg(long, conflicts_with_all = ["mock", "generate"])]
    maze: Option<PathBuf>,

    /// Labyrinthe fixe par nom (corridor, branches, loop, demo)
    #[arg(long, default_value = "demo")]
    mock: String,

    /// Génère un labyrinthe de HAUTEUR x LARGEUR salles
    #[arg(long, num_args = 2, value_names = ["HEIGHT", "WIDTH"])]
    generate: Option<Vec<usize>>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Tours avant le déclenchement de l'alarme
    #[arg(long, default_value_t = 200)]
    alarm: u32,

    /// Portée du scanner autour de l'agent
    #[arg(long, default_value_t = Referee::DEFAULT_SCAN_RADIUS)]
    scan_radius: i32,
}

fn load_maze(args: &Args, game: u64) -> Result<Referee> {
    if let Some(path) = &args.maze {
        let text = fs::read_to_string(path)?;
        return Referee::parse(&text, args.alarm);
    }
    if let Some(dimensions) = &args.generate {
        let (height, width) = match dimensions.as_slice() {
            [height, width] => (*height, *width),
            _ => return Err(LabyrinthError::Config("--generate takes HEIGHT WIDTH".to_string())),
        };
        let rows = generate_labyrinth(height, width, args.seed + game);
        return Referee::from_rows(rows.as_slice(), args.alarm);
    }
    let maze = get_labyrinth_mock(&args.mock)
        .ok_or_else(|| LabyrinthError::Config(format!("unknown mock labyrinth {:?}", args.mock)))?;
    Referee::parse(maze, args.alarm)
}

fn answer(stream: &mut TcpStream, message: &Message) -> Result<()> {
    send_message(stream, &protocol::encode(message)?)?;
    Ok(())
}

fn handle_client(stream: &mut TcpStream, mut referee: Referee) -> Result<Verdict> {
    answer(stream, &Message::Setup(referee.setup()))?;
    loop {
        let verdict = referee.verdict();
        if verdict != Verdict::InProgress {
            answer(stream, &Message::GameOver { verdict })?;
            return Ok(verdict);
        }
        answer(stream, &Message::Turn(referee.observation()))?;

        let text = receive_message(stream)?;
        match protocol::decode(&text)? {
            Message::Move(direction) => {
                referee.apply(direction);
            }
            other => return Err(protocol::unexpected("Move", &other)),
        }
    }
}

fn init(args: &Args) -> Result<()> {
    let listener = TcpListener::bind(&args.address)?;
    info!("Server listening on {}", args.address);

    // Connexions traitées une à une.
    for (game, stream) in (0u64..).zip(listener.incoming()) {
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Connection failed: {}", e);
                continue;
            }
        };
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "?".to_string(), |addr| addr.to_string());
        info!("New connection: {}", peer);

        let referee = load_maze(args, game)?.with_scan_radius(args.scan_radius);
        match handle_client(&mut stream, referee) {
            Ok(verdict) => info!("Game {} with {}: {:?}", game, peer, verdict),
            Err(e) => warn!("Game {} with {} aborted: {}", game, peer, e),
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = init(&args) {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}
