use std::collections::HashMap;

use rusty_labyrinth::direction::Direction::{self, *};
use rusty_labyrinth::edge::Mark;
use rusty_labyrinth::labyrinth_mock::{
    generate_braided_labyrinth, generate_labyrinth, DEMO, LOOP_BACK_TO_START, SHORT_AND_LONG_BRANCH, STRAIGHT_CORRIDOR,
};
use rusty_labyrinth::navigator::RetreatReason;
use rusty_labyrinth::protocol::Verdict;
use rusty_labyrinth::referee::Referee;
use rusty_labyrinth::{
    Decision, GameStreamHandler, LabyrinthError, NavState, Navigator, NavigatorConfig, Position,
    RunOutcome, Step, StepKind,
};

/// Tout ce qu'une partie laisse derrière elle.
struct Game {
    referee: Referee,
    navigator: Navigator,
    steps: Vec<Step>,
    /// Distance restante sur la route engagée, au moment de chaque pas.
    route: Vec<Option<u32>>,
    /// Registre complet après chaque décision.
    ledgers: Vec<HashMap<(Position, Direction), Mark>>,
    outcome: Result<(), LabyrinthError>,
}

fn ledger(navigator: &Navigator) -> HashMap<(Position, Direction), Mark> {
    navigator
        .map()
        .edges()
        .map(|(position, direction, edge)| ((position, direction), edge.mark))
        .collect()
}

fn play_with(referee: Referee, config: NavigatorConfig, max_moves: usize) -> Game {
    let first = referee.observation();
    let navigator = Navigator::start(&referee.setup(), &first, config).unwrap();
    let mut game = Game {
        referee,
        navigator,
        steps: Vec::new(),
        route: Vec::new(),
        ledgers: Vec::new(),
        outcome: Ok(()),
    };
    while game.steps.len() < max_moves {
        let decision = match game.navigator.decide() {
            Ok(decision) => decision,
            Err(e) => {
                game.outcome = Err(e);
                break;
            }
        };
        game.ledgers.push(ledger(&game.navigator));
        match decision {
            Decision::Finished => break,
            Decision::Move(step) => {
                game.steps.push(step);
                game.route.push(game.navigator.route_distance());
                game.referee.apply(step.direction);
                if let Err(e) = game.navigator.observe(&game.referee.observation()) {
                    game.outcome = Err(e);
                    break;
                }
            }
        }
    }
    game
}

fn play(maze: &str, alarm_rounds: u32) -> Game {
    play_with(
        Referee::parse(maze, alarm_rounds).unwrap(),
        NavigatorConfig::default(),
        10_000,
    )
}

fn directions(game: &Game) -> Vec<Direction> {
    game.steps.iter().map(|step| step.direction).collect()
}

fn adjacent_open_pairs(rows: &[String]) -> usize {
    let grid: Vec<Vec<bool>> = rows
        .iter()
        .map(|row| row.chars().map(|c| c != '#').collect())
        .collect();
    let mut pairs = 0;
    for r in 0..grid.len() {
        for c in 0..grid[r].len() {
            if !grid[r][c] {
                continue;
            }
            if c + 1 < grid[r].len() && grid[r][c + 1] {
                pairs += 1;
            }
            if r + 1 < grid.len() && grid[r + 1][c] {
                pairs += 1;
            }
        }
    }
    pairs
}

fn open_cells(rows: &[String]) -> usize {
    rows.iter()
        .flat_map(|row| row.chars())
        .filter(|&c| c != '#')
        .count()
}

/// Joue une partie complète par la boucle de tour et rend le verdict.
fn verdict_of(referee: Referee) -> Verdict {
    let mut handler = GameStreamHandler::new(referee, NavigatorConfig::default());
    let summary = handler.handle().unwrap();
    assert!(summary.alarm_triggered);
    handler.into_transport().verdict()
}

fn assert_marks_never_decrease(game: &Game) {
    for window in game.ledgers.windows(2) {
        for (key, before) in &window[0] {
            let after = window[1].get(key).copied().unwrap_or(Mark::Untried);
            assert!(after >= *before, "mark on {:?} went from {:?} to {:?}", key, before, after);
        }
    }
}

fn assert_route_descends(game: &Game) {
    for (pair, kinds) in game.route.windows(2).zip(game.steps.windows(2)) {
        let same_leg = kinds[0].kind == kinds[1].kind
            && matches!(kinds[0].kind, StepKind::TowardControlRoom | StepKind::Homeward);
        if same_leg {
            let (Some(before), Some(after)) = (pair[0], pair[1]) else {
                panic!("route distance missing while returning home");
            };
            assert_eq!(after + 1, before);
        }
    }
}

fn assert_no_unexplained_reversal(game: &Game) {
    for pair in game.steps.windows(2) {
        let reversed = pair[1].direction == pair[0].direction.turn_back();
        let exploring = matches!(
            pair[1].kind,
            StepKind::Advance | StepKind::Branch | StepKind::Retreat(_)
        );
        if reversed && exploring {
            assert!(
                matches!(pair[1].kind, StepKind::Retreat(_)),
                "reversed without retreating: {:?}",
                pair
            );
        }
    }
}

#[test]
fn test_straight_corridor_round_trip() {
    let game = play(STRAIGHT_CORRIDOR, 100);
    assert!(game.outcome.is_ok());
    assert_eq!(
        directions(&game),
        vec![Right, Right, Right, Right, Left, Left, Left, Left]
    );
    assert!(matches!(game.navigator.state(), NavState::Finished));
    assert_eq!(game.referee.verdict(), Verdict::Won);
    assert_route_descends(&game);
}

#[test]
fn test_short_branch_is_exhausted_before_long_branch() {
    let game = play(SHORT_AND_LONG_BRANCH, 20);
    assert!(game.outcome.is_ok());
    assert_eq!(
        directions(&game),
        vec![Right, Right, Left, Down, Down, Down, Up, Up, Up, Left]
    );
    assert_eq!(
        game.steps[2].kind,
        StepKind::Retreat(RetreatReason::DeadEnd)
    );
    let junction = game.navigator.map().cell_at(Position::new(0, 1)).unwrap();
    assert_eq!(junction.edge(Right).unwrap().mark, Mark::Twice);
    assert_eq!(game.referee.verdict(), Verdict::Won);
    assert_marks_never_decrease(&game);
}

#[test]
fn test_unreachable_in_time_explores_then_gives_up() {
    let game = play(STRAIGHT_CORRIDOR, 7);
    assert!(matches!(
        game.outcome,
        Err(LabyrinthError::NoLegalDirection { position }) if position == Position::new(0, 0)
    ));
    assert!(!game.referee.alarm_triggered());
    assert!(game
        .steps
        .iter()
        .all(|step| !matches!(step.kind, StepKind::TowardControlRoom | StepKind::Homeward)));
    for col in 0..4 {
        let cell = game.navigator.map().cell_at(Position::new(0, col)).unwrap();
        assert!(cell.is_visited(), "(0, {}) never visited", col);
    }
}

#[test]
fn test_deadline_exactly_too_short_keeps_exploring() {
    // Un tour de moins que l'aller-retour : jamais d'engagement.
    let game = play_with(
        Referee::parse(STRAIGHT_CORRIDOR, 7).unwrap(),
        NavigatorConfig::default(),
        4,
    );
    assert!(game.outcome.is_ok());
    assert_eq!(directions(&game), vec![Right, Right, Right, Left]);
    assert_eq!(
        game.steps[3],
        Step {
            direction: Left,
            kind: StepKind::Retreat(RetreatReason::DeadEnd),
        }
    );
    assert!(matches!(game.navigator.state(), NavState::Exploring));
    assert_eq!(game.navigator.player().remaining_rounds, 3);
}

#[test]
fn test_exact_round_trip_deadline_is_won() {
    for alarm in 8..=11 {
        let referee = Referee::parse(STRAIGHT_CORRIDOR, alarm).unwrap();
        assert_eq!(verdict_of(referee), Verdict::Won, "alarm {}", alarm);
    }
}

#[test]
fn test_exact_deadline_with_short_scanner_is_won() {
    // La salle n'apparaît qu'à un pas : l'aller restant et le retour tiennent
    // tout juste.
    for alarm in 8..=9 {
        let referee = Referee::parse(STRAIGHT_CORRIDOR, alarm)
            .unwrap()
            .with_scan_radius(1);
        assert_eq!(verdict_of(referee), Verdict::Won, "alarm {}", alarm);
    }

    let game = play_with(
        Referee::parse(STRAIGHT_CORRIDOR, 8).unwrap().with_scan_radius(1),
        NavigatorConfig::default(),
        100,
    );
    assert!(game.outcome.is_ok());
    assert_eq!(game.steps.len(), 8);
    assert_eq!(game.steps[3].kind, StepKind::TowardControlRoom);
    assert_eq!(game.steps[0].kind, StepKind::Branch);
    assert_eq!(game.steps[1].kind, StepKind::Advance);
    assert_eq!(game.steps[2].kind, StepKind::Advance);
    assert_route_descends(&game);
}

#[test]
fn test_bent_corridor_commits_from_start() {
    let game = play_with(
        Referee::parse("T..\n##.\n##C", 8).unwrap(),
        NavigatorConfig::default(),
        100,
    );
    assert!(game.outcome.is_ok());
    assert_eq!(
        directions(&game),
        vec![Right, Right, Down, Down, Up, Up, Left, Left]
    );
    assert_eq!(game.steps[0].kind, StepKind::TowardControlRoom);
    assert_eq!(game.referee.verdict(), Verdict::Won);

    let referee = Referee::parse("T..\n##.\n##C", 7).unwrap();
    let mut handler = GameStreamHandler::new(referee, NavigatorConfig::default());
    assert!(handler.handle().is_err());
    assert!(!handler.into_transport().alarm_triggered());
}

#[test]
fn test_loop_forces_a_retreat_at_start() {
    let game = play(LOOP_BACK_TO_START, 100);
    assert!(matches!(
        game.outcome,
        Err(LabyrinthError::NoLegalDirection { .. })
    ));
    assert_eq!(
        game.steps[8],
        Step {
            direction: Down,
            kind: StepKind::Retreat(RetreatReason::ForcedRetreat),
        }
    );
    assert_eq!(game.steps.len(), 16);
    assert_marks_never_decrease(&game);
    assert_no_unexplained_reversal(&game);
}

#[test]
fn test_demo_labyrinth_is_won() {
    let game = play(DEMO, 200);
    assert!(game.outcome.is_ok());
    assert_eq!(game.referee.verdict(), Verdict::Won);
    assert_marks_never_decrease(&game);
    assert_route_descends(&game);
    assert_no_unexplained_reversal(&game);
}

#[test]
fn test_generated_labyrinths_terminate_within_bound() {
    for seed in 0..40u64 {
        let height = 2 + (seed % 7) as usize;
        let width = 2 + (seed % 5) as usize;
        let rows = generate_labyrinth(height, width, seed);
        let bound = 2 * adjacent_open_pairs(&rows);
        let referee = Referee::from_rows(rows.as_slice(), 10_000).unwrap();
        let game = play_with(referee, NavigatorConfig::default(), bound + 1);

        assert!(game.outcome.is_ok(), "seed {}: {:?}", seed, game.outcome);
        assert!(
            matches!(game.navigator.state(), NavState::Finished),
            "seed {}: stopped in {}",
            seed,
            game.navigator.state().name()
        );
        assert!(game.steps.len() <= bound, "seed {}: {} moves", seed, game.steps.len());
        assert_eq!(game.referee.verdict(), Verdict::Won, "seed {}", seed);
        assert_marks_never_decrease(&game);
        assert_route_descends(&game);
        assert_no_unexplained_reversal(&game);
    }
}

#[test]
fn test_braided_labyrinths_terminate() {
    for seed in 0..40u64 {
        let height = 2 + (seed % 6) as usize;
        let width = 2 + (seed % 4) as usize;
        let loops = (height * width / 4).max(1);
        let rows = generate_braided_labyrinth(height, width, loops, seed);
        let bound = 2 * adjacent_open_pairs(&rows) + 2 * open_cells(&rows);
        let referee = Referee::from_rows(rows.as_slice(), 10_000).unwrap();
        let game = play_with(referee, NavigatorConfig::default(), bound + 1);

        assert!(game.outcome.is_ok(), "seed {}: {:?}", seed, game.outcome);
        assert!(
            matches!(game.navigator.state(), NavState::Finished),
            "seed {}: stopped in {}",
            seed,
            game.navigator.state().name()
        );
        assert!(game.steps.len() <= bound, "seed {}: {} moves", seed, game.steps.len());
        assert_eq!(game.referee.verdict(), Verdict::Won, "seed {}", seed);
        assert_marks_never_decrease(&game);
        assert_route_descends(&game);
        assert_no_unexplained_reversal(&game);
    }
}

#[test]
fn test_braided_game_through_turn_loop() {
    let rows = generate_braided_labyrinth(6, 6, 9, 2024);
    let referee = Referee::from_rows(rows.as_slice(), 10_000).unwrap();
    let mut handler = GameStreamHandler::new(referee, NavigatorConfig::default());
    let summary = handler.handle().unwrap();
    assert!(summary.alarm_triggered);
    assert!(matches!(summary.outcome, RunOutcome::Finished | RunOutcome::GameOver));
    assert_eq!(handler.into_transport().verdict(), Verdict::Won);
}

#[test]
fn test_adjacent_only_commit_still_wins() {
    let config = NavigatorConfig {
        route_commit: false,
        ..NavigatorConfig::default()
    };
    for seed in 100..110u64 {
        let rows = generate_labyrinth(5, 5, seed);
        let referee = Referee::from_rows(rows.as_slice(), 10_000).unwrap();
        let game = play_with(referee, config.clone(), 10_000);
        assert!(game.outcome.is_ok(), "seed {}: {:?}", seed, game.outcome);
        assert_eq!(game.referee.verdict(), Verdict::Won, "seed {}", seed);
    }
}
