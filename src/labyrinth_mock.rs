//! Labyrinthes de test : quelques grilles fixes et un générateur aléatoire
//! reproductible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Couloir droit, salle de contrôle au bout.
pub const STRAIGHT_CORRIDOR: &str = "T...C";

/// Carrefour juste après le départ : une branche courte sans issue, une
/// branche longue vers la salle.
pub const SHORT_AND_LONG_BRANCH: &str = "\
T..
#.#
#.#
#C#";

/// Boucle qui ramène au départ par une entrée vierge ; la salle est murée.
pub const LOOP_BACK_TO_START: &str = "\
T..#
.#.#
...#
###C";

/// Grille utilisée par défaut par le serveur de démonstration.
pub const DEMO: &str = "\
##########
#T.....#.#
#.##.#.#.#
#.#..#...#
#.#.####.#
#...#..#.#
###.#.##.#
#...#....#
#.###.#C.#
##########";

/// Renvoie une grille fixe par son nom.
pub fn get_labyrinth_mock(name: &str) -> Option<&'static str> {
    match name {
        "corridor" => Some(STRAIGHT_CORRIDOR),
        "branches" => Some(SHORT_AND_LONG_BRANCH),
        "loop" => Some(LOOP_BACK_TO_START),
        "demo" => Some(DEMO),
        _ => None,
    }
}

/// Génère un labyrinthe parfait (un seul chemin entre deux cases) de
/// `height` x `width` salles, soit une grille de `2 * height + 1` lignes et
/// `2 * width + 1` colonnes.
///
/// Le départ est toujours la salle en haut à gauche ; la salle de contrôle
/// est tirée parmi les autres. La même graine donne la même grille.
pub fn generate_labyrinth(height: usize, width: usize, seed: u64) -> Vec<String> {
    generate_braided_labyrinth(height, width, 0, seed)
}

/// Comme [`generate_labyrinth`], puis abat jusqu'à `loops` murs intérieurs
/// supplémentaires, ce qui crée des boucles.
pub fn generate_braided_labyrinth(
    height: usize,
    width: usize,
    loops: usize,
    seed: u64,
) -> Vec<String> {
    let height = height.max(1);
    // Il faut au moins deux salles.
    let width = if height == 1 { width.max(2) } else { width.max(1) };
    let mut rng = StdRng::seed_from_u64(seed);

    let mut grid = vec![vec!['#'; 2 * width + 1]; 2 * height + 1];
    let mut visited = vec![vec![false; width]; height];
    let mut stack = vec![(0usize, 0usize)];
    visited[0][0] = true;
    grid[1][1] = '.';

    while let Some(&(r, c)) = stack.last() {
        let mut next: Vec<(usize, usize)> = Vec::with_capacity(4);
        if r > 0 && !visited[r - 1][c] {
            next.push((r - 1, c));
        }
        if r + 1 < height && !visited[r + 1][c] {
            next.push((r + 1, c));
        }
        if c > 0 && !visited[r][c - 1] {
            next.push((r, c - 1));
        }
        if c + 1 < width && !visited[r][c + 1] {
            next.push((r, c + 1));
        }
        next.shuffle(&mut rng);
        match next.first() {
            Some(&(nr, nc)) => {
                visited[nr][nc] = true;
                grid[2 * nr + 1][2 * nc + 1] = '.';
                // Mur abattu entre les deux salles.
                grid[r + nr + 1][c + nc + 1] = '.';
                stack.push((nr, nc));
            }
            None => {
                stack.pop();
            }
        }
    }

    grid[1][1] = 'T';
    let room = rng.random_range(1..height * width);
    let (r, c) = (room / width, room % width);
    grid[2 * r + 1][2 * c + 1] = 'C';

    if loops > 0 {
        // Murs entre deux salles voisines encore debout.
        let mut walls: Vec<(usize, usize)> = (1..2 * height)
            .flat_map(|r| (1..2 * width).map(move |c| (r, c)))
            .filter(|&(r, c)| (r % 2 == 1) != (c % 2 == 1))
            .filter(|&(r, c)| grid[r][c] == '#')
            .collect();
        walls.shuffle(&mut rng);
        for &(r, c) in walls.iter().take(loops) {
            grid[r][c] = '.';
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}
