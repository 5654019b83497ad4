/*!
 * # Module de visualisation de la carte
 *
 * Ce module convertit la carte connue (`MazeMap`) en une représentation ASCII
 * destinée aux logs de niveau trace.
 *
 * Les fonctions disponibles permettent :
 * - D'afficher la carte connue avec la position de l'agent.
 * - De résumer le registre d'un nœud (marques et distances de ses entrées).
 */

use crate::cell::{Cell, CellKind};
use crate::direction::Direction;
use crate::edge::ControlRoomDistance;
use crate::map::MazeMap;
use crate::player::Player;
use crate::position::Position;

/// Génère une représentation ASCII de la carte connue.
///
/// Légende :
/// - `@` : l'agent
/// - `T` / `C` : départ et salle de contrôle
/// - `.` : case ouverte jamais visitée
/// - `o` : case visitée
/// - `x` : nœud entièrement exploré
/// - `#` : mur ou case inconnue
///
/// # Arguments
///
/// * `map` - La carte construite au fil des observations.
/// * `player` - L'agent, dont la position est superposée à la carte.
///
/// # Retour
///
/// Une `String` d'une ligne par rangée de la grille.
pub fn render_map(map: &MazeMap, player: &Player) -> String {
    let mut out = String::with_capacity(map.rows() * (map.cols() + 1));
    for row in 0..map.rows() {
        for col in 0..map.cols() {
            let position = Position::new(row as i32, col as i32);
            let glyph = if position == player.position {
                '@'
            } else {
                map.cell_at(position).map_or('#', cell_glyph)
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn cell_glyph(cell: &Cell) -> char {
    match cell.kind {
        CellKind::Start => 'T',
        CellKind::ControlRoom => 'C',
        _ if cell.fully_explored => 'x',
        _ if cell.is_visited() => 'o',
        _ => '.',
    }
}

/// Résume le registre d'un nœud, une entrée par direction ouverte.
///
/// Exemple : `RIGHT:1/d3 DOWN:0/d? LEFT:2/d1/C4`
/// (marque, distance depuis le départ, distance vers la salle si connue).
pub fn describe_node(cell: &Cell) -> String {
    Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let edge = cell.edge(direction)?;
            let distance = edge
                .distance_from_start
                .map_or_else(|| "?".to_string(), |d| d.to_string());
            let room = match edge.distance_to_control_room {
                ControlRoomDistance::Unknown => String::new(),
                ControlRoomDistance::Nearby => "/C~".to_string(),
                ControlRoomDistance::Known(d) => format!("/C{}", d),
            };
            Some(format!(
                "{}:{}/d{}{}",
                direction.command(),
                edge.mark.count(),
                distance,
                room
            ))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
