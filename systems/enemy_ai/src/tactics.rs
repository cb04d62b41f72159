//! Target selection and prediction heuristics used by the brain.

use bomber_core::{ArenaView, CellCoord, Difficulty, Direction};
use bomber_world::{blast, navigation};
use rand::{seq::SliceRandom, Rng};

use crate::danger::{DangerMap, IMMINENT_TIMER};

const OPPORTUNITY_RADIUS: u32 = 3;
const OPPORTUNITY_WALLS: usize = 3;
const POWER_UP_LURE: u32 = 5;
const INTERCEPT_LOOKAHEAD: u32 = 3;
const PRIORITY_POWER_UP: u8 = 4;
const PRIORITY_CLUSTER: u8 = 3;
const PRIORITY_WALL: u8 = 2;
const PRIORITY_OPEN: u8 = 1;

/// Manhattan radius within which an agent considers hunting the player.
pub(crate) fn hunt_range(difficulty: Difficulty, intelligence: f32) -> u32 {
    let base = match difficulty {
        Difficulty::Easy => 3.0,
        Difficulty::Normal => 5.0,
        Difficulty::Hard => 7.0,
    };
    (base * (0.8 + 0.4 * intelligence)).floor() as u32
}

fn wander_radius(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Hard => 7,
        Difficulty::Easy | Difficulty::Normal => 5,
    }
}

/// Picks a wander destination among the best-ranked tiles around `origin`.
///
/// Tiles are ranked by priority (power-up, two or more adjacent destructible
/// walls, one wall, plain floor), then by distance. Easy samples among the top
/// five, Normal among the top three and Hard always takes the best.
pub(crate) fn wander_target<R: Rng>(
    view: &ArenaView<'_>,
    origin: CellCoord,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<CellCoord> {
    let tiles = view.tiles();
    let mut ranked: Vec<(CellCoord, u8)> = window(tiles.size(), origin, wander_radius(difficulty))
        .filter(|cell| *cell != origin && view.is_walkable(*cell))
        .map(|cell| {
            let priority = if view.has_power_up(cell) {
                PRIORITY_POWER_UP
            } else {
                match tiles.adjacent_destructible(cell) {
                    0 => PRIORITY_OPEN,
                    1 => PRIORITY_WALL,
                    _ => PRIORITY_CLUSTER,
                }
            };
            (cell, priority)
        })
        .collect();

    ranked.sort_by_key(|(cell, priority)| (std::cmp::Reverse(*priority), origin.manhattan_distance(*cell)));

    let pool = match difficulty {
        Difficulty::Easy => 5,
        Difficulty::Normal => 3,
        Difficulty::Hard => 1,
    };
    let top = ranked.len().min(pool);
    if top == 0 {
        return None;
    }

    ranked.get(rng.gen_range(0..top)).map(|(cell, _)| *cell)
}

/// Best reachable tile nearby touching at least three destructible walls.
pub(crate) fn bombing_opportunity(view: &ArenaView<'_>, origin: CellCoord) -> Option<CellCoord> {
    let tiles = view.tiles();
    let mut best: Option<(CellCoord, usize)> = None;

    for cell in window(tiles.size(), origin, OPPORTUNITY_RADIUS) {
        if cell == origin || !tiles.is_empty(cell) {
            continue;
        }

        let walls = tiles.adjacent_destructible(cell);
        if walls < OPPORTUNITY_WALLS || best.is_some_and(|(_, most)| most >= walls) {
            continue;
        }

        if navigation::is_reachable(tiles.size(), origin, cell, |next| !view.is_walkable(next)) {
            best = Some((cell, walls));
        }
    }

    best.map(|(cell, _)| cell)
}

/// Destructible walls one or two tiles away along each axis.
pub(crate) fn nearby_walls(view: &ArenaView<'_>, origin: CellCoord) -> usize {
    let tiles = view.tiles();
    Direction::ALL
        .into_iter()
        .flat_map(|direction| {
            let (dx, dy) = direction.delta();
            [1, 2].map(move |distance| origin.offset(dx * distance, dy * distance))
        })
        .flatten()
        .filter(|cell| tiles.is_destructible(*cell))
        .count()
}

/// Open, bomb-free, non-dangerous tiles adjacent to the player.
pub(crate) fn player_escape_routes(view: &ArenaView<'_>, map: &DangerMap) -> usize {
    let player = view.player().cell;
    view.tiles()
        .neighbors(player)
        .filter(|cell| view.is_walkable(*cell) && !map.is_dangerous(*cell))
        .count()
}

/// Guesses the tile the player is about to step onto.
///
/// A player caught in the line of an imminent bomb is expected to sidestep
/// perpendicular to it. Hard agents assume the sidestep leads away from them;
/// Normal agents pick one at random. Otherwise a power-up within reach is
/// assumed to lure the player one tile closer. Easy agents never predict.
pub(crate) fn predict_player<R: Rng>(
    view: &ArenaView<'_>,
    agent: CellCoord,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<CellCoord> {
    if difficulty == Difficulty::Easy {
        return None;
    }

    let player = view.player().cell;
    let tiles = view.tiles();
    let threats: Vec<bool> = view
        .bombs()
        .iter()
        .filter(|bomb| bomb.timer <= IMMINENT_TIMER && blast::covers(tiles, bomb.cell, bomb.range, player))
        .map(|bomb| bomb.cell.column() == player.column())
        .collect();

    if !threats.is_empty() {
        let sidesteps: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                let along_threat = threats
                    .iter()
                    .any(|vertical| *vertical != direction.is_horizontal());
                !along_threat
            })
            .filter(|direction| player.step(*direction).is_some_and(|cell| view.is_walkable(cell)))
            .collect();

        let chosen = if difficulty == Difficulty::Hard {
            away_from(agent, player, &sidesteps)
        } else {
            sidesteps.choose(rng).copied()
        };

        if let Some(cell) = chosen.and_then(|direction| player.step(direction)) {
            return Some(cell);
        }
    }

    let lure = view
        .power_ups()
        .iter()
        .map(|power_up| (power_up.cell, power_up.cell.manhattan_distance(player)))
        .filter(|(_, distance)| *distance <= POWER_UP_LURE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(cell, _)| cell)?;

    let mut dx = signum(lure.column(), player.column());
    let mut dy = signum(lure.row(), player.row());
    if dx != 0 && dy != 0 {
        if rng.gen_bool(0.5) {
            dy = 0;
        } else {
            dx = 0;
        }
    }

    player
        .offset(dx, dy)
        .filter(|cell| view.is_walkable(*cell))
}

fn away_from(agent: CellCoord, player: CellCoord, options: &[Direction]) -> Option<Direction> {
    let away = (
        signum(player.column(), agent.column()),
        signum(player.row(), agent.row()),
    );

    let mut best = options.first().copied()?;
    let mut best_score = -1;
    for direction in options {
        let (dx, dy) = direction.delta();
        let score = dx * away.0 + dy * away.1;
        if score > best_score {
            best_score = score;
            best = *direction;
        }
    }
    Some(best)
}

/// Reachable tile up to three steps beyond the player along the agent's approach.
pub(crate) fn intercept(
    view: &ArenaView<'_>,
    agent: CellCoord,
    difficulty: Difficulty,
) -> Option<CellCoord> {
    if difficulty == Difficulty::Easy {
        return None;
    }

    let player = view.player().cell;
    let dx = signum(player.column(), agent.column());
    let dy = signum(player.row(), agent.row());
    let size = view.tiles().size();

    (1..=INTERCEPT_LOOKAHEAD as i32)
        .filter_map(|step| player.offset(dx * step, dy * step))
        .filter(|cell| view.is_walkable(*cell))
        .find(|cell| navigation::is_reachable(size, agent, *cell, |next| !view.is_walkable(next)))
}

/// Random legal step that avoids dangerous tiles.
pub(crate) fn random_step<R: Rng>(
    view: &ArenaView<'_>,
    map: &DangerMap,
    origin: CellCoord,
    rng: &mut R,
) -> Option<Direction> {
    let mut directions = Direction::ALL;
    directions.shuffle(rng);
    directions.into_iter().find(|direction| {
        origin
            .step(*direction)
            .is_some_and(|cell| view.is_walkable(cell) && !map.is_dangerous(cell))
    })
}

fn signum(to: u32, from: u32) -> i32 {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

/// In-bounds cells of the square window around `origin`, row-major.
fn window(size: u32, origin: CellCoord, radius: u32) -> impl Iterator<Item = CellCoord> {
    let columns = origin.column().saturating_sub(radius)..(origin.column() + radius + 1).min(size);
    let rows = origin.row().saturating_sub(radius)..(origin.row() + radius + 1).min(size);
    rows.flat_map(move |row| columns.clone().map(move |column| CellCoord::new(column, row)))
}
