//! Cross-shaped blast geometry.

use bomber_core::{CellCoord, Direction, TileKind, TileView};

/// Tiles a bomb at `origin` with the given `range` would set ablaze right now.
///
/// The origin comes first, followed by each ray in [`Direction::ALL`] order.
/// A ray stops before an indestructible wall or the grid edge, and stops after
/// the first destructible wall it breaches.
#[must_use]
pub fn footprint(tiles: TileView<'_>, origin: CellCoord, range: u32) -> Vec<CellCoord> {
    let mut cells = Vec::with_capacity(1 + 4 * range as usize);
    cells.push(origin);

    for direction in Direction::ALL {
        let mut cursor = origin;
        for _ in 0..range {
            let Some(next) = cursor.step(direction) else {
                break;
            };

            match tiles.kind(next) {
                None | Some(TileKind::Wall) => break,
                Some(TileKind::Destructible) => {
                    cells.push(next);
                    break;
                }
                Some(TileKind::Empty) => cells.push(next),
            }

            cursor = next;
        }
    }

    cells
}

/// Whether a blast from `origin` reaches `target` along an unobstructed line.
///
/// Only the tiles strictly between the two cells must be open floor; the
/// target itself may be of any kind.
#[must_use]
pub fn covers(tiles: TileView<'_>, origin: CellCoord, range: u32, target: CellCoord) -> bool {
    if origin == target {
        return true;
    }

    if !origin.is_aligned_with(target) || origin.manhattan_distance(target) > range {
        return false;
    }

    let columns = target.column() as i64 - origin.column() as i64;
    let rows = target.row() as i64 - origin.row() as i64;
    let step = (columns.signum() as i32, rows.signum() as i32);

    let mut cursor = origin;
    loop {
        let Some(next) = cursor.offset(step.0, step.1) else {
            return false;
        };

        if next == target {
            return true;
        }

        if !tiles.is_empty(next) {
            return false;
        }

        cursor = next;
    }
}
