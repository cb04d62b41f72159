//! Grid search primitives shared by the world and the enemy systems.
//!
//! Every search takes an `is_blocked` predicate so callers decide what
//! obstructs travel: walls and bombs for plain movement, plus simulated
//! blast footprints or imminent danger when the AI checks its escape routes.
//! Searches never expand more nodes than the grid holds cells.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
};

use bomber_core::CellCoord;

/// Dense breadth-first distance grid grown from one or more origins.
///
/// Origins are always part of the field at distance zero, even when the
/// predicate would block them, so an agent standing on its own bomb can still
/// search outward. Unreachable cells report `None`.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    size: u32,
    distances: Vec<u16>,
}

impl DistanceField {
    /// Builds a field from a single origin.
    #[must_use]
    pub fn from_origin<F>(size: u32, origin: CellCoord, is_blocked: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut field = Self::default();
        field.rebuild_with(size, &[origin], is_blocked);
        field
    }

    /// Rebuilds the distances using a breadth-first search from `origins`.
    pub fn rebuild_with<F>(&mut self, size: u32, origins: &[CellCoord], mut is_blocked: F)
    where
        F: FnMut(CellCoord) -> bool,
    {
        let width = usize::try_from(size).unwrap_or(0);
        let cell_count = width.checked_mul(width).unwrap_or(0);
        self.size = size;

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let mut queue = VecDeque::new();

        for &origin in origins {
            let Some(origin_index) = index(size, origin) else {
                continue;
            };

            if self.distances[origin_index] == 0 {
                continue;
            }

            self.distances[origin_index] = 0;
            queue.push_back(origin);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(size, cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for neighbor in neighbors(cell, size) {
                let Some(neighbor_index) = index(size, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                if is_blocked(neighbor) {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Side length of the searched grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Step count from the nearest origin, or `None` when unreachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u16> {
        index(self.size, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u16::MAX)
    }

    /// Whether the cell was reached by the search.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell).is_some()
    }

    /// Iterates reached cells with their distances in row-major order.
    pub fn reachable(&self) -> impl Iterator<Item = (CellCoord, u16)> + '_ {
        let size = self.size.max(1);
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, distance)| **distance != u16::MAX)
            .map(move |(offset, distance)| {
                let offset = u32::try_from(offset).unwrap_or(u32::MAX);
                (CellCoord::new(offset % size, offset / size), *distance)
            })
    }

    /// Closest reached cell accepted by `predicate`, ties broken in row-major order.
    #[must_use]
    pub fn nearest<P>(&self, mut predicate: P) -> Option<CellCoord>
    where
        P: FnMut(CellCoord, u16) -> bool,
    {
        self.reachable()
            .filter(|(cell, distance)| predicate(*cell, *distance))
            .min_by_key(|(_, distance)| *distance)
            .map(|(cell, _)| cell)
    }
}

/// Reports whether `goal` can be reached from `start` without entering a blocked cell.
#[must_use]
pub fn is_reachable<F>(size: u32, start: CellCoord, goal: CellCoord, is_blocked: F) -> bool
where
    F: FnMut(CellCoord) -> bool,
{
    if start == goal {
        return index(size, start).is_some();
    }

    DistanceField::from_origin(size, start, is_blocked).is_reachable(goal)
}

/// Computes a shortest 4-connected path with A* and a Manhattan heuristic.
///
/// The returned path excludes `start` and ends at `goal`. It is empty when
/// the goal is unreachable, blocked, outside the grid, or equal to `start`.
#[must_use]
pub fn find_path<F>(size: u32, start: CellCoord, goal: CellCoord, mut is_blocked: F) -> Vec<CellCoord>
where
    F: FnMut(CellCoord) -> bool,
{
    let (Some(start_index), Some(goal_index)) = (index(size, start), index(size, goal)) else {
        return Vec::new();
    };

    if start_index == goal_index || is_blocked(goal) {
        return Vec::new();
    }

    let width = usize::try_from(size).unwrap_or(0);
    let cell_count = width.checked_mul(width).unwrap_or(0);

    let mut g_scores = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open = BinaryHeap::new();

    g_scores[start_index] = 0;
    let heuristic = start.manhattan_distance(goal);
    open.push(Reverse(OpenNode {
        f_score: heuristic,
        h_score: heuristic,
        cell: start,
    }));

    let mut expansions = 0usize;

    while let Some(Reverse(node)) = open.pop() {
        let Some(current_index) = index(size, node.cell) else {
            continue;
        };

        if closed[current_index] {
            continue;
        }

        if current_index == goal_index {
            return reconstruct_path(&came_from, size, start, goal);
        }

        closed[current_index] = true;
        expansions += 1;
        if expansions > cell_count {
            break;
        }

        let next_g = g_scores[current_index].saturating_add(1);

        for neighbor in neighbors(node.cell, size) {
            let Some(neighbor_index) = index(size, neighbor) else {
                continue;
            };

            if closed[neighbor_index] || next_g >= g_scores[neighbor_index] {
                continue;
            }

            if is_blocked(neighbor) {
                continue;
            }

            g_scores[neighbor_index] = next_g;
            came_from[neighbor_index] = Some(node.cell);
            let h_score = neighbor.manhattan_distance(goal);
            open.push(Reverse(OpenNode {
                f_score: next_g.saturating_add(h_score),
                h_score,
                cell: neighbor,
            }));
        }
    }

    Vec::new()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f_score: u32,
    h_score: u32,
    cell: CellCoord,
}

fn reconstruct_path(
    came_from: &[Option<CellCoord>],
    size: u32,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        let Some(previous) = index(size, current).and_then(|offset| came_from[offset]) else {
            return Vec::new();
        };

        if previous != start {
            path.push(previous);
        }

        if path.len() > came_from.len() {
            return Vec::new();
        }

        current = previous;
    }

    path.reverse();
    path
}

fn neighbors(cell: CellCoord, size: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(column) = cell.column().checked_add(1) {
        if column < size {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < size {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(size: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= size || cell.row() >= size {
        return None;
    }

    let width = usize::try_from(size).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_field_sets_origin_to_zero() {
        let field = DistanceField::from_origin(4, CellCoord::new(1, 2), |_| false);

        assert_eq!(field.distance(CellCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(3));
        assert_eq!(field.distance(CellCoord::new(4, 0)), None);
    }

    #[test]
    fn distance_field_respects_walls() {
        let wall = CellCoord::new(1, 1);
        let field = DistanceField::from_origin(4, CellCoord::new(1, 2), |cell| cell == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn blocked_origin_still_expands() {
        let origin = CellCoord::new(0, 0);
        let field = DistanceField::from_origin(3, origin, |cell| cell == origin);

        assert_eq!(field.distance(origin), Some(0));
        assert_eq!(field.distance(CellCoord::new(2, 2)), Some(4));
    }

    #[test]
    fn nearest_prefers_smallest_distance() {
        let field = DistanceField::from_origin(5, CellCoord::new(2, 2), |_| false);
        let found = field.nearest(|cell, _| cell.row() == 0 || cell.row() == 4);

        assert_eq!(found, Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn find_path_walks_around_obstacles() {
        let walls = [CellCoord::new(1, 0), CellCoord::new(1, 1)];
        let path = find_path(3, CellCoord::new(0, 0), CellCoord::new(2, 0), |cell| {
            walls.contains(&cell)
        });

        assert_eq!(
            path,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
                CellCoord::new(1, 2),
                CellCoord::new(2, 2),
                CellCoord::new(2, 1),
                CellCoord::new(2, 0),
            ]
        );
    }

    #[test]
    fn find_path_is_empty_without_route() {
        let walls = [CellCoord::new(1, 0), CellCoord::new(1, 1), CellCoord::new(1, 2)];
        let path = find_path(3, CellCoord::new(0, 0), CellCoord::new(2, 0), |cell| {
            walls.contains(&cell)
        });

        assert!(path.is_empty());
        assert!(!is_reachable(3, CellCoord::new(0, 0), CellCoord::new(2, 0), |cell| {
            walls.contains(&cell)
        }));
    }

    #[test]
    fn find_path_to_self_is_empty() {
        let cell = CellCoord::new(1, 1);
        assert!(find_path(3, cell, cell, |_| false).is_empty());
        assert!(is_reachable(3, cell, cell, |_| false));
    }

    #[test]
    fn find_path_refuses_blocked_goal() {
        let goal = CellCoord::new(2, 2);
        assert!(find_path(3, CellCoord::new(0, 0), goal, |cell| cell == goal).is_empty());
    }
}
