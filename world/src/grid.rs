//! Tile matrix storage and level generation.

use bomber_core::{ArenaLayout, BombType, CellCoord, DifficultyProfile, TileKind, TileView};
use rand::{seq::SliceRandom, Rng};
use rand_chacha::ChaCha8Rng;

use crate::hazards::Skill;

const DESTRUCTIBLE_ATTEMPTS_PER_WALL: usize = 32;
const SKILL_ATTEMPTS: usize = 100;
const SPAWN_ATTEMPTS: usize = 100;
const SPAWN_MARGIN: u32 = 3;
const PLAYER_CORNER: u32 = 2;

/// Spawn tile of the player on every level.
pub(crate) const PLAYER_SPAWN: CellCoord = CellCoord::new(1, 1);

/// Dense row-major square tile matrix.
#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    size: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Lays the fixed border ring and even-coordinate lattice of walls.
    pub(crate) fn with_fixed_walls(size: u32) -> Self {
        let capacity = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        let mut tiles = Vec::with_capacity(capacity);
        for row in 0..size {
            for column in 0..size {
                tiles.push(if is_fixed_wall(size, CellCoord::new(column, row)) {
                    TileKind::Wall
                } else {
                    TileKind::Empty
                });
            }
        }
        Self { size, tiles }
    }

    pub(crate) fn from_layout(layout: &ArenaLayout) -> Self {
        Self {
            size: layout.size(),
            tiles: layout.tiles().to_vec(),
        }
    }

    pub(crate) const fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn view(&self) -> TileView<'_> {
        TileView::new(&self.tiles, self.size)
    }

    pub(crate) fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.view().kind(cell)
    }

    /// Replaces a tile, returning the previous kind.
    pub(crate) fn set(&mut self, cell: CellCoord, kind: TileKind) -> Option<TileKind> {
        let index = self.index(cell)?;
        let slot = self.tiles.get_mut(index)?;
        Some(std::mem::replace(slot, kind))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.size && cell.row() < self.size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Freshly generated level contents.
#[derive(Debug)]
pub(crate) struct GeneratedLevel {
    pub(crate) grid: TileGrid,
    pub(crate) skills: Vec<Skill>,
}

/// Generates a level: fixed walls, destructible walls, then hidden skills.
pub(crate) fn generate(
    size: u32,
    profile: &DifficultyProfile,
    rng: &mut ChaCha8Rng,
) -> GeneratedLevel {
    let mut grid = TileGrid::with_fixed_walls(size);
    let target = profile.destructible_target();
    let placed = place_destructibles(&mut grid, target, rng);
    if placed < target {
        tracing::warn!(
            placed,
            target,
            "destructible wall budget exhausted; level has fewer walls than requested"
        );
    }

    let skills = seed_skills(&grid, profile.skill_count, rng);
    tracing::debug!(size, walls = placed, skills = skills.len(), "generated level");

    GeneratedLevel { grid, skills }
}

fn place_destructibles(grid: &mut TileGrid, target: usize, rng: &mut ChaCha8Rng) -> usize {
    let size = grid.size();
    if size < 3 || target == 0 {
        return 0;
    }

    let budget = target.saturating_mul(DESTRUCTIBLE_ATTEMPTS_PER_WALL);
    let mut placed = 0;
    let mut attempts = 0;

    while placed < target && attempts < budget {
        attempts += 1;
        let cell = CellCoord::new(rng.gen_range(1..=size - 2), rng.gen_range(1..=size - 2));

        if in_player_corner(cell) || grid.kind(cell) != Some(TileKind::Empty) {
            continue;
        }

        let _ = grid.set(cell, TileKind::Destructible);
        placed += 1;
    }

    placed
}

fn seed_skills(grid: &TileGrid, count: u32, rng: &mut ChaCha8Rng) -> Vec<Skill> {
    let size = grid.size();
    let mut skills: Vec<Skill> = Vec::new();
    if size < 3 {
        return skills;
    }

    for _ in 0..count {
        for _ in 0..SKILL_ATTEMPTS {
            let cell = CellCoord::new(rng.gen_range(1..=size - 2), rng.gen_range(1..=size - 2));

            if grid.kind(cell) != Some(TileKind::Destructible)
                || skills.iter().any(|skill| skill.cell() == cell)
            {
                continue;
            }

            let kind = BombType::ALL
                .choose(rng)
                .copied()
                .unwrap_or(BombType::Fire);
            skills.push(Skill::hidden(cell, kind));
            break;
        }
    }

    if skills.len() < count as usize {
        tracing::warn!(
            seeded = skills.len(),
            requested = count,
            "skill placement budget exhausted"
        );
    }

    skills
}

/// Picks an empty enemy spawn tile away from the player corner.
///
/// Random draws come first; when they all miss, the interior is scanned in
/// row-major order so a spawn is found whenever one exists.
pub(crate) fn enemy_spawn(grid: &TileGrid, rng: &mut ChaCha8Rng) -> Option<CellCoord> {
    let size = grid.size();
    let upper = size.checked_sub(2)?;

    if upper >= SPAWN_MARGIN {
        for _ in 0..SPAWN_ATTEMPTS {
            let cell = CellCoord::new(
                rng.gen_range(SPAWN_MARGIN..=upper),
                rng.gen_range(SPAWN_MARGIN..=upper),
            );
            if grid.kind(cell) == Some(TileKind::Empty) {
                return Some(cell);
            }
        }
    }

    let scan = |lower: u32| {
        (lower..=upper).flat_map(move |row| {
            (lower..=upper).map(move |column| CellCoord::new(column, row))
        })
    };

    scan(SPAWN_MARGIN)
        .chain(scan(1))
        .find(|cell| grid.kind(*cell) == Some(TileKind::Empty) && !in_player_corner(*cell))
}

fn is_fixed_wall(size: u32, cell: CellCoord) -> bool {
    let (column, row) = (cell.column(), cell.row());
    column == 0
        || row == 0
        || column + 1 == size
        || row + 1 == size
        || (column % 2 == 0 && row % 2 == 0)
}

fn in_player_corner(cell: CellCoord) -> bool {
    cell.column() <= PLAYER_CORNER && cell.row() <= PLAYER_CORNER
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_core::Difficulty;
    use rand::SeedableRng;

    #[test]
    fn fixed_walls_cover_border_and_lattice() {
        let grid = TileGrid::with_fixed_walls(7);

        assert_eq!(grid.kind(CellCoord::new(0, 3)), Some(TileKind::Wall));
        assert_eq!(grid.kind(CellCoord::new(6, 6)), Some(TileKind::Wall));
        assert_eq!(grid.kind(CellCoord::new(2, 2)), Some(TileKind::Wall));
        assert_eq!(grid.kind(CellCoord::new(4, 2)), Some(TileKind::Wall));
        assert_eq!(grid.kind(CellCoord::new(1, 2)), Some(TileKind::Empty));
        assert_eq!(grid.kind(CellCoord::new(3, 3)), Some(TileKind::Empty));
    }

    #[test]
    fn generation_keeps_player_corner_clear() {
        let profile = Difficulty::Hard.profile();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let level = generate(profile.grid_size, &profile, &mut rng);
            for cell in [
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(2, 1),
            ] {
                assert_eq!(level.grid.kind(cell), Some(TileKind::Empty));
            }
        }
    }

    #[test]
    fn skills_never_share_a_tile() {
        let profile = DifficultyProfile {
            skill_count: 40,
            ..Difficulty::Normal.profile()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let level = generate(profile.grid_size, &profile, &mut rng);

        for (index, skill) in level.skills.iter().enumerate() {
            assert!(level.skills[index + 1..]
                .iter()
                .all(|other| other.cell() != skill.cell()));
        }
    }

    #[test]
    fn exhausted_budget_degrades_gracefully() {
        let profile = DifficultyProfile {
            grid_size: 7,
            wall_percent: 1.0,
            skill_count: 100,
            ..Difficulty::Easy.profile()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let level = generate(7, &profile, &mut rng);

        let placed = level.grid.view().count(TileKind::Destructible);
        assert!(placed > 0);
        assert!(placed < profile.destructible_target());
        assert!(level.skills.len() <= level.grid.view().count(TileKind::Destructible));
    }

    #[test]
    fn enemy_spawn_falls_back_to_scan() {
        let mut grid = TileGrid::with_fixed_walls(7);
        for row in 1..6 {
            for column in 1..6 {
                let cell = CellCoord::new(column, row);
                if grid.kind(cell) == Some(TileKind::Empty) {
                    let _ = grid.set(cell, TileKind::Destructible);
                }
            }
        }
        let open = CellCoord::new(5, 3);
        let _ = grid.set(open, TileKind::Empty);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(enemy_spawn(&grid, &mut rng), Some(open));
    }

    #[test]
    fn enemy_spawn_is_none_when_full() {
        let mut grid = TileGrid::with_fixed_walls(5);
        for row in 1..4 {
            for column in 1..4 {
                let _ = grid.set(CellCoord::new(column, row), TileKind::Destructible);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(enemy_spawn(&grid, &mut rng), None);
    }
}
