//! Threat assessment shared by every enemy brain.
//!
//! A tile is *dangerous* when a live explosion covers it or a bomb close to
//! detonation reaches it along an unobstructed line. The danger score blends
//! bomb timers and distances into a single value in `[0, 1]`.

use bomber_core::{ArenaView, BombSnapshot, CellCoord};
use bomber_world::{blast, navigation::DistanceField, BOMB_FUSE_TICKS};

/// Bombs at or below this timer mark their footprint as dangerous.
pub const IMMINENT_TIMER: u32 = 60;
/// Bombs at or below this timer contribute to the danger score.
pub const DANGER_HORIZON: u32 = 90;

/// Dense per-tile flags marking lethal or soon-to-be lethal tiles.
#[derive(Clone, Debug)]
pub struct DangerMap {
    size: u32,
    flags: Vec<bool>,
}

impl DangerMap {
    /// Flags explosions and the footprints of imminent bombs.
    #[must_use]
    pub fn imminent(view: &ArenaView<'_>) -> Self {
        Self::build(view, |bomb| bomb.timer <= IMMINENT_TIMER)
    }

    /// Flags explosions and the footprints of every bomb accepted by `include`.
    #[must_use]
    pub fn build<F>(view: &ArenaView<'_>, mut include: F) -> Self
    where
        F: FnMut(&BombSnapshot) -> bool,
    {
        let tiles = view.tiles();
        let size = tiles.size();
        let mut map = Self {
            size,
            flags: vec![false; (size as usize) * (size as usize)],
        };

        for explosion in view.explosions() {
            map.flag(explosion.cell);
        }

        for bomb in view.bombs().iter().filter(|bomb| include(bomb)) {
            for cell in blast::footprint(tiles, bomb.cell, bomb.range) {
                map.flag(cell);
            }
        }

        map
    }

    /// Whether the tile is flagged. Cells outside the grid are never dangerous.
    #[must_use]
    pub fn is_dangerous(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.flags.get(index).copied())
            .unwrap_or(false)
    }

    fn flag(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.flags.get_mut(index)) {
            *slot = true;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.size && cell.row() < self.size {
            Some(cell.row() as usize * self.size as usize + cell.column() as usize)
        } else {
            None
        }
    }
}

/// Normalised estimate of imminent harm at `cell`.
///
/// Standing on a dangerous tile saturates the score at `1.0`. Otherwise every
/// bomb within the horizon whose blast radius, padded by one tile, reaches the
/// cell contributes `time_factor * distance_factor`, and the maximum wins.
#[must_use]
pub fn danger_score(view: &ArenaView<'_>, map: &DangerMap, cell: CellCoord) -> f32 {
    if map.is_dangerous(cell) {
        return 1.0;
    }

    view.bombs()
        .iter()
        .filter(|bomb| bomb.timer <= DANGER_HORIZON)
        .filter_map(|bomb| {
            let distance = bomb.cell.manhattan_distance(cell);
            let reach = bomb.range + 1;
            if distance > reach {
                return None;
            }

            let time_factor = 1.0 - bomb.timer as f32 / DANGER_HORIZON as f32;
            let distance_factor = 1.0 - distance as f32 / reach as f32;
            Some(time_factor * distance_factor)
        })
        .fold(0.0, f32::max)
}

/// Finds the nearest tile an agent could flee to after bombing `origin`.
///
/// The search walks open, bomb-free tiles that are not currently dangerous,
/// including tiles inside the simulated footprint. The destination must lie
/// within `max_steps` moves, outside that footprint and outside the footprint
/// of every live bomb due to detonate no later than a freshly placed one.
/// Returns `None` when a bomb already occupies `origin` or no such tile
/// exists, in which case the placement must be refused.
#[must_use]
pub fn escape_route(
    view: &ArenaView<'_>,
    map: &DangerMap,
    origin: CellCoord,
    range: u32,
    max_steps: u32,
) -> Option<CellCoord> {
    if view.has_bomb(origin) {
        return None;
    }

    let tiles = view.tiles();
    let footprint = blast::footprint(tiles, origin, range);
    let field = DistanceField::from_origin(tiles.size(), origin, |cell| {
        !view.is_walkable(cell) || map.is_dangerous(cell)
    });

    let earlier: Vec<&BombSnapshot> = view
        .bombs()
        .iter()
        .filter(|bomb| bomb.timer <= BOMB_FUSE_TICKS)
        .collect();

    field.nearest(|cell, distance| {
        u32::from(distance) <= max_steps
            && !footprint.contains(&cell)
            && !earlier
                .iter()
                .any(|bomb| blast::covers(tiles, bomb.cell, bomb.range, cell))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_core::{
        ActorRef, BombId, BombType, ExplosionSnapshot, PlayerSnapshot, TileKind, TileView,
    };

    fn open(size: u32) -> Vec<TileKind> {
        (0..size * size)
            .map(|index| {
                let (column, row) = (index % size, index / size);
                if column == 0 || row == 0 || column + 1 == size || row + 1 == size {
                    TileKind::Wall
                } else {
                    TileKind::Empty
                }
            })
            .collect()
    }

    fn bomb(cell: CellCoord, timer: u32) -> BombSnapshot {
        BombSnapshot {
            id: BombId::new(0),
            owner: ActorRef::Player,
            cell,
            kind: BombType::Fire,
            timer,
            range: 2,
            remote: false,
        }
    }

    fn view<'a>(tiles: &'a [TileKind], size: u32, bombs: Vec<BombSnapshot>) -> ArenaView<'a> {
        ArenaView::new(
            TileView::new(tiles, size),
            bombs,
            Vec::new(),
            Vec::new(),
            PlayerSnapshot::default(),
            Vec::new(),
        )
    }

    #[test]
    fn imminent_bombs_flag_their_footprint() {
        let tiles = open(9);
        let arena = view(&tiles, 9, vec![bomb(CellCoord::new(4, 4), IMMINENT_TIMER)]);
        let map = DangerMap::imminent(&arena);

        assert!(map.is_dangerous(CellCoord::new(4, 4)));
        assert!(map.is_dangerous(CellCoord::new(6, 4)));
        assert!(!map.is_dangerous(CellCoord::new(7, 4)));
        assert!(!map.is_dangerous(CellCoord::new(5, 5)));
        assert!(!map.is_dangerous(CellCoord::new(40, 40)));
    }

    #[test]
    fn distant_fuses_are_not_dangerous() {
        let tiles = open(9);
        let arena = view(&tiles, 9, vec![bomb(CellCoord::new(4, 4), IMMINENT_TIMER + 1)]);
        let map = DangerMap::imminent(&arena);

        assert!(!map.is_dangerous(CellCoord::new(4, 4)));
    }

    #[test]
    fn explosions_are_dangerous() {
        let tiles = open(7);
        let arena = ArenaView::new(
            TileView::new(&tiles, 7),
            Vec::new(),
            vec![ExplosionSnapshot {
                cell: CellCoord::new(2, 2),
                kind: BombType::Ice,
                remaining: 5,
            }],
            Vec::new(),
            PlayerSnapshot::default(),
            Vec::new(),
        );
        let map = DangerMap::imminent(&arena);

        assert!(map.is_dangerous(CellCoord::new(2, 2)));
        assert_eq!(danger_score(&arena, &map, CellCoord::new(2, 2)), 1.0);
    }

    #[test]
    fn score_blends_time_and_distance() {
        let tiles = open(9);
        let arena = view(&tiles, 9, vec![bomb(CellCoord::new(4, 4), 75)]);
        let map = DangerMap::imminent(&arena);

        let near = danger_score(&arena, &map, CellCoord::new(4, 5));
        let far = danger_score(&arena, &map, CellCoord::new(4, 7));
        let off = danger_score(&arena, &map, CellCoord::new(1, 1));

        assert!(near > 0.0 && near < 1.0);
        assert!((near - (1.0 - 75.0 / 90.0) * (1.0 - 1.0 / 3.0)).abs() < 1e-6);
        assert_eq!(far, 0.0);
        assert_eq!(off, 0.0);
    }

    #[test]
    fn escape_route_leaves_the_footprint() {
        let tiles = open(9);
        let arena = view(&tiles, 9, Vec::new());
        let map = DangerMap::imminent(&arena);
        let origin = CellCoord::new(4, 4);

        let refuge = escape_route(&arena, &map, origin, 2, 3).expect("open arena has refuges");
        assert_eq!(refuge.manhattan_distance(origin), 2);
        assert!(!refuge.is_aligned_with(origin));
    }

    #[test]
    fn dead_end_corridor_refuses_the_gate() {
        let mut tiles = vec![TileKind::Wall; 49];
        for column in 1..6 {
            tiles[3 * 7 + column] = TileKind::Empty;
        }
        let arena = view(&tiles, 7, Vec::new());
        let map = DangerMap::imminent(&arena);

        assert_eq!(escape_route(&arena, &map, CellCoord::new(1, 3), 2, 2), None);
        assert_eq!(
            escape_route(&arena, &map, CellCoord::new(1, 3), 2, 3),
            Some(CellCoord::new(4, 3))
        );
        assert_eq!(escape_route(&arena, &map, CellCoord::new(1, 3), 4, 3), None);
    }

    #[test]
    fn refuge_avoids_bombs_due_before_the_new_one() {
        let tiles = open(9);
        let arena = view(
            &tiles,
            9,
            vec![bomb(CellCoord::new(3, 3), 100), bomb(CellCoord::new(5, 5), 100)],
        );
        let map = DangerMap::imminent(&arena);
        let origin = CellCoord::new(4, 4);

        assert_eq!(escape_route(&arena, &map, origin, 2, 2), None);
        let refuge = escape_route(&arena, &map, origin, 2, 3).expect("clear tiles three steps out");
        assert_eq!(refuge.manhattan_distance(origin), 3);
        for bomb in arena.bombs() {
            assert!(!blast::covers(arena.tiles(), bomb.cell, bomb.range, refuge));
        }
    }

    #[test]
    fn remote_bombs_do_not_restrict_the_refuge() {
        let tiles = open(9);
        let arena = view(
            &tiles,
            9,
            vec![BombSnapshot {
                timer: BOMB_FUSE_TICKS + 60,
                remote: true,
                ..bomb(CellCoord::new(3, 3), 0)
            }],
        );
        let map = DangerMap::imminent(&arena);

        let refuge = escape_route(&arena, &map, CellCoord::new(4, 4), 2, 3).expect("refuge exists");
        assert_eq!(refuge.manhattan_distance(CellCoord::new(4, 4)), 2);
    }

    #[test]
    fn occupied_origin_refuses_the_gate() {
        let tiles = open(9);
        let origin = CellCoord::new(4, 4);
        let arena = view(&tiles, 9, vec![bomb(origin, 120)]);
        let map = DangerMap::imminent(&arena);

        assert_eq!(escape_route(&arena, &map, origin, 2, 3), None);
    }
}
