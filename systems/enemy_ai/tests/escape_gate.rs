use std::collections::VecDeque;

use bomber_core::{
    ActorRef, ArenaView, BombId, BombSnapshot, BombType, CellCoord, ExplosionSnapshot,
    PlayerSnapshot, TileKind, TileView,
};
use bomber_system_enemy_ai::danger::{escape_route, DangerMap, IMMINENT_TIMER};
use bomber_world::{blast, BOMB_FUSE_TICKS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: u32 = 13;

struct Scenario {
    tiles: Vec<TileKind>,
    bombs: Vec<BombSnapshot>,
    explosions: Vec<ExplosionSnapshot>,
}

fn scenario(rng: &mut ChaCha8Rng) -> Scenario {
    let tiles: Vec<TileKind> = (0..SIZE * SIZE)
        .map(|index| {
            let (column, row) = (index % SIZE, index / SIZE);
            let fixed = column == 0
                || row == 0
                || column + 1 == SIZE
                || row + 1 == SIZE
                || (column % 2 == 0 && row % 2 == 0);
            if fixed {
                TileKind::Wall
            } else if rng.gen_bool(0.3) {
                TileKind::Destructible
            } else {
                TileKind::Empty
            }
        })
        .collect();

    let mut bombs = Vec::new();
    for id in 0..rng.gen_range(0..4) {
        let cell = CellCoord::new(rng.gen_range(1..SIZE - 1), rng.gen_range(1..SIZE - 1));
        if tiles[(cell.row() * SIZE + cell.column()) as usize] == TileKind::Empty {
            bombs.push(BombSnapshot {
                id: BombId::new(id),
                owner: ActorRef::Player,
                cell,
                kind: BombType::Fire,
                timer: rng.gen_range(1..=120),
                range: rng.gen_range(1..=3),
                remote: false,
            });
        }
    }

    let explosions = (0..rng.gen_range(0..3))
        .map(|_| ExplosionSnapshot {
            cell: CellCoord::new(rng.gen_range(1..SIZE - 1), rng.gen_range(1..SIZE - 1)),
            kind: BombType::Fire,
            remaining: 10,
        })
        .collect();

    Scenario {
        tiles,
        bombs,
        explosions,
    }
}

fn view(scenario: &Scenario) -> ArenaView<'_> {
    ArenaView::new(
        TileView::new(&scenario.tiles, SIZE),
        scenario.bombs.clone(),
        scenario.explosions.clone(),
        Vec::new(),
        PlayerSnapshot::default(),
        Vec::new(),
    )
}

fn is_dangerous(view: &ArenaView<'_>, cell: CellCoord) -> bool {
    view.has_explosion(cell)
        || view.bombs().iter().any(|bomb| {
            bomb.timer <= IMMINENT_TIMER
                && view.tiles().is_empty(cell)
                && blast::covers(view.tiles(), bomb.cell, bomb.range, cell)
        })
}

fn detonates_first(view: &ArenaView<'_>, cell: CellCoord) -> bool {
    view.bombs().iter().any(|bomb| {
        bomb.timer <= BOMB_FUSE_TICKS && blast::covers(view.tiles(), bomb.cell, bomb.range, cell)
    })
}

/// Plain breadth-first search under the same exclusion rules as the gate.
fn brute_force(view: &ArenaView<'_>, origin: CellCoord, range: u32, budget: u32) -> bool {
    if view.has_bomb(origin) {
        return false;
    }

    let footprint = blast::footprint(view.tiles(), origin, range);
    let mut seen = vec![false; (SIZE * SIZE) as usize];
    let mut queue = VecDeque::from([(origin, 0u32)]);
    seen[(origin.row() * SIZE + origin.column()) as usize] = true;

    while let Some((cell, distance)) = queue.pop_front() {
        if distance <= budget && !footprint.contains(&cell) && !detonates_first(view, cell) {
            return true;
        }
        if distance == budget {
            continue;
        }

        for next in view.tiles().neighbors(cell) {
            let index = (next.row() * SIZE + next.column()) as usize;
            if seen[index] || !view.is_walkable(next) || is_dangerous(view, next) {
                continue;
            }
            seen[index] = true;
            queue.push_back((next, distance + 1));
        }
    }

    false
}

#[test]
fn gate_agrees_with_breadth_first_search() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let mut approvals = 0;
    let mut refusals = 0;

    for _ in 0..300 {
        let scenario = scenario(&mut rng);
        let view = view(&scenario);
        let map = DangerMap::imminent(&view);

        let origin = loop {
            let cell = CellCoord::new(rng.gen_range(1..SIZE - 1), rng.gen_range(1..SIZE - 1));
            if view.tiles().is_empty(cell) {
                break cell;
            }
        };
        let range = rng.gen_range(1..=3);
        let budget = rng.gen_range(1..=4);

        let gate = escape_route(&view, &map, origin, range, budget);
        let expected = brute_force(&view, origin, range, budget);
        assert_eq!(gate.is_some(), expected, "origin {origin:?} range {range} budget {budget}");

        if let Some(refuge) = gate {
            approvals += 1;
            assert!(view.is_walkable(refuge));
            assert!(!map.is_dangerous(refuge));
            assert!(!blast::footprint(view.tiles(), origin, range).contains(&refuge));
            assert!(!detonates_first(&view, refuge));
        } else {
            refusals += 1;
        }
    }

    assert!(approvals > 0 && refusals > 0);
}
