use bomber_core::{CellCoord, TileKind};
use bomber_world::navigation::{find_path, is_reachable, DistanceField};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: u32 = 15;

fn random_grid(rng: &mut ChaCha8Rng) -> Vec<TileKind> {
    (0..SIZE * SIZE)
        .map(|index| {
            let (column, row) = (index % SIZE, index / SIZE);
            let border = column == 0 || row == 0 || column + 1 == SIZE || row + 1 == SIZE;
            if border || rng.gen_bool(0.3) {
                TileKind::Wall
            } else {
                TileKind::Empty
            }
        })
        .collect()
}

fn blocked(tiles: &[TileKind]) -> impl Fn(CellCoord) -> bool + '_ {
    move |cell| tiles[(cell.row() * SIZE + cell.column()) as usize] != TileKind::Empty
}

fn random_open_cell(tiles: &[TileKind], rng: &mut ChaCha8Rng) -> CellCoord {
    loop {
        let cell = CellCoord::new(rng.gen_range(1..SIZE - 1), rng.gen_range(1..SIZE - 1));
        if !blocked(tiles)(cell) {
            return cell;
        }
    }
}

#[test]
fn a_star_matches_breadth_first_distances() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let tiles = random_grid(&mut rng);
    let mut compared = 0;
    let mut unreachable = 0;

    while compared < 100 {
        let start = random_open_cell(&tiles, &mut rng);
        let goal = random_open_cell(&tiles, &mut rng);
        if start == goal {
            continue;
        }

        let field = DistanceField::from_origin(SIZE, start, blocked(&tiles));
        let path = find_path(SIZE, start, goal, blocked(&tiles));

        let Some(distance) = field.distance(goal) else {
            assert!(path.is_empty(), "{start:?} -> {goal:?}");
            assert!(!is_reachable(SIZE, start, goal, blocked(&tiles)));
            unreachable += 1;
            assert!(unreachable < 10_000, "grid too fragmented to sample pairs");
            continue;
        };

        assert_eq!(path.len(), usize::from(distance), "{start:?} -> {goal:?}");
        assert_eq!(path.last(), Some(&goal));

        let mut previous = start;
        for cell in &path {
            assert_eq!(previous.manhattan_distance(*cell), 1);
            assert!(!blocked(&tiles)(*cell));
            previous = *cell;
        }
        assert!(is_reachable(SIZE, start, goal, blocked(&tiles)));
        compared += 1;
    }
}

#[test]
fn nearest_prefers_smallest_distance() {
    let tiles = random_grid(&mut ChaCha8Rng::seed_from_u64(7));
    let start = random_open_cell(&tiles, &mut ChaCha8Rng::seed_from_u64(8));
    let field = DistanceField::from_origin(SIZE, start, blocked(&tiles));

    let nearest = field.nearest(|cell, _| cell != start);
    if let Some(cell) = nearest {
        assert_eq!(field.distance(cell), Some(1));
    }
    assert_eq!(field.nearest(|cell, _| cell == start), Some(start));
}
