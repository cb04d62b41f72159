use bomber_core::{Difficulty, Event, TileKind};
use bomber_system_enemy_ai::{Config as AiConfig, EnemyAi};
use bomber_system_session::Session;
use bomber_world::{self as world, query, World};

fn session(difficulty: Difficulty, seed: u64) -> Session {
    Session::new(
        World::new(world::Config::new(difficulty).with_rng_seed(seed)),
        EnemyAi::new(AiConfig::new(difficulty).with_rng_seed(seed)),
    )
}

#[test]
fn idle_player_sessions_keep_the_arena_consistent() {
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
        for seed in 0..4 {
            let mut session = session(difficulty, seed);
            let mut last_score = 0;
            let mut events = Vec::new();

            for _ in 0..1_500 {
                events.clear();
                session.step(&mut events);

                let world = session.world();
                let tiles = query::tile_view(world);
                let view = query::arena_view(world);

                for enemy in view.enemies() {
                    assert_eq!(
                        tiles.kind(enemy.cell),
                        Some(TileKind::Empty),
                        "{difficulty:?}/{seed}: enemy {enemy:?} left the floor"
                    );
                }
                for bomb in view.bombs() {
                    assert!(bomb.timer > 0, "{difficulty:?}/{seed}: stale bomb {bomb:?}");
                }

                let score = query::score(world);
                assert!(score >= last_score, "{difficulty:?}/{seed}: score went backwards");
                last_score = score;

                let brains: Vec<_> = session.ai().enemies().collect();
                assert_eq!(brains, query::enemy_ids(world), "{difficulty:?}/{seed}");

                if session.is_over() {
                    break;
                }
            }
        }
    }
}

#[test]
fn enemies_bomb_their_way_through_the_arena() {
    let mut session = session(Difficulty::Hard, 12);
    let mut events = Vec::new();
    for _ in 0..1_200 {
        session.step(&mut events);
    }

    let enemy_bombs = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::BombPlaced {
                    owner: bomber_core::ActorRef::Enemy(_),
                    ..
                }
            )
        })
        .count();
    let walls_destroyed = events
        .iter()
        .filter(|event| matches!(event, Event::TileDestroyed { .. }))
        .count();

    assert!(enemy_bombs > 0);
    assert!(walls_destroyed > 0);
}

#[test]
fn finished_game_stops_the_clock() {
    let mut session = session(Difficulty::Hard, 5);
    let mut events = Vec::new();
    for _ in 0..10_000 {
        if session.is_over() {
            break;
        }
        session.step(&mut events);
    }

    if session.is_over() {
        let tick = query::tick_index(session.world());
        events.clear();
        session.step(&mut events);
        assert!(events.is_empty());
        assert_eq!(query::tick_index(session.world()), tick);
    }
}
