//! Scripted stand-in for a human player.

use bomber_core::{ActorRef, ArenaView, CellCoord, Command, Direction};
use bomber_system_enemy_ai::danger::{escape_route, DangerMap, DANGER_HORIZON};
use bomber_world::{
    blast,
    navigation::{self, DistanceField},
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MOVE_INTERVAL: u32 = 10;
const BOOSTED_MOVE_INTERVAL: u32 = 6;
const SLOWED_MOVE_INTERVAL: u32 = 16;
const ESCAPE_STEPS: u32 = 8;

/// Player bot that bombs walls and enemies and flees its own blasts.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    countdown: u32,
}

impl Autopilot {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng, countdown: 0 }
    }

    /// Emits at most one player command for the current tick.
    pub(crate) fn decide(
        &mut self,
        view: &ArenaView<'_>,
        remote_bombs: &[CellCoord],
        out: &mut Vec<Command>,
    ) {
        if self.countdown > 0 {
            self.countdown -= 1;
            return;
        }

        let player = view.player();
        let map = DangerMap::imminent(view);
        let threats = DangerMap::build(view, |bomb| {
            bomb.timer <= DANGER_HORIZON || bomb.owner == ActorRef::Player
        });

        let command = if !remote_bombs.is_empty() && !threats.is_dangerous(player.cell) {
            Some(Command::DetonateRemoteBombs)
        } else if threats.is_dangerous(player.cell) {
            self.flee(view, &threats)
        } else if self.worth_bombing(view, &map) {
            Some(Command::PlacePlayerBomb)
        } else {
            self.advance(view, &map)
        };

        if let Some(command) = command {
            tracing::trace!(?command, cell = ?player.cell, "autopilot acting");
            out.push(command);
        }

        self.countdown = match player.speed_boost {
            boost if boost > 0 => BOOSTED_MOVE_INTERVAL,
            boost if boost < 0 => SLOWED_MOVE_INTERVAL,
            _ => MOVE_INTERVAL,
        };
    }

    fn worth_bombing(&self, view: &ArenaView<'_>, map: &DangerMap) -> bool {
        let player = view.player();
        let live = view
            .bombs()
            .iter()
            .filter(|bomb| bomb.owner == ActorRef::Player)
            .count();
        if live >= player.max_bombs as usize {
            return false;
        }

        let tiles = view.tiles();
        let range = player.bomb_range + player.active_bomb_type.range_bonus();
        let enemy_in_line = view
            .enemies()
            .iter()
            .any(|enemy| blast::covers(tiles, player.cell, range, enemy.cell));
        let wall_nearby = tiles.adjacent_destructible(player.cell) > 0;

        (enemy_in_line || wall_nearby)
            && escape_route(view, map, player.cell, range, ESCAPE_STEPS).is_some()
    }

    fn flee(&self, view: &ArenaView<'_>, threats: &DangerMap) -> Option<Command> {
        let origin = view.player().cell;
        let field = DistanceField::from_origin(view.tiles().size(), origin, |cell| {
            !view.is_walkable(cell)
        });
        let refuge = field.nearest(|cell, _| !threats.is_dangerous(cell))?;
        self.walk_toward(view, origin, refuge, None)
    }

    fn advance(&mut self, view: &ArenaView<'_>, map: &DangerMap) -> Option<Command> {
        let origin = view.player().cell;
        let tiles = view.tiles();
        let field = DistanceField::from_origin(tiles.size(), origin, |cell| {
            !view.is_walkable(cell) || map.is_dangerous(cell)
        });

        let goal = field
            .nearest(|cell, distance| distance > 0 && view.has_power_up(cell))
            .or_else(|| {
                field.nearest(|cell, distance| {
                    distance > 0 && tiles.adjacent_destructible(cell) > 0
                })
            })
            .or_else(|| {
                view.enemies()
                    .iter()
                    .map(|enemy| enemy.cell)
                    .filter(|cell| field.is_reachable(*cell))
                    .min_by_key(|cell| origin.manhattan_distance(*cell))
            });

        match goal {
            Some(goal) => self.walk_toward(view, origin, goal, Some(map)),
            None => self.random_step(view, origin, map),
        }
    }

    fn walk_toward(
        &self,
        view: &ArenaView<'_>,
        origin: CellCoord,
        goal: CellCoord,
        avoid: Option<&DangerMap>,
    ) -> Option<Command> {
        let path = navigation::find_path(view.tiles().size(), origin, goal, |cell| {
            !view.is_walkable(cell)
        });
        let next = path.first().copied()?;
        if avoid.is_some_and(|map| map.is_dangerous(next)) {
            return None;
        }

        origin
            .direction_to(next)
            .map(|direction| Command::MovePlayer { direction })
    }

    fn random_step(
        &mut self,
        view: &ArenaView<'_>,
        origin: CellCoord,
        map: &DangerMap,
    ) -> Option<Command> {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);
        directions
            .into_iter()
            .find(|direction| {
                origin
                    .step(*direction)
                    .is_some_and(|cell| view.is_walkable(cell) && !map.is_dangerous(cell))
            })
            .map(|direction| Command::MovePlayer { direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_core::ArenaLayout;
    use bomber_world::{self as world, query, World};

    fn loaded(rows: &[&str]) -> World {
        let mut world = World::new(world::Config::default().with_rng_seed(0));
        let mut events = Vec::new();
        let layout = ArenaLayout::parse(rows).expect("valid layout");
        world::apply(&mut world, Command::LoadLayout { layout }, &mut events);
        world
    }

    #[test]
    fn bombs_adjacent_wall_when_a_refuge_exists() {
        let world = loaded(&[
            "#######", //
            "#P+...#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let mut autopilot = Autopilot::new(Some(1));
        let mut out = Vec::new();
        autopilot.decide(&query::arena_view(&world), &[], &mut out);

        assert_eq!(out, vec![Command::PlacePlayerBomb]);
    }

    #[test]
    fn flees_own_bomb() {
        let mut world = loaded(&[
            "#######", //
            "#P+...#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let mut events = Vec::new();
        world::apply(&mut world, Command::PlacePlayerBomb, &mut events);

        let mut autopilot = Autopilot::new(Some(1));
        let mut out = Vec::new();
        autopilot.decide(&query::arena_view(&world), &[], &mut out);

        assert_eq!(
            out,
            vec![Command::MovePlayer {
                direction: Direction::South
            }]
        );
    }

    #[test]
    fn triggers_remote_bombs_from_safety() {
        let world = loaded(&[
            "#######", //
            "#P....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let mut autopilot = Autopilot::new(Some(1));
        let mut out = Vec::new();
        autopilot.decide(
            &query::arena_view(&world),
            &[CellCoord::new(5, 5)],
            &mut out,
        );

        assert_eq!(out, vec![Command::DetonateRemoteBombs]);
    }

    #[test]
    fn acts_at_walking_pace() {
        let world = loaded(&[
            "#######", //
            "#P....#", //
            "#.....#", //
            "#...E.#", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let view = query::arena_view(&world);
        let mut autopilot = Autopilot::new(Some(3));
        let mut out = Vec::new();

        for _ in 0..=MOVE_INTERVAL + 1 {
            autopilot.decide(&view, &[], &mut out);
        }
        assert_eq!(out.len(), 2);
    }
}
