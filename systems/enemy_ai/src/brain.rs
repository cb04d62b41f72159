//! Per-agent finite state controller.

use bomber_core::{
    ActorRef, ArenaView, CellCoord, Command, Difficulty, EnemyId, EnemySnapshot,
};
use bomber_world::{blast, navigation};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{
    danger::{danger_score, escape_route, DangerMap, DANGER_HORIZON},
    personality::Personality,
    tactics,
};

const PATH_LIMIT: usize = 10;
const TRAP_ROUTES: usize = 2;
const TRAP_REACH: u32 = 2;
const HUNT_BOMB_CAP: f32 = 0.95;
const TRAP_BONUS: f32 = 0.3;
const WALLS_BONUS: f32 = 0.1;
const WALL_BOMB_STEP: f32 = 0.1;

/// Behaviour an enemy is currently committed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AiState {
    /// Roams toward power-ups and wall clusters, bombing walls on the way.
    #[default]
    Wander,
    /// Approaches the player or a rich bombing spot.
    Hunt,
    /// Flees toward the nearest safe tile.
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HuntGoal {
    Player,
    Cluster(CellCoord),
}

/// Tier-wide parameters shared by every brain.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tuning {
    pub(crate) difficulty: Difficulty,
    pub(crate) npc_bomb_chance: f32,
    pub(crate) decision_interval: u32,
    pub(crate) escape_steps: u32,
}

impl Tuning {
    fn hunt_bomb_base(&self) -> f32 {
        match self.difficulty {
            Difficulty::Easy => 0.3,
            Difficulty::Normal => 0.5,
            Difficulty::Hard => 0.8,
        }
    }

    fn wander_bomb_base(&self) -> f32 {
        match self.difficulty {
            Difficulty::Easy => 0.4,
            Difficulty::Normal => 0.7,
            Difficulty::Hard => 0.9,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Brain {
    id: EnemyId,
    personality: Personality,
    rng: ChaCha8Rng,
    state: AiState,
    hunt_goal: HuntGoal,
    countdown: u32,
    target: Option<CellCoord>,
    path: Vec<CellCoord>,
    bombs_placed: u32,
    successful_hits: u32,
}

impl Brain {
    pub(crate) fn new(id: EnemyId, personality: Personality, rng: ChaCha8Rng) -> Self {
        Self {
            id,
            personality,
            rng,
            state: AiState::Wander,
            hunt_goal: HuntGoal::Player,
            countdown: 0,
            target: None,
            path: Vec::new(),
            bombs_placed: 0,
            successful_hits: 0,
        }
    }

    pub(crate) const fn state(&self) -> AiState {
        self.state
    }

    pub(crate) const fn personality(&self) -> Personality {
        self.personality
    }

    /// Share of resolved bombs that struck the player.
    pub(crate) fn hit_ratio(&self) -> f32 {
        if self.bombs_placed == 0 {
            0.0
        } else {
            self.successful_hits as f32 / self.bombs_placed as f32
        }
    }

    pub(crate) fn record_detonation(&mut self, hit_player: bool) {
        self.bombs_placed = self.bombs_placed.saturating_add(1);
        if hit_player {
            self.successful_hits = self.successful_hits.saturating_add(1);
        }
    }

    pub(crate) fn forget_path(&mut self) {
        self.path.clear();
    }

    /// Runs one simulation tick; a decision is taken once per interval.
    pub(crate) fn think(&mut self, view: &ArenaView<'_>, tuning: &Tuning, out: &mut Vec<Command>) {
        let Some(me) = view.enemy(self.id).copied() else {
            return;
        };

        if self.countdown > 0 {
            self.countdown -= 1;
            return;
        }

        if me.frozen > 0 {
            return;
        }

        let map = DangerMap::imminent(view);
        self.update_state(view, &me, &map, tuning);

        match self.state {
            AiState::Wander => self.wander(view, &me, &map, tuning, out),
            AiState::Hunt => self.hunt(view, &me, &map, tuning, out),
            AiState::Escape => self.escape(view, &me, &map, out),
        }

        self.countdown = tuning.decision_interval.saturating_sub(1);
    }

    fn update_state(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, tuning: &Tuning) {
        let next = self.evaluate(view, me, map, tuning);
        if next != self.state {
            tracing::debug!(enemy = self.id.get(), from = ?self.state, to = ?next, "enemy state changed");
            self.state = next;
            self.target = None;
            self.path.clear();
        }
    }

    fn evaluate(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, tuning: &Tuning) -> AiState {
        if self.own_bomb_threatens(view, me) {
            return AiState::Escape;
        }

        let danger = danger_score(view, map, me.cell);
        tracing::trace!(enemy = self.id.get(), danger, caution = self.personality.caution(), "assessed danger");
        if danger > self.personality.caution() {
            return AiState::Escape;
        }

        let player = view.player();
        let distance = me.cell.manhattan_distance(player.cell);
        let range = tactics::hunt_range(tuning.difficulty, self.personality.intelligence());
        if range > 0 && distance <= range {
            let mut chance =
                self.personality.aggression() * (1.0 - distance as f32 / range as f32);
            if player.health < 3 {
                chance += 0.2;
            }
            if player.is_slowed() {
                chance += 0.15;
            }
            if player.shield {
                chance -= 0.2;
            }
            chance += self.hit_ratio() * 0.2;

            if self.rng.gen::<f32>() < chance {
                self.hunt_goal = HuntGoal::Player;
                return AiState::Hunt;
            }
        }

        if me.can_bomb() {
            if let Some(cell) = tactics::bombing_opportunity(view, me.cell) {
                self.hunt_goal = HuntGoal::Cluster(cell);
                return AiState::Hunt;
            }
        }

        AiState::Wander
    }

    /// Whether one of this agent's own live bombs reaches its tile.
    fn own_bomb_threatens(&self, view: &ArenaView<'_>, me: &EnemySnapshot) -> bool {
        let owner = ActorRef::Enemy(self.id);
        view.bombs()
            .iter()
            .filter(|bomb| bomb.owner == owner)
            .any(|bomb| blast::covers(view.tiles(), bomb.cell, bomb.range, me.cell))
    }

    fn wander(
        &mut self,
        view: &ArenaView<'_>,
        me: &EnemySnapshot,
        map: &DangerMap,
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        if self.wants_wall_bomb(view, me, map, tuning) {
            self.place_bomb(out);
            return;
        }

        match self.target {
            Some(target) if target != me.cell => {
                self.step_toward(view, me, map, out);
                return;
            }
            Some(_) => {
                self.target = None;
                self.path.clear();
            }
            None => {}
        }

        match tactics::wander_target(view, me.cell, tuning.difficulty, &mut self.rng) {
            Some(target) => {
                self.target = Some(target);
                self.plan(view, me.cell);
                self.step_toward(view, me, map, out);
            }
            None => self.random_walk(view, me, map, out),
        }
    }

    fn wants_wall_bomb(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, tuning: &Tuning) -> bool {
        if !me.can_bomb() {
            return false;
        }

        let walls = view.tiles().adjacent_destructible(me.cell);
        let chance = match walls {
            0 => return false,
            1 => tuning.npc_bomb_chance,
            _ => tuning.wander_bomb_base() + WALL_BOMB_STEP * walls as f32,
        };

        escape_route(view, map, me.cell, me.bomb_range, tuning.escape_steps).is_some()
            && self.rng.gen::<f32>() < chance
    }

    fn hunt(
        &mut self,
        view: &ArenaView<'_>,
        me: &EnemySnapshot,
        map: &DangerMap,
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        if self.should_place_bomb(view, me, map, tuning) {
            self.place_bomb(out);
            return;
        }

        let goal = match self.hunt_goal {
            HuntGoal::Cluster(cell) => cell,
            HuntGoal::Player => {
                tactics::predict_player(view, me.cell, tuning.difficulty, &mut self.rng)
                    .unwrap_or(view.player().cell)
            }
        };

        if goal == me.cell {
            self.target = None;
            self.path.clear();
            self.random_walk(view, me, map, out);
            return;
        }

        self.target = Some(goal);
        self.plan(view, me.cell);
        if self.path.is_empty() || self.path.len() > PATH_LIMIT {
            if let Some(cell) = tactics::intercept(view, me.cell, tuning.difficulty) {
                self.target = Some(cell);
                self.plan(view, me.cell);
            }
        }

        self.step_toward(view, me, map, out);
    }

    /// Decides whether bombing the current tile is worthwhile while hunting.
    ///
    /// A player in the blast line, nearby destructible walls or a player with
    /// at most two escape routes justify a bomb, but only once the escape gate
    /// has proved a refuge is reachable. A player in line is always bombed.
    fn should_place_bomb(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, tuning: &Tuning) -> bool {
        if !me.can_bomb() {
            return false;
        }

        let player = view.player().cell;
        let in_line = blast::covers(view.tiles(), me.cell, me.bomb_range, player);
        let walls = tactics::nearby_walls(view, me.cell);
        let trap = me.cell.manhattan_distance(player) <= me.bomb_range + TRAP_REACH
            && tactics::player_escape_routes(view, map) <= TRAP_ROUTES;

        if !(in_line || walls > 0 || trap) {
            return false;
        }

        if escape_route(view, map, me.cell, me.bomb_range, tuning.escape_steps).is_none() {
            return false;
        }

        if in_line {
            return true;
        }

        let mut chance = tuning.hunt_bomb_base();
        if trap {
            chance += TRAP_BONUS;
        }
        if walls >= 2 {
            chance += WALLS_BONUS;
        }

        self.rng.gen::<f32>() < chance.min(HUNT_BOMB_CAP)
    }

    fn escape(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, out: &mut Vec<Command>) {
        let owner = ActorRef::Enemy(self.id);
        let threats = DangerMap::build(view, |bomb| bomb.timer <= DANGER_HORIZON || bomb.owner == owner);
        let field = navigation::DistanceField::from_origin(view.tiles().size(), me.cell, |cell| {
            !view.is_walkable(cell) || view.has_explosion(cell)
        });

        match field.nearest(|cell, _| cell != me.cell && !threats.is_dangerous(cell)) {
            Some(refuge) => {
                if self.target != Some(refuge) {
                    self.target = Some(refuge);
                    self.plan(view, me.cell);
                }
                self.step_toward(view, me, map, out);
            }
            None => self.random_walk(view, me, map, out),
        }
    }

    fn place_bomb(&mut self, out: &mut Vec<Command>) {
        tracing::debug!(enemy = self.id.get(), "enemy placing bomb");
        out.push(Command::PlaceEnemyBomb { enemy: self.id });
        self.state = AiState::Escape;
        self.target = None;
        self.path.clear();
    }

    fn plan(&mut self, view: &ArenaView<'_>, from: CellCoord) {
        self.path = match self.target {
            Some(target) => navigation::find_path(view.tiles().size(), from, target, |cell| {
                !view.is_walkable(cell) || view.has_explosion(cell)
            }),
            None => Vec::new(),
        };
    }

    /// Follows the cached path one tile, falling back to a random step.
    fn step_toward(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, out: &mut Vec<Command>) {
        if self.path.is_empty() {
            self.plan(view, me.cell);
        }

        let Some(next) = self.path.first().copied() else {
            self.target = None;
            self.random_walk(view, me, map, out);
            return;
        };

        match me.cell.direction_to(next).filter(|_| view.is_walkable(next)) {
            Some(_) if view.has_explosion(next) => {
                tracing::trace!(enemy = self.id.get(), ?next, "path runs through live fire");
                self.path.clear();
            }
            Some(_) if map.is_dangerous(next) && !map.is_dangerous(me.cell) => {
                tracing::trace!(enemy = self.id.get(), ?next, "holding outside blast");
            }
            Some(direction) => {
                out.push(Command::StepEnemy {
                    enemy: self.id,
                    direction,
                });
                let _ = self.path.remove(0);
            }
            None => {
                tracing::trace!(enemy = self.id.get(), ?next, "path obstructed");
                self.path.clear();
                self.random_walk(view, me, map, out);
            }
        }
    }

    fn random_walk(&mut self, view: &ArenaView<'_>, me: &EnemySnapshot, map: &DangerMap, out: &mut Vec<Command>) {
        if let Some(direction) = tactics::random_step(view, map, me.cell, &mut self.rng) {
            out.push(Command::StepEnemy {
                enemy: self.id,
                direction,
            });
        }
    }
}
