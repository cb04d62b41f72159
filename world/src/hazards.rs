//! Time-driven entities: bombs, explosions, power-ups and hidden skills.

use bomber_core::{
    ActorRef, BombId, BombSnapshot, BombType, CellCoord, ExplosionSnapshot, PowerUpKind,
    PowerUpSnapshot,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Ticks before a freshly placed bomb detonates.
pub const BOMB_FUSE_TICKS: u32 = 120;
/// Ticks before an untriggered remote bomb detonates on its own.
pub const REMOTE_FUSE_TICKS: u32 = 300;
/// Ticks an explosion tile stays lethal.
pub const EXPLOSION_TICKS: u32 = 30;

const POWER_UP_DROP_CHANCE: f64 = 0.2;
const FLOAT_STEP: f32 = 0.2;
const FLOAT_LIMIT: f32 = 3.0;

#[derive(Clone, Debug)]
pub(crate) struct Bomb {
    pub(crate) id: BombId,
    pub(crate) owner: ActorRef,
    pub(crate) cell: CellCoord,
    pub(crate) kind: BombType,
    pub(crate) timer: u32,
    pub(crate) range: u32,
    pub(crate) remote: bool,
}

impl Bomb {
    fn snapshot(&self) -> BombSnapshot {
        BombSnapshot {
            id: self.id,
            owner: self.owner,
            cell: self.cell,
            kind: self.kind,
            timer: self.timer,
            range: self.range,
            remote: self.remote,
        }
    }
}

/// A single lethal explosion tile.
#[derive(Clone, Debug)]
pub(crate) struct Explosion {
    pub(crate) cell: CellCoord,
    pub(crate) kind: BombType,
    remaining: u32,
    struck: Vec<ActorRef>,
}

impl Explosion {
    pub(crate) fn new(cell: CellCoord, kind: BombType) -> Self {
        Self {
            cell,
            kind,
            remaining: EXPLOSION_TICKS,
            struck: Vec::new(),
        }
    }

    /// Marks the actor as struck, returning `false` if it was struck before.
    pub(crate) fn strike(&mut self, actor: ActorRef) -> bool {
        if self.struck.contains(&actor) {
            return false;
        }
        self.struck.push(actor);
        true
    }

    fn snapshot(&self) -> ExplosionSnapshot {
        ExplosionSnapshot {
            cell: self.cell,
            kind: self.kind,
            remaining: self.remaining,
        }
    }
}

/// Visible power-up floating above the floor.
#[derive(Clone, Debug)]
pub(crate) struct PowerUp {
    pub(crate) cell: CellCoord,
    pub(crate) kind: PowerUpKind,
    float_offset: f32,
    float_direction: f32,
    active_ticks: Option<u32>,
}

impl PowerUp {
    fn new(cell: CellCoord, kind: PowerUpKind, lifetime: Option<u32>) -> Self {
        Self {
            cell,
            kind,
            float_offset: 0.0,
            float_direction: 1.0,
            active_ticks: lifetime,
        }
    }

    /// Advances the float animation and lifetime, returning whether it survives.
    fn update(&mut self) -> bool {
        self.float_offset += FLOAT_STEP * self.float_direction;
        if self.float_offset > FLOAT_LIMIT {
            self.float_direction = -1.0;
        } else if self.float_offset < -FLOAT_LIMIT {
            self.float_direction = 1.0;
        }

        match self.active_ticks.as_mut() {
            Some(ticks) => {
                *ticks = ticks.saturating_sub(1);
                *ticks > 0
            }
            None => true,
        }
    }

    pub(crate) const fn float_offset(&self) -> f32 {
        self.float_offset
    }

    fn snapshot(&self) -> PowerUpSnapshot {
        PowerUpSnapshot {
            cell: self.cell,
            kind: self.kind,
        }
    }
}

/// Bomb type pickup hidden under a destructible wall until it is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Skill {
    cell: CellCoord,
    kind: BombType,
    revealed: bool,
}

impl Skill {
    pub(crate) const fn hidden(cell: CellCoord, kind: BombType) -> Self {
        Self {
            cell,
            kind,
            revealed: false,
        }
    }

    pub(crate) const fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) const fn kind(&self) -> BombType {
        self.kind
    }

    pub(crate) const fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Registry of every live hazard and pickup on the level.
#[derive(Debug, Default)]
pub(crate) struct HazardRegistry {
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    power_ups: Vec<PowerUp>,
    skills: Vec<Skill>,
    next_bomb: u32,
}

impl HazardRegistry {
    /// Drops every hazard and installs the skills of a new level.
    pub(crate) fn reset(&mut self, skills: Vec<Skill>) {
        self.bombs.clear();
        self.explosions.clear();
        self.power_ups.clear();
        self.skills = skills;
    }

    pub(crate) fn has_bomb(&self, cell: CellCoord) -> bool {
        self.bombs.iter().any(|bomb| bomb.cell == cell)
    }

    pub(crate) fn add_bomb(
        &mut self,
        owner: ActorRef,
        cell: CellCoord,
        kind: BombType,
        range: u32,
        remote: bool,
    ) -> &Bomb {
        let id = BombId::new(self.next_bomb);
        self.next_bomb = self.next_bomb.wrapping_add(1);
        let timer = if remote {
            REMOTE_FUSE_TICKS
        } else {
            BOMB_FUSE_TICKS
        };
        let index = self.bombs.len();
        self.bombs.push(Bomb {
            id,
            owner,
            cell,
            kind,
            timer,
            range,
            remote,
        });
        &self.bombs[index]
    }

    /// Decrements every fuse and removes the bombs that reached zero, in placement order.
    pub(crate) fn age_bombs(&mut self) -> Vec<Bomb> {
        for bomb in &mut self.bombs {
            bomb.timer = bomb.timer.saturating_sub(1);
        }
        self.take_bombs(|bomb| bomb.timer == 0)
    }

    /// Removes every remote bomb owned by `owner`.
    pub(crate) fn take_remote_bombs(&mut self, owner: ActorRef) -> Vec<Bomb> {
        self.take_bombs(|bomb| bomb.remote && bomb.owner == owner)
    }

    fn take_bombs<P>(&mut self, mut predicate: P) -> Vec<Bomb>
    where
        P: FnMut(&Bomb) -> bool,
    {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.bombs.len());
        for bomb in self.bombs.drain(..) {
            if predicate(&bomb) {
                taken.push(bomb);
            } else {
                kept.push(bomb);
            }
        }
        self.bombs = kept;
        taken
    }

    /// Ages explosions and power-ups, dropping the ones that expired.
    pub(crate) fn age_effects(&mut self) {
        for explosion in &mut self.explosions {
            explosion.remaining = explosion.remaining.saturating_sub(1);
        }
        self.explosions.retain(|explosion| explosion.remaining > 0);
        self.power_ups.retain_mut(PowerUp::update);
    }

    /// Appends explosion tiles, returning the index of the first new entry.
    pub(crate) fn ignite(&mut self, cells: &[CellCoord], kind: BombType) -> usize {
        let first = self.explosions.len();
        self.explosions
            .extend(cells.iter().map(|cell| Explosion::new(*cell, kind)));
        first
    }

    pub(crate) fn explosions_mut(&mut self) -> &mut [Explosion] {
        &mut self.explosions
    }

    /// Rolls the drop chance for a destroyed wall and spawns a weighted power-up.
    pub(crate) fn roll_power_up(
        &mut self,
        cell: CellCoord,
        rng: &mut ChaCha8Rng,
        lifetime: Option<u32>,
    ) -> Option<PowerUpKind> {
        if !rng.gen_bool(POWER_UP_DROP_CHANCE) {
            return None;
        }

        let total: f32 = PowerUpKind::ALL.iter().map(|kind| kind.drop_weight()).sum();
        let mut roll = rng.gen_range(0.0..total);
        let mut chosen = PowerUpKind::ALL[PowerUpKind::ALL.len() - 1];
        for kind in PowerUpKind::ALL {
            if roll < kind.drop_weight() {
                chosen = kind;
                break;
            }
            roll -= kind.drop_weight();
        }

        self.power_ups.push(PowerUp::new(cell, chosen, lifetime));
        Some(chosen)
    }

    /// Uncovers the skill hidden at `cell`, if any.
    pub(crate) fn reveal_skill(&mut self, cell: CellCoord) -> Option<BombType> {
        let skill = self
            .skills
            .iter_mut()
            .find(|skill| skill.cell == cell && !skill.revealed)?;
        skill.revealed = true;
        Some(skill.kind)
    }

    /// Removes and returns the revealed skills lying on `cell`.
    pub(crate) fn take_skills_at(&mut self, cell: CellCoord) -> Vec<BombType> {
        let mut taken = Vec::new();
        self.skills.retain(|skill| {
            if skill.revealed && skill.cell == cell {
                taken.push(skill.kind);
                false
            } else {
                true
            }
        });
        taken
    }

    /// Removes and returns the power-ups lying on `cell`.
    pub(crate) fn take_power_ups_at(&mut self, cell: CellCoord) -> Vec<PowerUpKind> {
        let mut taken = Vec::new();
        self.power_ups.retain(|power_up| {
            if power_up.cell == cell {
                taken.push(power_up.kind);
                false
            } else {
                true
            }
        });
        taken
    }

    pub(crate) fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub(crate) fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub(crate) fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub(crate) fn bomb_snapshots(&self) -> Vec<BombSnapshot> {
        self.bombs.iter().map(Bomb::snapshot).collect()
    }

    pub(crate) fn explosion_snapshots(&self) -> Vec<ExplosionSnapshot> {
        self.explosions.iter().map(Explosion::snapshot).collect()
    }

    pub(crate) fn power_up_snapshots(&self) -> Vec<PowerUpSnapshot> {
        self.power_ups.iter().map(PowerUp::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fuse_counts_down_to_single_detonation() {
        let mut registry = HazardRegistry::default();
        let _ = registry.add_bomb(
            ActorRef::Player,
            CellCoord::new(1, 1),
            BombType::Fire,
            2,
            false,
        );

        let mut previous = BOMB_FUSE_TICKS;
        for _ in 1..BOMB_FUSE_TICKS {
            assert!(registry.age_bombs().is_empty());
            let timer = registry.bombs()[0].timer;
            assert!(timer < previous);
            previous = timer;
        }

        let detonated = registry.age_bombs();
        assert_eq!(detonated.len(), 1);
        assert!(registry.bombs().is_empty());
        assert!(registry.age_bombs().is_empty());
    }

    #[test]
    fn remote_bombs_are_taken_by_owner_only() {
        let mut registry = HazardRegistry::default();
        let _ = registry.add_bomb(ActorRef::Player, CellCoord::new(1, 1), BombType::Fire, 2, true);
        let _ = registry.add_bomb(ActorRef::Player, CellCoord::new(3, 1), BombType::Fire, 2, false);

        let taken = registry.take_remote_bombs(ActorRef::Player);
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].timer, REMOTE_FUSE_TICKS);
        assert_eq!(registry.bombs().len(), 1);
    }

    #[test]
    fn explosions_fade_after_lifetime() {
        let mut registry = HazardRegistry::default();
        let _ = registry.ignite(&[CellCoord::new(2, 2)], BombType::Fire);

        for _ in 1..EXPLOSION_TICKS {
            registry.age_effects();
        }
        assert_eq!(registry.explosion_snapshots().len(), 1);
        registry.age_effects();
        assert!(registry.explosion_snapshots().is_empty());
    }

    #[test]
    fn explosion_strikes_each_actor_once() {
        let mut explosion = Explosion::new(CellCoord::new(1, 1), BombType::Fire);
        assert!(explosion.strike(ActorRef::Player));
        assert!(!explosion.strike(ActorRef::Player));
    }

    #[test]
    fn power_up_float_stays_bounded() {
        let mut power_up = PowerUp::new(CellCoord::new(1, 1), PowerUpKind::Speed, None);
        for _ in 0..500 {
            assert!(power_up.update());
            assert!(power_up.float_offset().abs() <= FLOAT_LIMIT + FLOAT_STEP);
        }
    }

    #[test]
    fn power_up_with_lifetime_expires() {
        let mut power_up = PowerUp::new(CellCoord::new(1, 1), PowerUpKind::Armor, Some(2));
        assert!(power_up.update());
        assert!(!power_up.update());
    }

    #[test]
    fn drop_rate_is_roughly_one_in_five() {
        let mut registry = HazardRegistry::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let drops = (0..5_000)
            .filter(|_| {
                registry
                    .roll_power_up(CellCoord::new(1, 1), &mut rng, None)
                    .is_some()
            })
            .count();
        assert!((800..1_200).contains(&drops), "drops = {drops}");
    }

    #[test]
    fn revealed_skill_is_collectable_once() {
        let mut registry = HazardRegistry::default();
        let cell = CellCoord::new(3, 3);
        registry.reset(vec![Skill::hidden(cell, BombType::Ice)]);

        assert!(registry.take_skills_at(cell).is_empty());
        assert_eq!(registry.reveal_skill(cell), Some(BombType::Ice));
        assert_eq!(registry.reveal_skill(cell), None);
        assert_eq!(registry.take_skills_at(cell), vec![BombType::Ice]);
        assert!(registry.skills().is_empty());
    }
}
