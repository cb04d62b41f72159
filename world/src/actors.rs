//! Player and enemy state with their status timers.

use bomber_core::{
    BombType, CellCoord, EnemyId, EnemySnapshot, HitEffect, PlayerSnapshot, PowerUpKind,
};

const STARTING_LIVES: u32 = 3;
const MAX_LIVES: u32 = 5;
const MAX_HEALTH: u32 = 5;
const MAX_ARMOR: u32 = 3;
const DEFAULT_BOMB_RANGE: u32 = 2;
const DEFAULT_MAX_BOMBS: u32 = 1;

const SPEED_BOOST_TICKS: i32 = 600;
const SLOW_TICKS: i32 = 300;
const SHIELD_TICKS: u32 = 600;
const ARMOR_TICKS: u32 = 900;
const ICE_IMMUNITY_TICKS: u32 = 600;
const HEALTH_RESTORED: u32 = 2;

/// Ticks an enemy stays frozen after an ice blast.
pub const FREEZE_TICKS: u32 = 180;
/// Ticks an enemy waits after its bomb resolves before bombing again.
pub const ENEMY_BOMB_COOLDOWN_TICKS: u32 = 120;

/// Result of a single blast striking the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitOutcome {
    /// The shield soaked the hit and was consumed.
    Absorbed,
    /// Health was reduced.
    Damaged {
        damage: u32,
        health: u32,
        slowed: bool,
        life_lost: bool,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) cell: CellCoord,
    lives: u32,
    health: u32,
    owned_bombs: Vec<BombType>,
    active_bomb: BombType,
    speed_boost: i32,
    shield: bool,
    shield_ticks: u32,
    armor: u32,
    armor_ticks: u32,
    has_remote: bool,
    slow_immune: u32,
    max_bombs: u32,
    bomb_range: u32,
    outstanding_bombs: u32,
}

impl Player {
    pub(crate) fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            lives: STARTING_LIVES,
            health: MAX_HEALTH,
            owned_bombs: vec![BombType::Fire],
            active_bomb: BombType::Fire,
            speed_boost: 0,
            shield: false,
            shield_ticks: 0,
            armor: 0,
            armor_ticks: 0,
            has_remote: false,
            slow_immune: 0,
            max_bombs: DEFAULT_MAX_BOMBS,
            bomb_range: DEFAULT_BOMB_RANGE,
            outstanding_bombs: 0,
        }
    }

    pub(crate) const fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) const fn active_bomb(&self) -> BombType {
        self.active_bomb
    }

    pub(crate) fn owned_bombs(&self) -> &[BombType] {
        &self.owned_bombs
    }

    pub(crate) const fn has_remote(&self) -> bool {
        self.has_remote
    }

    /// Whether another bomb may be placed under the simultaneous cap.
    pub(crate) const fn can_place_bomb(&self) -> bool {
        self.outstanding_bombs < self.max_bombs
    }

    /// Explosion range of the next bomb, including the active type's bonus.
    pub(crate) const fn next_bomb_range(&self) -> u32 {
        self.bomb_range + self.active_bomb.range_bonus()
    }

    pub(crate) fn record_bomb_placed(&mut self) {
        self.outstanding_bombs = self.outstanding_bombs.saturating_add(1);
    }

    pub(crate) fn record_bomb_resolved(&mut self) {
        self.outstanding_bombs = self.outstanding_bombs.saturating_sub(1);
    }

    /// Returns the player to the spawn tile for a fresh level.
    pub(crate) fn respawn(&mut self, cell: CellCoord) {
        self.cell = cell;
        self.outstanding_bombs = 0;
    }

    /// Advances every status timer by one tick.
    pub(crate) fn tick_statuses(&mut self) {
        self.speed_boost -= self.speed_boost.signum();

        if self.shield_ticks > 0 {
            self.shield_ticks -= 1;
            if self.shield_ticks == 0 {
                self.shield = false;
            }
        }

        if self.armor_ticks > 0 {
            self.armor_ticks -= 1;
            if self.armor_ticks == 0 {
                self.armor = 0;
            }
        }

        self.slow_immune = self.slow_immune.saturating_sub(1);
    }

    /// Applies a blast hit, consuming the shield or reducing health.
    pub(crate) fn hit(&mut self, damage: u32, effect: Option<HitEffect>) -> HitOutcome {
        if self.shield {
            self.shield = false;
            self.shield_ticks = 0;
            return HitOutcome::Absorbed;
        }

        let damage = damage.saturating_sub(self.armor).max(1);
        self.health = self.health.saturating_sub(damage);
        let health = self.health;

        let slowed = match effect {
            Some(HitEffect::Slow) if self.slow_immune == 0 => {
                self.speed_boost = -SLOW_TICKS;
                true
            }
            _ => false,
        };

        let life_lost = self.health == 0;
        if life_lost {
            self.lives = self.lives.saturating_sub(1);
            if self.lives > 0 {
                self.health = MAX_HEALTH;
            }
        }

        HitOutcome::Damaged {
            damage,
            health,
            slowed,
            life_lost,
        }
    }

    pub(crate) fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Speed => self.speed_boost = SPEED_BOOST_TICKS,
            PowerUpKind::ExtraBomb => self.max_bombs = self.max_bombs.saturating_add(1),
            PowerUpKind::BombRange => self.bomb_range = self.bomb_range.saturating_add(1),
            PowerUpKind::Shield => {
                self.shield = true;
                self.shield_ticks = SHIELD_TICKS;
            }
            PowerUpKind::ExtraLife => self.lives = (self.lives + 1).min(MAX_LIVES),
            PowerUpKind::RemoteBomb => self.has_remote = true,
            PowerUpKind::Armor => {
                self.armor = (self.armor + 1).min(MAX_ARMOR);
                self.armor_ticks = ARMOR_TICKS;
            }
            PowerUpKind::Health => self.health = (self.health + HEALTH_RESTORED).min(MAX_HEALTH),
            PowerUpKind::IceImmunity => self.slow_immune = ICE_IMMUNITY_TICKS,
        }
    }

    /// Adds the bomb type to the owned set and selects it.
    pub(crate) fn grant_bomb_type(&mut self, kind: BombType) {
        if !self.owned_bombs.contains(&kind) {
            self.owned_bombs.push(kind);
        }
        self.active_bomb = kind;
    }

    /// Selects the next owned bomb type, returning it when the selection changed.
    pub(crate) fn cycle_bomb_type(&mut self) -> Option<BombType> {
        if self.owned_bombs.len() < 2 {
            return None;
        }

        let current = self
            .owned_bombs
            .iter()
            .position(|kind| *kind == self.active_bomb)
            .unwrap_or(0);
        self.active_bomb = self.owned_bombs[(current + 1) % self.owned_bombs.len()];
        Some(self.active_bomb)
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell,
            lives: self.lives,
            health: self.health,
            shield: self.shield,
            armor: self.armor,
            speed_boost: self.speed_boost,
            slow_immune: self.slow_immune,
            bomb_range: self.bomb_range,
            max_bombs: self.max_bombs,
            active_bomb_type: self.active_bomb,
            has_remote: self.has_remote,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) cell: CellCoord,
    pub(crate) frozen: u32,
    pub(crate) bomb_cooldown: u32,
    pub(crate) active_bomb: bool,
    pub(crate) bomb_range: u32,
}

impl Enemy {
    pub(crate) fn new(id: EnemyId, cell: CellCoord, bomb_range: u32) -> Self {
        Self {
            id,
            cell,
            frozen: 0,
            bomb_cooldown: 0,
            active_bomb: false,
            bomb_range,
        }
    }

    pub(crate) fn tick_statuses(&mut self) {
        self.frozen = self.frozen.saturating_sub(1);
        self.bomb_cooldown = self.bomb_cooldown.saturating_sub(1);
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = FREEZE_TICKS;
    }

    pub(crate) fn record_bomb_resolved(&mut self) {
        self.active_bomb = false;
        self.bomb_cooldown = ENEMY_BOMB_COOLDOWN_TICKS;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            cell: self.cell,
            frozen: self.frozen,
            active_bomb: self.active_bomb,
            bomb_cooldown: self.bomb_cooldown,
            bomb_range: self.bomb_range,
        }
    }
}
