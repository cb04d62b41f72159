#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bomber engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. Systems read the arena through the immutable
//! [`ArenaView`] snapshot and respond exclusively with new command batches.

mod layout;
mod profile;

pub use layout::{ArenaLayout, LayoutError};
pub use profile::{Difficulty, DifficultyProfile, ProfileError};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Bomber.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with a fixed arena layout.
    LoadLayout {
        /// Tiles, player spawn and enemy spawns describing the arena.
        layout: ArenaLayout,
    },
    /// Advances the simulation by one fixed tick, ageing every hazard.
    Tick,
    /// Requests that the player advance one tile in the provided direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the player drop a bomb of its active type on its tile.
    PlacePlayerBomb,
    /// Rotates the player's active bomb type through the owned set.
    CycleBombType,
    /// Detonates every outstanding remote bomb owned by the player.
    DetonateRemoteBombs,
    /// Requests that an enemy advance one tile in the provided direction.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an enemy drop a bomb on its current tile.
    PlaceEnemyBomb {
        /// Identifier of the enemy placing the bomb.
        enemy: EnemyId,
    },
    /// Resolves skill and power-up pickups for the player's current tile.
    CollectPickups,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh level was generated or loaded.
    LevelGenerated {
        /// One-based level counter.
        level: u32,
        /// Side length of the square grid.
        grid_size: u32,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Tile the enemy occupies after spawning.
        cell: CellCoord,
    },
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Number of ticks simulated since the world was created.
        tick: u64,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: CellCoord,
        /// Tile the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an enemy moved between two tiles.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Tile the enemy occupied before moving.
        from: CellCoord,
        /// Tile the enemy occupies after moving.
        to: CellCoord,
    },
    /// Reports that a movement request was refused.
    MoveRejected {
        /// Actor whose move was refused.
        actor: ActorRef,
        /// Tile the actor attempted to enter.
        target: Option<CellCoord>,
    },
    /// Confirms that a bomb was placed on the grid.
    BombPlaced {
        /// Identifier allocated to the bomb.
        bomb: BombId,
        /// Actor owning the bomb.
        owner: ActorRef,
        /// Tile the bomb occupies.
        cell: CellCoord,
        /// Elemental type of the bomb.
        kind: BombType,
        /// Explosion range in tiles per direction.
        range: u32,
        /// Whether the bomb waits for a remote trigger.
        remote: bool,
    },
    /// Reports that a bomb placement request was refused.
    BombPlacementRejected {
        /// Actor whose placement was refused.
        owner: ActorRef,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a bomb exploded and was removed from the live set.
    BombDetonated {
        /// Identifier of the detonated bomb.
        bomb: BombId,
        /// Actor that owned the bomb.
        owner: ActorRef,
        /// Tile the bomb occupied.
        cell: CellCoord,
        /// Indicates whether the blast struck the player.
        hit_player: bool,
    },
    /// Confirms that a destructible wall was cleared by a blast.
    TileDestroyed {
        /// Tile that became empty.
        cell: CellCoord,
    },
    /// Announces that a hidden bomb skill was uncovered.
    SkillRevealed {
        /// Tile holding the skill.
        cell: CellCoord,
        /// Bomb type granted by the skill.
        kind: BombType,
    },
    /// Announces that a power-up dropped from a destroyed wall.
    PowerUpSpawned {
        /// Tile holding the power-up.
        cell: CellCoord,
        /// Kind of power-up that dropped.
        kind: PowerUpKind,
    },
    /// Confirms that the player collected a power-up.
    PowerUpCollected {
        /// Kind of power-up that was applied.
        kind: PowerUpKind,
    },
    /// Confirms that the player collected a bomb skill.
    SkillCollected {
        /// Bomb type granted by the skill.
        kind: BombType,
    },
    /// Announces that the player's active bomb type changed.
    BombTypeSelected {
        /// Bomb type now active.
        kind: BombType,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Damage applied after armor.
        damage: u32,
        /// Health remaining after the hit.
        health: u32,
    },
    /// Reports that the player's shield absorbed a hit.
    ShieldAbsorbed,
    /// Reports that the player was slowed by an ice blast.
    PlayerSlowed,
    /// Reports that the player lost a life.
    LifeLost {
        /// Lives remaining.
        lives: u32,
    },
    /// Reports that an enemy was frozen by an ice blast.
    EnemyFrozen {
        /// Identifier of the frozen enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy was removed from the arena.
    EnemyEliminated {
        /// Identifier of the eliminated enemy.
        enemy: EnemyId,
        /// Tile the enemy occupied when eliminated.
        cell: CellCoord,
    },
    /// Announces that every enemy on the level was eliminated.
    LevelCleared {
        /// Level that was cleared.
        level: u32,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Final score.
        score: u32,
    },
}

/// Kind of a single grid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor.
    #[default]
    Empty,
    /// Indestructible wall.
    Wall,
    /// Wall that a blast converts into floor.
    Destructible,
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Whether the direction runs along a row.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Applies a signed offset, returning `None` when either axis underflows.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(CellCoord::new(column, row))
    }

    /// Neighbouring cell one step in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (columns, rows) = direction.delta();
        self.offset(columns, rows)
    }

    /// Direction leading from `self` to an adjacent cell, if the cells touch.
    #[must_use]
    pub fn direction_to(self, to: CellCoord) -> Option<Direction> {
        let column_diff = self.column().abs_diff(to.column());
        let row_diff = self.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > self.column() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row() > self.row() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }

    /// Whether both cells share a row or a column.
    #[must_use]
    pub const fn is_aligned_with(self, other: CellCoord) -> bool {
        self.column == other.column || self.row == other.row
    }
}

/// Elemental bomb types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BombType {
    /// Standard blast.
    #[default]
    Fire,
    /// Weak blast that slows the player and freezes enemies.
    Ice,
    /// Heavy blast with extended reach.
    Mega,
}

impl BombType {
    /// Every bomb type in selection order.
    pub const ALL: [BombType; 3] = [BombType::Fire, BombType::Ice, BombType::Mega];

    /// Damage dealt to the player by a blast of this type.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Fire => 2,
            Self::Ice => 1,
            Self::Mega => 3,
        }
    }

    /// Additional tiles of reach on top of the owner's base range.
    #[must_use]
    pub const fn range_bonus(self) -> u32 {
        match self {
            Self::Mega => 2,
            Self::Fire | Self::Ice => 0,
        }
    }

    /// Secondary effect applied alongside the damage.
    #[must_use]
    pub const fn effect(self) -> Option<HitEffect> {
        match self {
            Self::Ice => Some(HitEffect::Slow),
            Self::Fire | Self::Mega => None,
        }
    }
}

/// Secondary effects carried by a blast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitEffect {
    /// Applies a temporary negative speed value unless the target is immune.
    Slow,
}

/// Power-ups that may drop from destroyed walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Temporary movement speed boost.
    Speed,
    /// Raises the simultaneous bomb cap.
    ExtraBomb,
    /// Raises the explosion range.
    BombRange,
    /// Absorbs one hit.
    Shield,
    /// Grants an additional life.
    ExtraLife,
    /// Enables remote detonation.
    RemoteBomb,
    /// Temporarily reduces incoming damage.
    Armor,
    /// Restores health.
    Health,
    /// Temporary immunity to the slow effect.
    IceImmunity,
}

impl PowerUpKind {
    /// Every power-up kind.
    pub const ALL: [PowerUpKind; 9] = [
        PowerUpKind::Speed,
        PowerUpKind::ExtraBomb,
        PowerUpKind::BombRange,
        PowerUpKind::Shield,
        PowerUpKind::ExtraLife,
        PowerUpKind::RemoteBomb,
        PowerUpKind::Armor,
        PowerUpKind::Health,
        PowerUpKind::IceImmunity,
    ];

    /// Relative drop weight used when a destroyed wall spawns a power-up.
    #[must_use]
    pub const fn drop_weight(self) -> f32 {
        match self {
            Self::Speed | Self::ExtraBomb => 0.20,
            Self::BombRange => 0.15,
            Self::Shield | Self::RemoteBomb | Self::Armor => 0.10,
            Self::ExtraLife | Self::Health | Self::IceImmunity => 0.05,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BombId(u32);

impl BombId {
    /// Creates a new bomb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Non-owning handle to an actor, used for bomb ownership and hit tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorRef {
    /// The single player.
    Player,
    /// An enemy addressed by identifier.
    Enemy(EnemyId),
}

/// Reasons a bomb placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The owner already has its maximum number of bombs outstanding.
    CapReached,
    /// A bomb already occupies the owner's tile.
    TileOccupied,
    /// The enemy's post-detonation cooldown has not elapsed.
    OnCooldown,
    /// The enemy is frozen.
    Frozen,
    /// No enemy with the provided identifier exists.
    UnknownEnemy,
    /// The game has ended.
    GameOver,
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Tile occupied by the player.
    pub cell: CellCoord,
    /// Remaining lives.
    pub lives: u32,
    /// Remaining health within the current life.
    pub health: u32,
    /// Whether a shield is active.
    pub shield: bool,
    /// Active armor level.
    pub armor: u32,
    /// Signed speed modifier; positive is boosted, negative is slowed.
    pub speed_boost: i32,
    /// Remaining ticks of slow immunity.
    pub slow_immune: u32,
    /// Base explosion range of the player's bombs.
    pub bomb_range: u32,
    /// Maximum number of simultaneous bombs.
    pub max_bombs: u32,
    /// Bomb type used by the next placement.
    pub active_bomb_type: BombType,
    /// Whether placed bombs wait for a remote trigger.
    pub has_remote: bool,
}

impl PlayerSnapshot {
    /// Reports whether the player currently suffers the slow effect.
    #[must_use]
    pub const fn is_slowed(&self) -> bool {
        self.speed_boost < 0
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Tile occupied by the enemy.
    pub cell: CellCoord,
    /// Remaining ticks of freeze.
    pub frozen: u32,
    /// Whether the enemy has a bomb outstanding.
    pub active_bomb: bool,
    /// Remaining ticks before the enemy may bomb again.
    pub bomb_cooldown: u32,
    /// Explosion range of the enemy's bombs.
    pub bomb_range: u32,
}

impl EnemySnapshot {
    /// Whether the enemy is currently allowed to place a bomb.
    #[must_use]
    pub const fn can_bomb(&self) -> bool {
        !self.active_bomb && self.bomb_cooldown == 0 && self.frozen == 0
    }
}

/// Immutable representation of a live bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BombSnapshot {
    /// Identifier allocated to the bomb.
    pub id: BombId,
    /// Actor owning the bomb.
    pub owner: ActorRef,
    /// Tile occupied by the bomb.
    pub cell: CellCoord,
    /// Elemental type of the bomb.
    pub kind: BombType,
    /// Ticks remaining until detonation.
    pub timer: u32,
    /// Explosion range in tiles per direction.
    pub range: u32,
    /// Whether the bomb waits for a remote trigger.
    pub remote: bool,
}

/// Immutable representation of a live explosion tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplosionSnapshot {
    /// Tile covered by the explosion.
    pub cell: CellCoord,
    /// Elemental type of the originating bomb.
    pub kind: BombType,
    /// Ticks remaining before the explosion fades.
    pub remaining: u32,
}

/// Immutable representation of a visible power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUpSnapshot {
    /// Tile holding the power-up.
    pub cell: CellCoord,
    /// Kind of power-up.
    pub kind: PowerUpKind,
}

/// Read-only view into the dense square tile matrix.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [TileKind],
    size: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(tiles: &'a [TileKind], size: u32) -> Self {
        Self { tiles, size }
    }

    /// Side length of the square grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// Kind of the tile at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Whether the tile exists and is open floor.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(TileKind::Empty)
    }

    /// Whether the tile exists and is a destructible wall.
    #[must_use]
    pub fn is_destructible(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(TileKind::Destructible)
    }

    /// In-bounds cardinal neighbours of the provided cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + 'a {
        let size = self.size;
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |next| next.column() < size && next.row() < size)
    }

    /// Number of cardinal neighbours holding a destructible wall.
    #[must_use]
    pub fn adjacent_destructible(&self, cell: CellCoord) -> usize {
        self.neighbors(cell)
            .filter(|neighbor| self.is_destructible(*neighbor))
            .count()
    }

    /// Iterates every cell with its tile kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + 'a {
        let size = self.size.max(1);
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % size, index / size), *kind)
        })
    }

    /// Counts tiles of the provided kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only snapshot of everything an agent may observe in one tick.
#[derive(Clone, Debug)]
pub struct ArenaView<'a> {
    tiles: TileView<'a>,
    bombs: Vec<BombSnapshot>,
    explosions: Vec<ExplosionSnapshot>,
    power_ups: Vec<PowerUpSnapshot>,
    player: PlayerSnapshot,
    enemies: Vec<EnemySnapshot>,
}

impl<'a> ArenaView<'a> {
    /// Assembles an arena view from its parts.
    #[must_use]
    pub fn new(
        tiles: TileView<'a>,
        bombs: Vec<BombSnapshot>,
        explosions: Vec<ExplosionSnapshot>,
        power_ups: Vec<PowerUpSnapshot>,
        player: PlayerSnapshot,
        mut enemies: Vec<EnemySnapshot>,
    ) -> Self {
        enemies.sort_by_key(|enemy| enemy.id);
        Self {
            tiles,
            bombs,
            explosions,
            power_ups,
            player,
            enemies,
        }
    }

    /// Tile matrix of the arena.
    #[must_use]
    pub const fn tiles(&self) -> TileView<'a> {
        self.tiles
    }

    /// Live bombs in placement order.
    #[must_use]
    pub fn bombs(&self) -> &[BombSnapshot] {
        &self.bombs
    }

    /// Live explosion tiles.
    #[must_use]
    pub fn explosions(&self) -> &[ExplosionSnapshot] {
        &self.explosions
    }

    /// Visible power-ups.
    #[must_use]
    pub fn power_ups(&self) -> &[PowerUpSnapshot] {
        &self.power_ups
    }

    /// State of the player.
    #[must_use]
    pub const fn player(&self) -> &PlayerSnapshot {
        &self.player
    }

    /// Living enemies ordered by identifier.
    #[must_use]
    pub fn enemies(&self) -> &[EnemySnapshot] {
        &self.enemies
    }

    /// State of a single enemy, if it is still alive.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.enemies
            .binary_search_by_key(&id, |enemy| enemy.id)
            .ok()
            .map(|index| &self.enemies[index])
    }

    /// Bomb occupying the provided cell, if any.
    #[must_use]
    pub fn bomb_at(&self, cell: CellCoord) -> Option<&BombSnapshot> {
        self.bombs.iter().find(|bomb| bomb.cell == cell)
    }

    /// Whether a bomb occupies the provided cell.
    #[must_use]
    pub fn has_bomb(&self, cell: CellCoord) -> bool {
        self.bomb_at(cell).is_some()
    }

    /// Whether a live explosion covers the provided cell.
    #[must_use]
    pub fn has_explosion(&self, cell: CellCoord) -> bool {
        self.explosions.iter().any(|explosion| explosion.cell == cell)
    }

    /// Whether a visible power-up lies on the provided cell.
    #[must_use]
    pub fn has_power_up(&self, cell: CellCoord) -> bool {
        self.power_ups.iter().any(|power_up| power_up.cell == cell)
    }

    /// Whether an actor may step onto the cell: open floor without a bomb.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tiles.is_empty(cell) && !self.has_bomb(cell)
    }
}
