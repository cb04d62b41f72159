//! Fixed arena layouts described with ASCII art.
//!
//! Layouts bypass random generation so scenarios can be replayed against a
//! known grid. Each row is a string of tile glyphs:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `#`   | indestructible wall |
//! | `+`   | destructible wall |
//! | `.`   | empty floor |
//! | `P`   | player spawn on empty floor |
//! | `E`   | enemy spawn on empty floor |

use thiserror::Error;

use crate::{CellCoord, TileKind};

/// Square arena with its spawn points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    size: u32,
    tiles: Vec<TileKind>,
    player: CellCoord,
    enemies: Vec<CellCoord>,
}

impl ArenaLayout {
    /// Creates a bordered arena of empty floor with the player at `(1, 1)`.
    #[must_use]
    pub fn open(size: u32) -> Self {
        let mut tiles = Vec::with_capacity((size as usize) * (size as usize));
        for row in 0..size {
            for column in 0..size {
                let border = column == 0 || row == 0 || column + 1 == size || row + 1 == size;
                tiles.push(if border {
                    TileKind::Wall
                } else {
                    TileKind::Empty
                });
            }
        }
        Self {
            size,
            tiles,
            player: CellCoord::new(1, 1),
            enemies: Vec::new(),
        }
    }

    /// Parses an arena from rows of glyphs.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let size = rows.len();
        if size == 0 {
            return Err(LayoutError::Empty);
        }
        let size_u32 = u32::try_from(size).map_err(|_| LayoutError::TooLarge)?;

        let mut tiles = Vec::with_capacity(size * size);
        let mut player = None;
        let mut enemies = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref().trim();
            let found = row.chars().count();
            if found != size {
                return Err(LayoutError::NotSquare {
                    row: row_index,
                    expected: size,
                    found,
                });
            }

            for (column_index, glyph) in row.chars().enumerate() {
                let cell = CellCoord::new(column_index as u32, row_index as u32);
                let kind = match glyph {
                    '#' => TileKind::Wall,
                    '+' => TileKind::Destructible,
                    '.' => TileKind::Empty,
                    'P' => {
                        if player.replace(cell).is_some() {
                            return Err(LayoutError::DuplicatePlayer);
                        }
                        TileKind::Empty
                    }
                    'E' => {
                        enemies.push(cell);
                        TileKind::Empty
                    }
                    other => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph: other,
                            column: column_index,
                            row: row_index,
                        })
                    }
                };
                tiles.push(kind);
            }
        }

        Ok(Self {
            size: size_u32,
            tiles,
            player: player.ok_or(LayoutError::MissingPlayer)?,
            enemies,
        })
    }

    /// Moves the player spawn.
    #[must_use]
    pub fn with_player(mut self, cell: CellCoord) -> Self {
        self.player = cell;
        self
    }

    /// Adds an enemy spawn.
    #[must_use]
    pub fn with_enemy(mut self, cell: CellCoord) -> Self {
        self.enemies.push(cell);
        self
    }

    /// Overwrites a single tile; out-of-range cells are ignored.
    #[must_use]
    pub fn with_tile(mut self, cell: CellCoord, kind: TileKind) -> Self {
        if cell.column() < self.size && cell.row() < self.size {
            let index = (cell.row() as usize) * (self.size as usize) + cell.column() as usize;
            self.tiles[index] = kind;
        }
        self
    }

    /// Side length of the square arena.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row-major tile kinds.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Player spawn.
    #[must_use]
    pub const fn player(&self) -> CellCoord {
        self.player
    }

    /// Enemy spawns in declaration order.
    #[must_use]
    pub fn enemies(&self) -> &[CellCoord] {
        &self.enemies
    }
}

/// Reasons an ASCII layout cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// No rows were supplied.
    #[error("layout contains no rows")]
    Empty,
    /// The layout does not fit the coordinate space.
    #[error("layout is too large")]
    TooLarge,
    /// A row's length differs from the number of rows.
    #[error("row {row} has {found} tiles, expected {expected}")]
    NotSquare {
        /// Zero-based index of the offending row.
        row: usize,
        /// Required row length.
        expected: usize,
        /// Actual row length.
        found: usize,
    },
    /// A glyph outside the legend was found.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column.
        column: usize,
        /// Zero-based row.
        row: usize,
    },
    /// No `P` glyph was present.
    #[error("layout has no player spawn")]
    MissingPlayer,
    /// More than one `P` glyph was present.
    #[error("layout has more than one player spawn")]
    DuplicatePlayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spawns_and_tiles() {
        let layout = ArenaLayout::parse(&["#####", "#P.E#", "#.#+#", "#...#", "#####"])
            .expect("valid layout");

        assert_eq!(layout.size(), 5);
        assert_eq!(layout.player(), CellCoord::new(1, 1));
        assert_eq!(layout.enemies(), &[CellCoord::new(3, 1)]);
        assert_eq!(layout.tiles()[2 * 5 + 2], TileKind::Wall);
        assert_eq!(layout.tiles()[2 * 5 + 3], TileKind::Destructible);
        assert_eq!(layout.tiles()[5 + 3], TileKind::Empty);
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = ArenaLayout::parse(&["###", "#P", "###"]).unwrap_err();
        assert_eq!(
            error,
            LayoutError::NotSquare {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_missing_player() {
        let error = ArenaLayout::parse(&["###", "#.#", "###"]).unwrap_err();
        assert_eq!(error, LayoutError::MissingPlayer);
    }

    #[test]
    fn open_layout_has_wall_border() {
        let layout = ArenaLayout::open(5);
        let walls = layout
            .tiles()
            .iter()
            .filter(|tile| **tile == TileKind::Wall)
            .count();
        assert_eq!(walls, 16);
        assert_eq!(layout.player(), CellCoord::new(1, 1));
    }
}
