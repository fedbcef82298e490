use serde::{Deserialize, Serialize};

use crate::Coord2;

/// Player-facing marking of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    Questioned,
}

impl CellState {
    /// Whether the cell still hides its content, regardless of markings.
    pub const fn is_unrevealed(self) -> bool {
        !matches!(self, Self::Revealed)
    }

    /// Whether flood fill and chording may open this cell.
    pub const fn is_openable(self) -> bool {
        matches!(self, Self::Hidden | Self::Questioned)
    }
}

/// One grid position. Transition legality is enforced by the board, this is only a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    position: Coord2,
    is_mine: bool,
    adjacent_mines: u8,
    state: CellState,
}

impl Cell {
    pub(crate) const fn new(position: Coord2) -> Self {
        Self {
            position,
            is_mine: false,
            adjacent_mines: 0,
            state: CellState::Hidden,
        }
    }

    pub const fn position(&self) -> Coord2 {
        self.position
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    /// Number of mines among the Chebyshev neighbors, only meaningful once mines are placed.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: CellState) {
        self.state = state;
    }

    pub(crate) fn arm(&mut self) {
        self.is_mine = true;
    }

    pub(crate) fn set_adjacent_mines(&mut self, count: u8) {
        self.adjacent_mines = count;
    }
}

/// What a view should draw for a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Hidden,
    Flagged,
    Questioned,
    Open(u8),
    /// A mine shown after the game was lost
    Mine,
    /// The mine that ended the game
    Exploded,
    /// A flag on a safe cell, shown after the game was lost
    WrongFlag,
}

/// A single entry of a change-set handed back to the view for redrawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub position: Coord2,
    pub tile: Tile,
}
