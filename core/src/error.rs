use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid game configuration: {width}x{height} with {mines} mines")]
    InvalidConfig {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Mine layout does not fit the board or its safe zone")]
    InvalidLayout,
    #[error("Mines were already placed on this board")]
    AlreadyPlaced,
    #[error("Game already ended, no new moves are accepted")]
    InvalidState,
}

pub type Result<T> = core::result::Result<T, GameError>;
