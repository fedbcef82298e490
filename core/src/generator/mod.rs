use core::fmt::Debug;

use crate::*;
pub use random::*;

mod random;

/// Strategy choosing where mines go once the first cell is revealed.
pub trait MinePlacer: Debug {
    /// Returns `config.mines` distinct in-bounds positions, none of them in `safe`.
    fn place(&mut self, config: GameConfig, safe: &[Coord2]) -> Vec<Coord2>;
}

/// Places a predetermined layout, used to set up known boards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedMinePlacer {
    mines: Vec<Coord2>,
}

impl FixedMinePlacer {
    pub fn new(mines: impl Into<Vec<Coord2>>) -> Self {
        Self {
            mines: mines.into(),
        }
    }
}

impl MinePlacer for FixedMinePlacer {
    fn place(&mut self, _config: GameConfig, _safe: &[Coord2]) -> Vec<Coord2> {
        self.mines.clone()
    }
}
