use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use error::*;
pub use generator::*;
pub use records::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod error;
mod generator;
mod records;
mod session;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Checks `1 <= width, height` and that at least one cell stays safe.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.size;
        if width == 0 || height == 0 || self.mines >= self.total_cells() {
            return Err(GameError::InvalidConfig {
                width,
                height,
                mines: self.mines,
            });
        }
        Ok(())
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

/// The classic preset tiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => GameConfig::new_unchecked((9, 9), 10),
            Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Expert => GameConfig::new_unchecked((30, 16), 99),
        }
    }

    /// The preset matching `config` exactly, if any.
    pub fn matching(config: GameConfig) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.config() == config)
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Beginner => "beginner",
            Intermediate => "intermediate",
            Expert => "expert",
        }
    }
}

/// Which cells are kept free of mines around the first revealed cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeZone {
    /// Only the first revealed cell is guaranteed safe
    #[default]
    Cell,
    /// The first revealed cell and all of its neighbors are safe, so it always opens a region
    Neighborhood,
}

/// Rule toggles that do not affect the board dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub safe_zone: SafeZone,
    pub question_marks: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            safe_zone: SafeZone::Cell,
            question_marks: true,
        }
    }
}

/// Outcome of a reveal or chord.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Continue,
    MineHit,
    AllSafeRevealed,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Continue => true,
            MineHit => true,
            AllSafeRevealed => true,
        }
    }
}

/// Used to merge outcomes when revealing several cells at once
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // a mine has priority
            (MineHit, _) => MineHit,
            (_, MineHit) => MineHit,
            (AllSafeRevealed, _) => AllSafeRevealed,
            (_, AllSafeRevealed) => AllSafeRevealed,
            (Continue, _) => Continue,
            (_, Continue) => Continue,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Everything a view needs after a reveal or chord: the merged outcome and the cells to redraw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub changes: Vec<CellChange>,
    /// Set by the session when the move won the game with a new best time
    pub new_record: bool,
}

impl RevealReport {
    pub(crate) const fn unchanged() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            changes: Vec::new(),
            new_record: false,
        }
    }

    pub(crate) fn merge(&mut self, other: RevealReport) {
        self.outcome = self.outcome | other.outcome;
        self.changes.extend(other.changes);
        self.new_record |= other.new_record;
    }
}
