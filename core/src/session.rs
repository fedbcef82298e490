use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Highest value the classic three digit timer shows.
pub const MAX_DISPLAY_SECONDS: u32 = 999;

/// Holder name used for a new record until the player supplies one.
pub const DEFAULT_HOLDER: &str = "Anonymous";

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
/// - any -> NotStarted (reset)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Initial state, no cell revealed yet
    #[default]
    NotStarted,
    /// Game started
    InProgress,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl GameStatus {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game from first click to win or loss, plus the record book consulted on wins.
///
/// This is the surface a view talks to: it sends moves and gets back change-sets, it never touches the [`Board`].
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    status: GameStatus,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    clock: Box<dyn Clock>,
    records: RecordBook,
    default_holder: String,
    pending_record: Option<TierKey>,
}

impl GameSession {
    pub fn new(config: GameConfig, rules: Rules, records: RecordBook) -> Result<Self> {
        Ok(Self {
            board: Board::new(config, rules)?,
            status: GameStatus::default(),
            started_at: None,
            ended_at: None,
            clock: Box::new(SystemClock),
            records,
            default_holder: DEFAULT_HOLDER.to_owned(),
            pending_record: None,
        })
    }

    /// Replaces the mine placement strategy, kept across resets.
    pub fn with_placer(mut self, placer: Box<dyn MinePlacer>) -> Self {
        self.board.set_placer(placer);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_default_holder(mut self, holder: impl Into<String>) -> Self {
        self.default_holder = holder.into();
        self
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> GameConfig {
        self.board.config()
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn rules(&self) -> Rules {
        self.board.rules()
    }

    pub fn set_rules(&mut self, rules: Rules) {
        self.board.set_rules(rules);
    }

    pub fn tier(&self) -> TierKey {
        TierKey::for_config(self.board.config())
    }

    /// Visual state of a cell, `None` outside the board.
    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.board.tile_at(coords)
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        self.board.mines_left()
    }

    pub fn flags_placed(&self) -> CellCount {
        self.board.flag_count()
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.board.revealed_safe_count()
    }

    pub fn records(&self) -> &RecordBook {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut RecordBook {
        &mut self.records
    }

    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<RevealReport> {
        self.check_playable()?;
        let report = self.board.reveal(coords)?;
        Ok(self.apply(report))
    }

    pub fn chord_cell(&mut self, coords: Coord2) -> Result<RevealReport> {
        self.check_playable()?;
        let report = self.board.chord(coords)?;
        Ok(self.apply(report))
    }

    pub fn flag_cell(&mut self, coords: Coord2) -> Result<CellState> {
        self.check_playable()?;
        self.board.toggle_flag(coords)
    }

    /// Starts over with a fresh unplaced board, optionally with a new configuration.
    pub fn reset(&mut self, config: Option<GameConfig>) -> Result<()> {
        let config = config.unwrap_or(self.board.config());
        self.board.reset(config)?;
        self.status = GameStatus::NotStarted;
        self.started_at = None;
        self.ended_at = None;
        self.pending_record = None;
        log::debug!("Reset to {:?}", config);
        Ok(())
    }

    /// Time since the first reveal, frozen once the game ends, zero before it starts.
    pub fn elapsed_time(&self) -> Duration {
        match (self.started_at, self.ended_at) {
            (Some(started_at), Some(ended_at)) => ended_at.duration_since(started_at),
            (Some(started_at), None) => self.clock.now().duration_since(started_at),
            _ => Duration::ZERO,
        }
    }

    /// Timer tick observer, returns the seconds to display.
    pub fn tick(&self) -> u32 {
        let seconds = self.elapsed_seconds();
        if matches!(self.status, GameStatus::InProgress) {
            log::trace!("tick {}", seconds);
        }
        seconds.min(MAX_DISPLAY_SECONDS)
    }

    /// Names the holder of the record set by the last game, false if it set none.
    pub fn set_record_holder(&mut self, holder: impl Into<String>) -> bool {
        match self.pending_record.take() {
            Some(tier) => self.records.rename_holder(&tier, holder),
            None => false,
        }
    }

    fn elapsed_seconds(&self) -> u32 {
        u32::try_from(self.elapsed_time().as_secs()).unwrap_or(u32::MAX)
    }

    fn check_playable(&self) -> Result<()> {
        if self.status.is_final() {
            Err(GameError::InvalidState)
        } else {
            Ok(())
        }
    }

    fn apply(&mut self, mut report: RevealReport) -> RevealReport {
        if !report.outcome.has_update() {
            return report;
        }

        self.mark_started();
        match report.outcome {
            RevealOutcome::MineHit => {
                self.mark_ended(GameStatus::Lost);
                report.changes.extend(self.board.show_mines());
            }
            RevealOutcome::AllSafeRevealed => {
                self.mark_ended(GameStatus::Won);
                report.changes.extend(self.board.flag_mines());
                report.new_record = self.record_win();
            }
            RevealOutcome::Continue | RevealOutcome::NoChange => {}
        }
        report
    }

    /// Checks if the state is initial and changes to in-progress recording the start time
    fn mark_started(&mut self) {
        if self.status.is_initial() {
            let now = self.clock.now();
            self.started_at = Some(now);
            self.status = GameStatus::InProgress;
            log::debug!("Game started on {}", self.tier());
        }
    }

    fn mark_ended(&mut self, status: GameStatus) {
        self.ended_at = Some(self.clock.now());
        self.status = status;
        log::debug!("Game ended {:?} after {:?}", status, self.elapsed_time());
    }

    fn record_win(&mut self) -> bool {
        let tier = self.tier();
        let new_record = self
            .records
            .try_record(tier, self.elapsed_seconds(), self.default_holder.clone());
        self.pending_record = new_record.then_some(tier);
        new_record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2], clock: &ManualClock) -> GameSession {
        let config = GameConfig::new(size, mines.len() as CellCount).unwrap();
        GameSession::new(config, Rules::default(), RecordBook::new())
            .unwrap()
            .with_placer(Box::new(FixedMinePlacer::new(mines)))
            .with_clock(clock.clone())
    }

    /// Beginner layout that opens completely from the top-left corner.
    fn beginner_layout() -> Vec<Coord2> {
        let mut mines: Vec<Coord2> = (0..9).map(|x| (x, 8)).collect();
        mines.push((8, 7));
        mines
    }

    #[test]
    fn fresh_session_has_not_started() {
        let clock = ManualClock::new();
        let session = session((3, 3), &[(2, 2)], &clock);

        assert_eq!(session.status(), GameStatus::NotStarted);
        assert_eq!(session.elapsed_time(), Duration::ZERO);
        assert_eq!(session.mines_left(), 1);
    }

    #[test]
    fn first_reveal_can_win_outright() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(2, 2)], &clock);

        let report = session.reveal_cell((0, 0)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::AllSafeRevealed);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.revealed_safe_count(), 8);
        assert_eq!(session.tile_at((2, 2)), Some(Tile::Flagged));
        assert_eq!(session.mines_left(), 0);
        // custom tiers are not recorded by default
        assert!(!report.new_record);
    }

    #[test]
    fn flag_then_chord_wins() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);

        session.reveal_cell((1, 1)).unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        session.flag_cell((0, 1)).unwrap();
        session.flag_cell((2, 1)).unwrap();

        let report = session.chord_cell((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::AllSafeRevealed);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.revealed_safe_count(), 7);
    }

    #[test]
    fn mine_hit_loses_and_shows_all_mines() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();

        let report = session.reveal_cell((0, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::MineHit);
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.tile_at((0, 1)), Some(Tile::Exploded));
        assert_eq!(session.tile_at((2, 1)), Some(Tile::Mine));
        assert!(report.changes.contains(&CellChange {
            position: (2, 1),
            tile: Tile::Mine
        }));
        assert!(session.revealed_safe_count() < session.config().safe_cells());
    }

    #[test]
    fn chord_past_a_wrong_flag_loses() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();
        session.flag_cell((0, 1)).unwrap();
        session.flag_cell((1, 0)).unwrap();

        let report = session.chord_cell((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::MineHit);
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.tile_at((1, 2)), Some(Tile::Open(2)));
        assert_eq!(session.tile_at((2, 1)), Some(Tile::Exploded));
        assert_eq!(session.tile_at((1, 0)), Some(Tile::WrongFlag));
        assert!(report.changes.contains(&CellChange {
            position: (1, 0),
            tile: Tile::WrongFlag
        }));
    }

    #[test]
    fn finished_games_reject_moves() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();
        session.reveal_cell((0, 1)).unwrap();

        assert_eq!(session.reveal_cell((0, 0)), Err(GameError::InvalidState));
        assert_eq!(session.flag_cell((0, 0)), Err(GameError::InvalidState));
        assert_eq!(session.chord_cell((1, 1)), Err(GameError::InvalidState));
        assert_eq!(session.status(), GameStatus::Lost);
    }

    #[test]
    fn repeated_reveal_changes_nothing() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();

        let report = session.reveal_cell((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::NoChange);
        assert!(report.changes.is_empty());
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.revealed_safe_count(), 1);
    }

    #[test]
    fn flagging_does_not_start_the_clock() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(2, 2)], &clock);

        assert_eq!(session.flag_cell((2, 2)).unwrap(), CellState::Flagged);
        clock.advance(Duration::from_secs(4));

        assert_eq!(session.status(), GameStatus::NotStarted);
        assert_eq!(session.elapsed_time(), Duration::ZERO);
        assert_eq!(session.flags_placed(), 1);
    }

    #[test]
    fn clock_runs_while_in_progress_and_freezes_at_the_end() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);

        session.reveal_cell((1, 1)).unwrap();
        clock.advance(Duration::from_secs(5));
        assert_eq!(session.tick(), 5);

        session.flag_cell((0, 1)).unwrap();
        session.flag_cell((2, 1)).unwrap();
        session.chord_cell((1, 1)).unwrap();
        clock.advance(Duration::from_secs(10));

        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.elapsed_time(), Duration::from_secs(5));
    }

    #[test]
    fn tick_caps_at_three_digits() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();

        clock.advance(Duration::from_secs(5000));

        assert_eq!(session.tick(), MAX_DISPLAY_SECONDS);
        assert_eq!(session.elapsed_time(), Duration::from_secs(5000));
    }

    #[test]
    fn win_on_preset_sets_record_and_holder() {
        let clock = ManualClock::new();
        let mut session = GameSession::new(Difficulty::Beginner.config(), Rules::default(), RecordBook::new())
            .unwrap()
            .with_placer(Box::new(FixedMinePlacer::new(beginner_layout())))
            .with_clock(clock.clone());
        let tier = TierKey::Preset(Difficulty::Beginner);

        let report = session.reveal_cell((0, 0)).unwrap();

        assert_eq!(session.status(), GameStatus::Won);
        assert!(report.new_record);
        assert_eq!(session.records().get(&tier).unwrap().holder, DEFAULT_HOLDER);
        assert!(session.set_record_holder("Ada"));
        assert!(!session.set_record_holder("Bob"));
        assert_eq!(session.records().get(&tier).unwrap().holder, "Ada");

        // an equal time is not a new record
        session.reset(None).unwrap();
        let report = session.reveal_cell((0, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Won);
        assert!(!report.new_record);
        assert_eq!(session.records().get(&tier).unwrap().holder, "Ada");
    }

    #[test]
    fn mine_free_board_is_won_on_first_reveal() {
        let clock = ManualClock::new();
        let mut session = session((5, 4), &[], &clock);

        let report = session.reveal_cell((2, 2)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::AllSafeRevealed);
        assert_eq!(report.changes.len(), 20);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.elapsed_time(), Duration::ZERO);
    }

    #[test]
    fn reset_starts_a_new_game() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();
        session.reveal_cell((0, 1)).unwrap();

        session.reset(None).unwrap();

        assert_eq!(session.status(), GameStatus::NotStarted);
        assert_eq!(session.elapsed_time(), Duration::ZERO);
        assert_eq!(session.tile_at((1, 1)), Some(Tile::Hidden));
        assert_eq!(session.revealed_safe_count(), 0);
        session.reveal_cell((1, 1)).unwrap();
        assert_eq!(session.tile_at((1, 1)), Some(Tile::Open(2)));
    }

    #[test]
    fn reset_with_invalid_config_keeps_the_game() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(0, 1), (2, 1)], &clock);
        session.reveal_cell((1, 1)).unwrap();

        let err = session.reset(Some(GameConfig::new_unchecked((2, 2), 4)));

        assert!(matches!(err, Err(GameError::InvalidConfig { .. })));
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.tile_at((1, 1)), Some(Tile::Open(2)));
    }

    #[test]
    fn reset_can_change_the_tier() {
        let clock = ManualClock::new();
        let mut session = session((3, 3), &[(2, 2)], &clock);

        session.reset(Some(Difficulty::Expert.config())).unwrap();

        assert_eq!(session.size(), (30, 16));
        assert_eq!(session.tier(), TierKey::Preset(Difficulty::Expert));
        assert_eq!(session.mines_left(), 99);
    }
}
