use hashbrown::HashSet;
use ndarray::Array2;
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::types::grid_index;
use crate::*;

/// The minefield: grid of cells, deferred mine placement and reveal propagation.
///
/// Mines are placed on the first reveal, so the first revealed cell (and optionally its neighbors, see
/// [`SafeZone`]) is never a mine.
#[derive(Debug)]
pub struct Board {
    config: GameConfig,
    rules: Rules,
    grid: Array2<Cell>,
    mines_placed: bool,
    revealed_safe: CellCount,
    flag_count: CellCount,
    exploded: Option<Coord2>,
    mines_shown: bool,
    placer: Box<dyn MinePlacer>,
}

fn fresh_grid(size: Coord2) -> Array2<Cell> {
    // `size` comes from a validated config, both axes fit in `Coord`
    Array2::from_shape_fn(grid_index(size), |(x, y)| Cell::new((x as Coord, y as Coord)))
}

impl Board {
    /// Board with uniformly random mine placement.
    pub fn new(config: GameConfig, rules: Rules) -> Result<Self> {
        Self::with_placer(config, rules, Box::new(RandomMinePlacer::from_entropy()))
    }

    pub fn with_placer(config: GameConfig, rules: Rules, placer: Box<dyn MinePlacer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rules,
            grid: fresh_grid(config.size),
            mines_placed: false,
            revealed_safe: 0,
            flag_count: 0,
            exploded: None,
            mines_shown: false,
            placer,
        })
    }

    /// Board with a known layout, still placed lazily on the first reveal.
    pub fn with_mines(config: GameConfig, rules: Rules, mines: &[Coord2]) -> Result<Self> {
        Self::with_placer(config, rules, Box::new(FixedMinePlacer::new(mines)))
    }

    /// Discards the grid for a fresh unplaced one, keeping the rules and the placer.
    pub fn reset(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.grid = fresh_grid(config.size);
        self.mines_placed = false;
        self.revealed_safe = 0;
        self.flag_count = 0;
        self.exploded = None;
        self.mines_shown = false;
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Takes effect on the next mine placement.
    pub fn set_placer(&mut self, placer: Box<dyn MinePlacer>) {
        self.placer = placer;
    }

    /// Changing the safe zone only has an effect before mines are placed.
    pub fn set_rules(&mut self, rules: Rules) {
        self.rules = rules;
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.config.safe_cells()
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flag_count as isize)
    }

    /// The mine that was revealed by a move, if any.
    pub fn exploded(&self) -> Option<Coord2> {
        self.exploded
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (width, height) = self.config.size;
        if coords.0 < width && coords.1 < height {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.grid.get(grid_index(coords))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter()
    }

    /// Visual state of a cell, `None` outside the board.
    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.cell(coords).map(|cell| self.tile_of(cell))
    }

    /// The up-to-8 in-bounds Chebyshev neighbors of `coords`.
    pub fn neighbors_of(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.config.size)
    }

    /// Places mines anywhere but the safe zone around `excluded`, then computes adjacency counts.
    ///
    /// Runs once per board lifetime, a second call fails with [`GameError::AlreadyPlaced`].
    pub fn place_mines(&mut self, excluded: Coord2) -> Result<()> {
        let excluded = self.validate_coords(excluded)?;
        if self.mines_placed {
            return Err(GameError::AlreadyPlaced);
        }

        let safe = self.safe_zone(excluded);
        let mines = self.placer.place(self.config, &safe);
        self.check_layout(&mines, &safe)?;

        for &coords in &mines {
            self.grid[grid_index(coords)].arm();
        }

        let (width, height) = self.config.size;
        for x in 0..width {
            for y in 0..height {
                let coords = (x, y);
                let count = self
                    .neighbors_of(coords)
                    .filter(|&pos| self.grid[grid_index(pos)].is_mine())
                    .count();
                self.grid[grid_index(coords)].set_adjacent_mines(count as u8);
            }
        }

        self.mines_placed = true;
        log::debug!(
            "Mines placed for {:?}, first cell at {:?}",
            self.config,
            excluded
        );
        Ok(())
    }

    /// Reveals a hidden cell, flood filling over zero-count cells.
    ///
    /// Places the mines first if this is the first reveal. Revealed and flagged cells are left alone and give an empty
    /// change-set.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealReport> {
        let coords = self.validate_coords(coords)?;

        if !self.grid[grid_index(coords)].state().is_openable() {
            return Ok(RevealReport::unchanged());
        }

        if !self.mines_placed {
            self.place_mines(coords)?;
        }

        Ok(self.open(coords))
    }

    /// Cycles the marking of an unrevealed cell: hidden, flagged, questioned (when enabled), hidden.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<CellState> {
        use CellState::*;

        let coords = self.validate_coords(coords)?;
        let current = self.grid[grid_index(coords)].state();

        let next = match current {
            Hidden => Flagged,
            Flagged if self.rules.question_marks => Questioned,
            Flagged => Hidden,
            Questioned => Hidden,
            Revealed => return Ok(Revealed),
        };

        if next == Flagged {
            self.flag_count += 1;
        } else if current == Flagged {
            self.flag_count -= 1;
        }
        self.grid[grid_index(coords)].set_state(next);

        Ok(next)
    }

    /// Reveals the unmarked neighbors of a numbered cell once as many neighbors are flagged as its number says.
    ///
    /// Every target is opened. A mine among them makes the merged outcome [`RevealOutcome::MineHit`].
    pub fn chord(&mut self, coords: Coord2) -> Result<RevealReport> {
        let coords = self.validate_coords(coords)?;
        let cell = self.grid[grid_index(coords)];

        if cell.state() != CellState::Revealed || cell.is_mine() || cell.adjacent_mines() == 0 {
            return Ok(RevealReport::unchanged());
        }

        if self.count_flagged_neighbors(coords) != cell.adjacent_mines() {
            return Ok(RevealReport::unchanged());
        }

        let targets: SmallVec<[Coord2; 8]> = self
            .neighbors_of(coords)
            .filter(|&pos| self.grid[grid_index(pos)].state().is_openable())
            .collect();

        let mut report = RevealReport::unchanged();
        for pos in targets {
            report.merge(self.open(pos));
        }
        Ok(report)
    }

    /// Reveals every unflagged mine and exposes wrong flags, for display after a loss.
    pub fn show_mines(&mut self) -> Vec<CellChange> {
        use CellState::*;

        self.mines_shown = true;
        let mut changes = Vec::new();
        let (width, height) = self.config.size;
        for y in 0..height {
            for x in 0..width {
                let coords = (x, y);
                let cell = self.grid[grid_index(coords)];
                match (cell.is_mine(), cell.state()) {
                    (true, Hidden | Questioned) => {
                        self.grid[grid_index(coords)].set_state(Revealed);
                        changes.push(self.change_at(coords));
                    }
                    (false, Flagged) => changes.push(self.change_at(coords)),
                    _ => {}
                }
            }
        }
        changes
    }

    /// Flags every remaining mine, for display after a win.
    pub fn flag_mines(&mut self) -> Vec<CellChange> {
        let mut changes = Vec::new();
        let (width, height) = self.config.size;
        for y in 0..height {
            for x in 0..width {
                let coords = (x, y);
                let cell = self.grid[grid_index(coords)];
                if cell.is_mine() && cell.state().is_openable() {
                    self.grid[grid_index(coords)].set_state(CellState::Flagged);
                    self.flag_count += 1;
                    changes.push(self.change_at(coords));
                }
            }
        }
        changes
    }

    /// Opens a single cell, breadth-first over zero-count cells.
    fn open(&mut self, coords: Coord2) -> RevealReport {
        let cell = self.grid[grid_index(coords)];

        if !cell.state().is_openable() {
            return RevealReport::unchanged();
        }

        if cell.is_mine() {
            self.grid[grid_index(coords)].set_state(CellState::Revealed);
            self.exploded = Some(coords);
            log::debug!("Mine hit at {:?}", coords);
            return RevealReport {
                outcome: RevealOutcome::MineHit,
                changes: vec![self.change_at(coords)],
                new_record: false,
            };
        }

        let mut changes = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(coords);
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let visit_cell = self.grid[grid_index(visit_coords)];

            // flagged or already opened cells stop the fill
            if !visit_cell.state().is_openable() {
                continue;
            }

            self.grid[grid_index(visit_coords)].set_state(CellState::Revealed);
            self.revealed_safe += 1;
            changes.push(self.change_at(visit_coords));
            log::trace!(
                "Opened cell at {:?}, mine count: {}",
                visit_coords,
                visit_cell.adjacent_mines()
            );

            if visit_cell.adjacent_mines() == 0 {
                for pos in self.neighbors_of(visit_coords) {
                    if self.grid[grid_index(pos)].state().is_openable() && visited.insert(pos) {
                        to_visit.push_back(pos);
                    }
                }
            }
        }

        let outcome = if self.revealed_safe == self.config.safe_cells() {
            RevealOutcome::AllSafeRevealed
        } else {
            RevealOutcome::Continue
        };

        RevealReport {
            outcome,
            changes,
            new_record: false,
        }
    }

    fn safe_zone(&self, start: Coord2) -> SmallVec<[Coord2; 9]> {
        let mut zone = SmallVec::new();
        zone.push(start);

        if self.rules.safe_zone == SafeZone::Neighborhood {
            let neighbors: SmallVec<[Coord2; 8]> = self.neighbors_of(start).collect();
            let needed = usize::from(self.config.mines) + 1 + neighbors.len();
            if needed <= usize::from(self.config.total_cells()) {
                zone.extend(neighbors);
            } else {
                log::warn!("Cannot keep the neighbors of {:?} free, fallback to the cell alone", start);
            }
        }

        zone
    }

    fn check_layout(&self, mines: &[Coord2], safe: &[Coord2]) -> Result<()> {
        let mut seen = HashSet::with_capacity(mines.len());
        let fits = mines.len() == usize::from(self.config.mines)
            && mines.iter().all(|&coords| {
                self.validate_coords(coords).is_ok() && !safe.contains(&coords) && seen.insert(coords)
            });

        if fits {
            Ok(())
        } else {
            log::warn!("Rejected mine layout {:?} for {:?}", mines, self.config);
            Err(GameError::InvalidLayout)
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors_of(coords)
            .filter(|&pos| self.grid[grid_index(pos)].state() == CellState::Flagged)
            .count() as u8
    }

    fn change_at(&self, coords: Coord2) -> CellChange {
        CellChange {
            position: coords,
            tile: self.tile_of(&self.grid[grid_index(coords)]),
        }
    }

    fn tile_of(&self, cell: &Cell) -> Tile {
        use CellState::*;
        match cell.state() {
            Hidden => Tile::Hidden,
            Questioned => Tile::Questioned,
            Flagged if self.mines_shown && !cell.is_mine() => Tile::WrongFlag,
            Flagged => Tile::Flagged,
            Revealed if cell.is_mine() && self.exploded == Some(cell.position()) => Tile::Exploded,
            Revealed if cell.is_mine() => Tile::Mine,
            Revealed => Tile::Open(cell.adjacent_mines()),
        }
    }
}
