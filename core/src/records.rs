use core::fmt::{self, Debug};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::*;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record row: {0}")]
    Malformed(String),
}

pub type RecordResult<T> = core::result::Result<T, RecordError>;

/// Difficulty tier a best time is kept for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierKey {
    Preset(Difficulty),
    Custom {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
}

impl TierKey {
    pub fn for_config(config: GameConfig) -> Self {
        match Difficulty::matching(config) {
            Some(preset) => Self::Preset(preset),
            None => Self::Custom {
                width: config.width(),
                height: config.height(),
                mines: config.mines,
            },
        }
    }

    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(preset) => f.write_str(preset.name()),
            Self::Custom {
                width,
                height,
                mines,
            } => write!(f, "custom-{width}x{height}x{mines}"),
        }
    }
}

impl FromStr for TierKey {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        if let Some(preset) = Difficulty::ALL.into_iter().find(|preset| preset.name() == s) {
            return Ok(Self::Preset(preset));
        }

        let malformed = || RecordError::Malformed(format!("unknown tier `{s}`"));
        let dims = s.strip_prefix("custom-").ok_or_else(malformed)?;
        let mut parts = dims.split('x');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(width), Some(height), Some(mines), None) => Ok(Self::Custom {
                width: width.parse().map_err(|_| malformed())?,
                height: height.parse().map_err(|_| malformed())?,
                mines: mines.parse().map_err(|_| malformed())?,
            }),
            _ => Err(malformed()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub elapsed_seconds: u32,
    pub holder: String,
}

/// Persistence for the best times, written in full on every change.
pub trait RecordStore: Debug {
    fn load(&self) -> RecordResult<BTreeMap<TierKey, RecordEntry>>;
    fn save(&mut self, records: &BTreeMap<TierKey, RecordEntry>) -> RecordResult<()>;
}

/// Flat file with one `tier,seconds,holder` line per tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> RecordResult<BTreeMap<TierKey, RecordEntry>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(parse_rows(&bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No best times at {}, starting empty", self.path.display());
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, records: &BTreeMap<TierKey, RecordEntry>) -> RecordResult<()> {
        let contents: String = records
            .iter()
            .map(|(tier, entry)| format_row(tier, entry))
            .collect();
        fs::write(&self.path, contents)?;
        log::debug!("Wrote {} best times to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Reads rows, skipping the ones that do not parse. Duplicate tiers keep the fastest time.
///
/// Rows are decoded one by one so a single bad byte only costs its own row.
fn parse_rows(bytes: &[u8]) -> BTreeMap<TierKey, RecordEntry> {
    let mut records = BTreeMap::new();
    for (number, raw) in bytes.split(|&byte| byte == b'\n').enumerate() {
        let row = core::str::from_utf8(raw)
            .map_err(|err| RecordError::Malformed(format!("not UTF-8 ({err})")))
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    parse_row(line).map(Some)
                }
            });
        match row {
            Ok(None) => {}
            Ok(Some((tier, entry))) => {
                let keep = records
                    .get(&tier)
                    .is_none_or(|old: &RecordEntry| entry.elapsed_seconds < old.elapsed_seconds);
                if keep {
                    records.insert(tier, entry);
                }
            }
            Err(err) => log::warn!("Skipping best time on line {}: {}", number + 1, err),
        }
    }
    records
}

fn parse_row(line: &str) -> RecordResult<(TierKey, RecordEntry)> {
    // the holder goes last so it may contain commas
    let mut fields = line.trim_end_matches(['\r', '\n']).splitn(3, ',');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(tier), Some(seconds), Some(holder)) => {
            let tier = tier.trim().parse()?;
            let elapsed_seconds = seconds
                .trim()
                .parse()
                .map_err(|_| RecordError::Malformed(format!("bad time `{seconds}`")))?;
            Ok((
                tier,
                RecordEntry {
                    elapsed_seconds,
                    holder: holder.to_owned(),
                },
            ))
        }
        _ => Err(RecordError::Malformed(format!("expected 3 fields in `{line}`"))),
    }
}

fn format_row(tier: &TierKey, entry: &RecordEntry) -> String {
    let holder = entry.holder.replace(['\r', '\n'], " ");
    format!("{},{},{}\n", tier, entry.elapsed_seconds, holder)
}

/// Best (lowest) completion time per tier.
#[derive(Debug, Default)]
pub struct RecordBook {
    entries: BTreeMap<TierKey, RecordEntry>,
    record_custom: bool,
    store: Option<Box<dyn RecordStore>>,
}

impl RecordBook {
    /// In-memory book that is never persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the book from `store` and writes every change back to it.
    ///
    /// A store that cannot be read gives an empty in-memory book and is left untouched, so its contents survive.
    pub fn load(store: Box<dyn RecordStore>) -> Self {
        let (entries, store) = match store.load() {
            Ok(entries) => (entries, Some(store)),
            Err(err) => {
                log::warn!("Could not load best times, keeping them in memory only: {}", err);
                (BTreeMap::new(), None)
            }
        };
        log::debug!("Loaded {} best times", entries.len());
        Self {
            entries,
            record_custom: false,
            store,
        }
    }

    /// Whether custom tiers may hold records, off by default.
    pub fn with_custom_tiers(mut self, enabled: bool) -> Self {
        self.record_custom = enabled;
        self
    }

    pub fn records_custom_tiers(&self) -> bool {
        self.record_custom
    }

    pub fn get(&self, tier: &TierKey) -> Option<&RecordEntry> {
        self.entries.get(tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TierKey, &RecordEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `elapsed_seconds` would become the new record for `tier`.
    pub fn qualifies(&self, tier: &TierKey, elapsed_seconds: u32) -> bool {
        if tier.is_custom() && !self.record_custom {
            return false;
        }
        self.entries
            .get(tier)
            .is_none_or(|entry| elapsed_seconds < entry.elapsed_seconds)
    }

    /// Stores the time if it beats the current record for `tier` (or there is none), returning whether it did.
    pub fn try_record(&mut self, tier: TierKey, elapsed_seconds: u32, holder: impl Into<String>) -> bool {
        if !self.qualifies(&tier, elapsed_seconds) {
            return false;
        }

        let holder = holder.into();
        log::debug!("New best time for {}: {}s by {:?}", tier, elapsed_seconds, holder);
        self.entries.insert(
            tier,
            RecordEntry {
                elapsed_seconds,
                holder,
            },
        );
        self.flush();
        true
    }

    /// Changes the name on an existing record without touching its time.
    pub fn rename_holder(&mut self, tier: &TierKey, holder: impl Into<String>) -> bool {
        let Some(entry) = self.entries.get_mut(tier) else {
            return false;
        };
        entry.holder = holder.into();
        self.flush();
        true
    }

    /// Forgets every record.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    fn flush(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.save(&self.entries) {
                log::warn!("Could not save best times: {}", err);
            }
        }
    }
}
