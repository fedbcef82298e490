use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use sweeper_core::{CellCount, Coord, Difficulty, GameConfig, Rules};

/// Tier used when neither the settings file nor the command line picks one.
pub(crate) const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Expert;

/// Everything the launcher can be configured with, read from an optional TOML file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub difficulty: Option<Difficulty>,
    /// Takes precedence over `difficulty` when present
    pub custom: Option<CustomSize>,
    pub rules: Rules,
    pub records: RecordSettings,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CustomSize {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RecordSettings {
    pub path: PathBuf,
    pub include_custom: bool,
    pub default_holder: String,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("best_times.csv"),
            include_custom: false,
            default_holder: sweeper_core::DEFAULT_HOLDER.to_owned(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        let settings = toml::from_str(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn game_config(&self) -> sweeper_core::Result<GameConfig> {
        match self.custom {
            Some(CustomSize {
                width,
                height,
                mines,
            }) => GameConfig::new((width, height), mines),
            None => Ok(self.difficulty.unwrap_or(DEFAULT_DIFFICULTY).config()),
        }
    }
}
