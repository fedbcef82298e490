use anyhow::Context;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use sweeper_core::{
    CellCount, Coord, Difficulty, FileRecordStore, GameError, GameSession, GameStatus, MinePlacer,
    RandomMinePlacer, RecordBook, RevealReport, SafeZone,
};
use tracing_subscriber::filter::LevelFilter;

use commands::{Command, HELP};
use settings::{CustomSize, Settings};

mod commands;
mod render;
mod settings;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TierArg {
    Beginner,
    Intermediate,
    Expert,
}

impl From<TierArg> for Difficulty {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Beginner => Difficulty::Beginner,
            TierArg::Intermediate => Difficulty::Intermediate,
            TierArg::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SafeZoneArg {
    Cell,
    Neighborhood,
}

impl From<SafeZoneArg> for SafeZone {
    fn from(zone: SafeZoneArg) -> Self {
        match zone {
            SafeZoneArg::Cell => SafeZone::Cell,
            SafeZoneArg::Neighborhood => SafeZone::Neighborhood,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// TOML settings file, command line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset tier to start with
    #[arg(short, long, value_enum)]
    difficulty: Option<TierArg>,

    /// Custom board width, needs --height and --mines
    #[arg(long, requires_all = ["height", "mines"])]
    width: Option<Coord>,

    /// Custom board height
    #[arg(long, requires_all = ["width", "mines"])]
    height: Option<Coord>,

    /// Custom mine count
    #[arg(long, requires_all = ["width", "height"])]
    mines: Option<CellCount>,

    /// Where best times are kept
    #[arg(long)]
    records: Option<PathBuf>,

    /// Keep best times for custom boards too
    #[arg(long)]
    record_custom: bool,

    /// Which cells around the first click are kept free of mines
    #[arg(long, value_enum)]
    safe_zone: Option<SafeZoneArg>,

    /// Flags cycle straight back to hidden
    #[arg(long)]
    no_question_marks: bool,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(tier) = self.difficulty {
            settings.difficulty = Some(tier.into());
            settings.custom = None;
        }
        if let (Some(width), Some(height), Some(mines)) = (self.width, self.height, self.mines) {
            settings.custom = Some(CustomSize {
                width,
                height,
                mines,
            });
        }
        if let Some(path) = &self.records {
            settings.records.path = path.clone();
        }
        if self.record_custom {
            settings.records.include_custom = true;
        }
        if let Some(zone) = self.safe_zone {
            settings.rules.safe_zone = zone.into();
        }
        if self.no_question_marks {
            settings.rules.question_marks = false;
        }
    }
}

fn level_filter(level: Option<log::Level>) -> LevelFilter {
    match level {
        None => LevelFilter::OFF,
        Some(log::Level::Error) => LevelFilter::ERROR,
        Some(log::Level::Warn) => LevelFilter::WARN,
        Some(log::Level::Info) => LevelFilter::INFO,
        Some(log::Level::Debug) => LevelFilter::DEBUG,
        Some(log::Level::Trace) => LevelFilter::TRACE,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // log records from the engine are bridged into the subscriber
    tracing_subscriber::fmt()
        .with_max_level(level_filter(args.verbose.log_level()))
        .with_writer(io::stderr)
        .init();
    log::debug!("seed: {:?}", args.seed);

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);

    let config = settings.game_config().context("Invalid board size")?;
    let records = RecordBook::load(Box::new(FileRecordStore::new(&settings.records.path)))
        .with_custom_tiers(settings.records.include_custom);
    let placer: Box<dyn MinePlacer> = match args.seed {
        Some(seed) => Box::new(RandomMinePlacer::new(seed)),
        None => Box::new(RandomMinePlacer::from_entropy()),
    };

    let mut session = GameSession::new(config, settings.rules, records)?
        .with_placer(placer)
        .with_default_holder(settings.records.default_holder.clone());

    log::debug!("App started");
    run(&mut session, io::stdin().lock(), &mut io::stdout().lock())
}

/// Reads commands until `q` or end of input, printing the board after every move.
fn run(session: &mut GameSession, mut input: impl BufRead, output: &mut impl Write) -> anyhow::Result<()> {
    write!(output, "{}", render::board(session))?;

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "{err:#}")?;
                continue;
            }
        };

        match command {
            Command::Reveal(coords) => {
                let report = session.reveal_cell(coords);
                after_reveal(session, report, &mut input, output)?;
            }
            Command::Chord(coords) => {
                let report = session.chord_cell(coords);
                after_reveal(session, report, &mut input, output)?;
            }
            Command::Flag(coords) => match session.flag_cell(coords) {
                Ok(state) => {
                    log::debug!("{:?} is now {:?}", coords, state);
                    write!(output, "{}", render::board(session))?;
                }
                Err(err) => report_error(err, output)?,
            },
            Command::New(tier) => {
                session.reset(tier.map(Difficulty::config))?;
                write!(output, "{}", render::board(session))?;
            }
            Command::Records => write!(output, "{}", render::records(session.records()))?,
            Command::ClearRecords => {
                session.records_mut().clear();
                writeln!(output, "Best times cleared")?;
            }
            Command::QuestionMarks => {
                let mut rules = session.rules();
                rules.question_marks = !rules.question_marks;
                session.set_rules(rules);
                let state = if rules.question_marks { "on" } else { "off" };
                writeln!(output, "Question marks {state}")?;
            }
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => break,
        }
    }

    Ok(())
}

fn after_reveal(
    session: &mut GameSession,
    report: sweeper_core::Result<RevealReport>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> anyhow::Result<()> {
    let report = match report {
        Ok(report) => report,
        Err(err) => return report_error(err, output),
    };
    log::debug!("{:?}, {} cells changed", report.outcome, report.changes.len());
    write!(output, "{}", render::board(session))?;

    match session.status() {
        GameStatus::Won => {
            writeln!(output, "You won in {} seconds!", session.tick())?;
            if report.new_record {
                write!(output, "New best time for {}! Your name: ", session.tier())?;
                output.flush()?;
                let mut name = String::new();
                input.read_line(&mut name)?;
                let name = name.trim();
                if !name.is_empty() {
                    session.set_record_holder(name);
                }
            }
        }
        GameStatus::Lost => writeln!(output, "Boom! Type `n` for a new game")?,
        GameStatus::NotStarted | GameStatus::InProgress => {}
    }
    Ok(())
}

/// Moves on a finished game are ignored, anything else is shown to the player.
fn report_error(err: GameError, output: &mut impl Write) -> anyhow::Result<()> {
    match err {
        GameError::InvalidState => log::debug!("Ignoring move, the game is over"),
        err => writeln!(output, "{err}")?,
    }
    Ok(())
}
