use anyhow::{Context, bail};
use core::str::FromStr;
use sweeper_core::{Coord, Coord2, Difficulty};

pub(crate) const HELP: &str = "\
Commands:
  r X Y     reveal a cell
  f X Y     cycle flag / question mark on a cell
  c X Y     chord: reveal the neighbors of a satisfied number
  n [TIER]  new game, optionally beginner, intermediate or expert
  b         show best times
  clear     forget all best times
  ?         toggle question marks
  h         this help
  q         quit";

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    New(Option<Difficulty>),
    Records,
    ClearRecords,
    QuestionMarks,
    Help,
    Quit,
}

fn parse_coords<'a>(mut args: impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let (Some(x), Some(y), None) = (args.next(), args.next(), args.next()) else {
        bail!("Expected two coordinates: X Y");
    };
    let x: Coord = x.parse().with_context(|| format!("Bad X coordinate `{x}`"))?;
    let y: Coord = y.parse().with_context(|| format!("Bad Y coordinate `{y}`"))?;
    Ok((x, y))
}

fn parse_tier(name: &str) -> anyhow::Result<Difficulty> {
    Difficulty::ALL
        .into_iter()
        .find(|preset| preset.name().eq_ignore_ascii_case(name))
        .with_context(|| format!("Unknown tier `{name}`"))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command, type `h` for help");
        };

        Ok(match verb.to_ascii_lowercase().as_str() {
            "r" | "reveal" => Self::Reveal(parse_coords(words)?),
            "f" | "flag" => Self::Flag(parse_coords(words)?),
            "c" | "chord" => Self::Chord(parse_coords(words)?),
            "n" | "new" => Self::New(words.next().map(parse_tier).transpose()?),
            "b" | "best" => Self::Records,
            "clear" => Self::ClearRecords,
            "?" => Self::QuestionMarks,
            "h" | "help" => Self::Help,
            "q" | "quit" => Self::Quit,
            other => bail!("Unknown command `{other}`, type `h` for help"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_take_two_coordinates() {
        assert_eq!("r 3 4".parse::<Command>().unwrap(), Command::Reveal((3, 4)));
        assert_eq!("F 0 0".parse::<Command>().unwrap(), Command::Flag((0, 0)));
        assert_eq!("chord 12 7".parse::<Command>().unwrap(), Command::Chord((12, 7)));
        assert!("r 3".parse::<Command>().is_err());
        assert!("r 3 4 5".parse::<Command>().is_err());
        assert!("r -1 4".parse::<Command>().is_err());
        assert!("r 300 4".parse::<Command>().is_err());
    }

    #[test]
    fn new_game_accepts_an_optional_tier() {
        assert_eq!("n".parse::<Command>().unwrap(), Command::New(None));
        assert_eq!(
            "new Expert".parse::<Command>().unwrap(),
            Command::New(Some(Difficulty::Expert))
        );
        assert!("n insane".parse::<Command>().is_err());
    }

    #[test]
    fn other_commands() {
        assert_eq!("b".parse::<Command>().unwrap(), Command::Records);
        assert_eq!("clear".parse::<Command>().unwrap(), Command::ClearRecords);
        assert_eq!("?".parse::<Command>().unwrap(), Command::QuestionMarks);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
