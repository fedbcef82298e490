use core::fmt::Write;
use sweeper_core::{GameSession, GameStatus, RecordBook, Tile};

fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Hidden => '#',
        Tile::Flagged => 'F',
        Tile::Questioned => '?',
        Tile::Open(0) => '.',
        Tile::Open(count) => char::from(b'0' + count),
        Tile::Mine => '*',
        Tile::Exploded => 'X',
        Tile::WrongFlag => 'x',
    }
}

fn face(status: GameStatus) -> &'static str {
    match status {
        GameStatus::NotStarted | GameStatus::InProgress => ":)",
        GameStatus::Won => "B)",
        GameStatus::Lost => "X(",
    }
}

/// Counter header and grid with column and row numbers.
pub(crate) fn board(session: &GameSession) -> String {
    let (width, height) = session.size();
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(
        out,
        "mines {:03}  {}  time {:03}",
        session.mines_left(),
        face(session.status()),
        session.tick()
    );

    out.push_str("   ");
    for x in 0..width {
        let _ = write!(out, "{x:>3}");
    }
    out.push('\n');

    for y in 0..height {
        let _ = write!(out, "{y:>3}");
        for x in 0..width {
            let _ = write!(out, "{:>3}", session.tile_at((x, y)).map_or(' ', tile_char));
        }
        out.push('\n');
    }
    out
}

pub(crate) fn records(book: &RecordBook) -> String {
    if book.is_empty() {
        return "No best times yet\n".to_owned();
    }

    let mut out = String::new();
    for (tier, entry) in book.iter() {
        let _ = writeln!(out, "{:<20} {:>4}s  {}", tier.to_string(), entry.elapsed_seconds, entry.holder);
    }
    out
}
