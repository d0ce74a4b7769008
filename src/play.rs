use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::warn;

use crate::board::{Color, Outcome, Position};
use crate::config::EngineConfig;
use crate::game::Game;
use crate::square::{Square, BOARD_SIZE};

const WHITE_COLOR: &str = "\x1b[91m";
const BLACK_COLOR: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// Parses `"e2 e4"`. Anything else yields `None`, which never matches a
/// legal move.
pub fn parse_move_input(input: &str) -> Option<(Square, Square)> {
    let input = input.trim();
    if input.len() != 5 || input.as_bytes()[2] != b' ' {
        return None;
    }
    let from = input[0..2].parse().ok()?;
    let to = input[3..5].parse().ok()?;
    Some((from, to))
}

fn paint(text: &str, color: Color, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let code = match color {
        Color::White => WHITE_COLOR,
        Color::Black => BLACK_COLOR,
    };
    format!("{}{}{}", code, text, RESET)
}

/// Board with rank 8 on top, followed by the turn and any check or end of
/// game annotation.
pub fn render(position: &Position, use_color: bool) -> String {
    let mut out = String::new();
    out.push_str("   * * * * * * * * * *\n");
    for rank in 0..BOARD_SIZE {
        out.push_str(&format!(" {} * ", BOARD_SIZE - rank));
        for file in 0..BOARD_SIZE {
            match position.piece_at(Square { rank, file }) {
                Some((_, record)) => {
                    let mut letter = record.kind.to_char();
                    // Case tells the sides apart when there is no colour
                    if !use_color && record.color == Color::White {
                        letter = letter.to_ascii_uppercase();
                    }
                    out.push_str(&paint(&letter.to_string(), record.color, use_color));
                }
                None => out.push('_'),
            }
            out.push(' ');
        }
        out.push_str("*\n");
    }
    out.push_str("   * * * * * * * * * *\n     a b c d e f g h\n");

    let state = position.state;
    let side = state.side_to_move;
    out.push_str(&format!("\nTurn : {}\n", paint(side.name(), side, use_color)));
    let annotation = match state.outcome() {
        Some(Outcome::Checkmate { winner }) => format!("{} in check mate, {} wins", side.name(), winner.name()),
        Some(Outcome::Stalemate) => format!("{} has no legal move, stalemate", side.name()),
        None if state.check => format!("{} in check", side.name()),
        None => String::new(),
    };
    if !annotation.is_empty() {
        out.push_str(&paint(&annotation, side, use_color));
        out.push('\n');
    }
    out
}

pub struct ConsoleGame {
    game: Game,
    suggest_moves: bool,
    color_output: bool,
}

impl ConsoleGame {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            game: Game::new(config)?,
            suggest_moves: config.suggest_moves,
            color_output: config.color_output,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run(&mut self, reader: &mut impl BufRead, writer: &mut impl Write) -> Result<()> {
        let mut line = String::new();

        loop {
            write!(writer, "{}", render(self.game.position(), self.color_output))?;
            if self.game.is_over() {
                break;
            }

            if self.suggest_moves {
                if let Some(result) = self.game.best_move() {
                    writeln!(
                        writer,
                        "Best move : {} {} (score {})",
                        result.best_move.from, result.best_move.to, result.score
                    )?;
                }
            }

            write!(writer, "\nNext move (\"from to\" format, ex: \"e2 e4\") : ")?;
            writer.flush()?;

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            match line.trim() {
                "quit" => break,
                "undo" => {
                    if self.game.undo_last().is_none() {
                        warn!("no move to take back");
                    }
                }
                input => match parse_move_input(input) {
                    Some((from, to)) => {
                        if let Err(err) = self.game.play(from, to) {
                            warn!(%err, "move rejected");
                        }
                    }
                    None => warn!(input, "could not read move"),
                },
            }
        }

        Ok(())
    }
}
