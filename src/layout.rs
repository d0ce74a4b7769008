use serde::Deserialize;

use crate::board::{Color, Piece, Position};
use crate::error::ChessError;
use crate::square::{Square, BOARD_SIZE};

const STANDARD: &str = "\
rnbqkbnr
pppppppp
........
........
........
........
PPPPPPPP
RNBQKBNR";

// White to play Qxf7 mate.
const CHECKMATE: &str = "\
rnbqk.nr
pppppppp
.......b
........
..B.....
.....Q..
PPPPPPPP
RNB.K.NR";

// The white rook is pinned against its king along the d-file.
const PIN: &str = "\
...K....
........
........
...R....
........
........
........
...q....";

const SCORE: &str = "\
........
........
........
...n....
........
........
P.......
........";

/// Start-up positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Standard,
    Checkmate,
    Pin,
    Score,
}

impl Layout {
    pub fn diagram(&self) -> &'static str {
        match self {
            Layout::Standard => STANDARD,
            Layout::Checkmate => CHECKMATE,
            Layout::Pin => PIN,
            Layout::Score => SCORE,
        }
    }

    pub fn position(&self, side_to_move: Color) -> Result<Position, ChessError> {
        parse_diagram(self.diagram(), side_to_move)
    }
}

/// Builds a position from eight rows of eight characters, rank 8 first.
/// Upper case letters are White, lower case Black, `.` or `_` is empty.
pub fn parse_diagram(text: &str, side_to_move: Color) -> Result<Position, ChessError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(ChessError::InvalidLayout(format!(
            "expected {} rows, found {}",
            BOARD_SIZE,
            rows.len()
        )));
    }

    let mut position = Position::empty(side_to_move);
    for (rank, row) in rows.iter().enumerate() {
        let cells: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() != BOARD_SIZE as usize {
            return Err(ChessError::InvalidLayout(format!(
                "row {} has {} squares",
                rank + 1,
                cells.len()
            )));
        }
        for (file, &c) in cells.iter().enumerate() {
            if c == '.' || c == '_' {
                continue;
            }
            let kind = Piece::from_char(c)
                .ok_or_else(|| ChessError::InvalidLayout(format!("unknown piece {:?}", c)))?;
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let square = Square {
                rank: rank as u8,
                file: file as u8,
            };
            position.place(kind, color, square);
        }
    }

    for color in [Color::White, Color::Black] {
        let kings = position
            .registry
            .iter()
            .filter(|(_, record)| record.kind == Piece::King && record.color == color)
            .count();
        if kings > 1 {
            return Err(ChessError::InvalidLayout(format!(
                "{} has {} kings",
                color.name(),
                kings
            )));
        }
    }

    Ok(position)
}
