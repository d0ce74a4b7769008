use std::fmt;
use std::str::FromStr;

use crate::error::ChessError;

pub const BOARD_SIZE: u8 = 8;

/// A square on the grid. Rank index 0 is the row of the black back rank
/// (algebraic rank 8), file index 0 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub rank: u8,
    pub file: u8,
}

impl Square {
    pub fn new(rank: u8, file: u8) -> Option<Self> {
        if rank < BOARD_SIZE && file < BOARD_SIZE {
            Some(Self { rank, file })
        } else {
            None
        }
    }

    pub fn offset(&self, dr: i8, df: i8) -> Option<Square> {
        let rank = self.rank as i8 + dr;
        let file = self.file as i8 + df;
        if in_bounds(rank, file) {
            Some(Square {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    pub fn is_on_edge(&self) -> bool {
        self.rank == 0 || self.rank == BOARD_SIZE - 1 || self.file == 0 || self.file == BOARD_SIZE - 1
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square { rank, file }))
    }
}

pub fn in_bounds(rank: i8, file: i8) -> bool {
    (0..BOARD_SIZE as i8).contains(&rank) && (0..BOARD_SIZE as i8).contains(&file)
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = match bytes[0] {
            b @ b'a'..=b'h' => b - b'a',
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        let rank = match bytes[1] {
            b @ b'1'..=b'8' => BOARD_SIZE - (b - b'0'),
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        Ok(Square { rank, file })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, BOARD_SIZE - self.rank)
    }
}
