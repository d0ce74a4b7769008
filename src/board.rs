use std::ops::{Index, IndexMut};

use crate::movegen::Move;
use crate::square::{Square, BOARD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step of a pawn push. White moves towards rank index 0.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn promotion_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => BOARD_SIZE - 1,
        }
    }

    /// Rank index a pawn must stand on to capture en passant.
    pub fn en_passant_rank(&self) -> u8 {
        match self {
            Color::White => 3,
            Color::Black => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

/// Stable key of a piece in the [`Registry`]. Valid for the whole game,
/// including while the piece is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceHandle(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct PieceRecord {
    pub kind: Piece,
    pub color: Color,
    pub square: Square,
    pub has_moved: bool,
    pub alive: bool,
    pub history: Vec<Move>,
}

impl PieceRecord {
    pub fn new(kind: Piece, color: Color, square: Square) -> Self {
        Self {
            kind,
            color,
            square,
            has_moved: false,
            alive: true,
            history: Vec::new(),
        }
    }
}

/// Arena owning every piece of the game. Pieces are never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    pieces: Vec<PieceRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: PieceRecord) -> PieceHandle {
        self.pieces.push(record);
        PieceHandle(self.pieces.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceHandle, &PieceRecord)> {
        self.pieces
            .iter()
            .enumerate()
            .map(|(i, record)| (PieceHandle(i), record))
    }

    pub fn alive(&self) -> impl Iterator<Item = (PieceHandle, &PieceRecord)> {
        self.iter().filter(|(_, record)| record.alive)
    }

    pub fn king(&self, color: Color) -> Option<PieceHandle> {
        self.alive()
            .find(|(_, record)| record.kind == Piece::King && record.color == color)
            .map(|(handle, _)| handle)
    }
}

impl Index<PieceHandle> for Registry {
    type Output = PieceRecord;

    fn index(&self, handle: PieceHandle) -> &PieceRecord {
        &self.pieces[handle.0]
    }
}

impl IndexMut<PieceHandle> for Registry {
    fn index_mut(&mut self, handle: PieceHandle) -> &mut PieceRecord {
        &mut self.pieces[handle.0]
    }
}

/// 8x8 grid of handles into the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    cells: [[Option<PieceHandle>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    pub fn get(&self, square: Square) -> Option<PieceHandle> {
        self.cells[square.rank as usize][square.file as usize]
    }

    pub fn set(&mut self, square: Square, handle: PieceHandle) {
        self.cells[square.rank as usize][square.file as usize] = Some(handle);
    }

    pub fn clear(&mut self, square: Square) {
        self.cells[square.rank as usize][square.file as usize] = None;
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub side_to_move: Color,
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
}

impl GameState {
    pub fn new(side_to_move: Color) -> Self {
        Self {
            side_to_move,
            check: false,
            checkmate: false,
            stalemate: false,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.checkmate {
            Some(Outcome::Checkmate {
                winner: self.side_to_move.opposite(),
            })
        } else if self.stalemate {
            Some(Outcome::Stalemate)
        } else {
            None
        }
    }
}

/// Board, registry and game state of one game, mutated only through
/// [`Position::apply`] and [`Position::undo`].
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub board: Board,
    pub registry: Registry,
    pub state: GameState,
    plies: Vec<Move>,
}

impl Position {
    pub fn empty(side_to_move: Color) -> Self {
        Self {
            board: Board::default(),
            registry: Registry::new(),
            state: GameState::new(side_to_move),
            plies: Vec::new(),
        }
    }

    /// Places a new, unmoved piece. Returns `None` if the square is taken.
    pub fn place(&mut self, kind: Piece, color: Color, square: Square) -> Option<PieceHandle> {
        if !self.board.is_empty(square) {
            return None;
        }
        let handle = self.registry.insert(PieceRecord::new(kind, color, square));
        self.board.set(square, handle);
        Some(handle)
    }

    pub fn piece_at(&self, square: Square) -> Option<(PieceHandle, &PieceRecord)> {
        self.board
            .get(square)
            .map(|handle| (handle, &self.registry[handle]))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.registry
            .king(color)
            .map(|handle| self.registry[handle].square)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.plies.last()
    }

    pub fn plies(&self) -> &[Move] {
        &self.plies
    }

    pub fn apply(&mut self, mv: &Move) {
        // Captured pieces stay in the registry so undo can bring them back
        if let Some(captured) = mv.captured {
            let square = self.registry[captured].square;
            self.board.clear(square);
            self.registry[captured].alive = false;
        }

        self.board.clear(mv.from);
        self.board.set(mv.to, mv.piece);

        if let Some(castling) = mv.castling {
            self.board.clear(castling.rook_from);
            self.board.set(castling.rook_to, castling.rook);
            let rook = &mut self.registry[castling.rook];
            rook.square = castling.rook_to;
            rook.has_moved = true;
        }

        let mover = &mut self.registry[mv.piece];
        mover.square = mv.to;
        mover.has_moved = true;
        if let Some(promotion) = mv.promotion {
            mover.kind = promotion.to;
        }
        mover.history.push(*mv);
        let color = mover.color;

        self.plies.push(*mv);
        self.state.side_to_move = color.opposite();
    }

    pub fn undo(&mut self, mv: &Move) {
        debug_assert_eq!(self.plies.last(), Some(mv), "moves must be undone in reverse order");
        self.plies.pop();

        let mover = &mut self.registry[mv.piece];
        mover.history.pop();
        mover.square = mv.from;
        mover.has_moved = !mv.first_move;
        if let Some(promotion) = mv.promotion {
            mover.kind = promotion.from;
        }
        let color = mover.color;

        if let Some(castling) = mv.castling {
            self.board.clear(castling.rook_to);
            self.board.set(castling.rook_from, castling.rook);
            let rook = &mut self.registry[castling.rook];
            rook.square = castling.rook_from;
            // Castling is only generated for a rook that had never moved
            rook.has_moved = false;
        }

        self.board.clear(mv.to);
        self.board.set(mv.from, mv.piece);

        // The captured piece kept its square while dead; en passant puts it
        // back beside the destination rather than on it.
        if let Some(captured) = mv.captured {
            let record = &mut self.registry[captured];
            record.alive = true;
            let square = record.square;
            self.board.set(square, captured);
        }

        self.state.side_to_move = color;
    }
}
