use crate::board::{Color, Piece, PieceHandle, Position};
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub from: Piece,
    pub to: Piece,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Castling {
    pub direction: i8,
    pub rook: PieceHandle,
    pub rook_from: Square,
    pub rook_to: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceHandle,
    pub captured: Option<PieceHandle>,
    pub promotion: Option<Promotion>,
    pub is_en_passant: bool,
    pub castling: Option<Castling>,
    /// Whether the move covers `to` for check and castling purposes.
    pub pot_threat: bool,
    /// The mover had never moved before this move.
    pub first_move: bool,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceHandle, first_move: bool) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            is_en_passant: false,
            castling: None,
            pot_threat: true,
            first_move,
        }
    }

    pub fn new_capture(
        from: Square,
        to: Square,
        piece: PieceHandle,
        first_move: bool,
        captured: PieceHandle,
    ) -> Self {
        Self {
            captured: Some(captured),
            ..Self::new(from, to, piece, first_move)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenMode {
    /// Pseudo-legal moves the piece can play.
    Moves,
    /// Squares the piece covers: captures, empty pawn diagonals and quiet
    /// moves of every piece but the pawn. Castling is never a threat.
    Threats,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, -1), (2, 1), (1, 2), (-1, 2),
    (-2, 1), (-2, -1), (-1, -2), (1, -2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1), (-1, 1), (-1, -1), (1, -1),
    (0, 1), (0, -1), (1, 0), (-1, 0),
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 1), (-1, 1), (-1, -1), (1, -1),
    (0, 1), (0, -1), (1, 0), (-1, 0),
];

#[derive(Debug, Clone)]
pub struct MoveGenerator {
    pub promotion: Piece,
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self {
            promotion: Piece::Queen,
        }
    }

    pub fn with_promotion(promotion: Piece) -> Self {
        Self { promotion }
    }

    /// Pseudo-legal moves of every living piece of `color`.
    pub fn generate_moves(&self, position: &Position, color: Color) -> Vec<Move> {
        self.generate(position, color, GenMode::Moves)
    }

    /// Threat moves of every living piece of `color`.
    pub fn generate_threats(&self, position: &Position, color: Color) -> Vec<Move> {
        self.generate(position, color, GenMode::Threats)
    }

    fn generate(&self, position: &Position, color: Color, mode: GenMode) -> Vec<Move> {
        let mut moves = Vec::new();
        for (handle, record) in position.registry.alive() {
            if record.color == color {
                self.generate_piece(position, handle, mode, &mut moves);
            }
        }
        moves
    }

    pub fn generate_piece(
        &self,
        position: &Position,
        handle: PieceHandle,
        mode: GenMode,
        moves: &mut Vec<Move>,
    ) {
        match position.registry[handle].kind {
            Piece::Pawn => self.pawn_moves(position, handle, mode, moves),
            Piece::Knight => self.step_moves(position, handle, &KNIGHT_OFFSETS, moves),
            Piece::Bishop => self.slide_moves(position, handle, &BISHOP_DIRECTIONS, moves),
            Piece::Rook => self.slide_moves(position, handle, &ROOK_DIRECTIONS, moves),
            Piece::Queen => self.slide_moves(position, handle, &QUEEN_DIRECTIONS, moves),
            Piece::King => {
                self.step_moves(position, handle, &KING_OFFSETS, moves);
                if mode == GenMode::Moves {
                    self.castling_moves(position, handle, moves);
                }
            }
        }
    }

    fn is_enemy(&self, position: &Position, square: Square, color: Color) -> Option<PieceHandle> {
        position
            .piece_at(square)
            .filter(|(_, record)| record.color != color)
            .map(|(handle, _)| handle)
    }

    fn promote(&self, mut mv: Move, color: Color) -> Move {
        if mv.to.rank == color.promotion_rank() {
            mv.promotion = Some(Promotion {
                from: Piece::Pawn,
                to: self.promotion,
            });
        }
        mv
    }

    fn pawn_moves(&self, position: &Position, handle: PieceHandle, mode: GenMode, moves: &mut Vec<Move>) {
        let pawn = &position.registry[handle];
        let from = pawn.square;
        let color = pawn.color;
        let first_move = !pawn.has_moved;
        let forward = color.forward();

        // Pushes, stopping at the first occupied square
        if mode == GenMode::Moves {
            let limit = if pawn.has_moved { 1 } else { 2 };
            let mut target = from.offset(forward, 0);
            let mut steps = 1;
            while let Some(to) = target {
                if steps > limit || !position.board.is_empty(to) {
                    break;
                }
                let mut mv = Move::new(from, to, handle, first_move);
                mv.pot_threat = false;
                moves.push(self.promote(mv, color));
                target = to.offset(forward, 0);
                steps += 1;
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(forward, df) else {
                continue;
            };

            if let Some(captured) = self.is_enemy(position, to, color) {
                let mv = Move::new_capture(from, to, handle, first_move, captured);
                moves.push(self.promote(mv, color));
            } else if mode == GenMode::Threats {
                moves.push(Move::new(from, to, handle, first_move));
            }

            if from.rank == color.en_passant_rank() && position.board.is_empty(to) {
                if let Some(mv) = self.en_passant(position, handle, from, to, df) {
                    moves.push(mv);
                }
            }
        }
    }

    /// En passant is available against an enemy pawn beside `from` whose
    /// only move so far is the last ply of the game.
    fn en_passant(&self, position: &Position, handle: PieceHandle, from: Square, to: Square, df: i8) -> Option<Move> {
        let pawn = &position.registry[handle];
        let beside = from.offset(0, df)?;
        let (victim, record) = position.piece_at(beside)?;
        if record.kind != Piece::Pawn || record.color == pawn.color || record.history.len() != 1 {
            return None;
        }
        if position.last_move().map(|mv| mv.piece) != Some(victim) {
            return None;
        }
        let mut mv = Move::new_capture(from, to, handle, !pawn.has_moved, victim);
        mv.is_en_passant = true;
        Some(mv)
    }

    fn step_moves(&self, position: &Position, handle: PieceHandle, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
        let piece = &position.registry[handle];
        let from = piece.square;
        let first_move = !piece.has_moved;

        for &(dr, df) in offsets {
            let Some(to) = from.offset(dr, df) else {
                continue;
            };
            match position.piece_at(to) {
                None => moves.push(Move::new(from, to, handle, first_move)),
                Some((captured, record)) if record.color != piece.color => {
                    moves.push(Move::new_capture(from, to, handle, first_move, captured));
                }
                Some(_) => {}
            }
        }
    }

    fn slide_moves(&self, position: &Position, handle: PieceHandle, directions: &[(i8, i8)], moves: &mut Vec<Move>) {
        let piece = &position.registry[handle];
        let from = piece.square;
        let first_move = !piece.has_moved;

        for &(dr, df) in directions {
            let mut target = from.offset(dr, df);
            while let Some(to) = target {
                match position.piece_at(to) {
                    None => {
                        moves.push(Move::new(from, to, handle, first_move));
                        target = to.offset(dr, df);
                    }
                    Some((captured, record)) => {
                        if record.color != piece.color {
                            moves.push(Move::new_capture(from, to, handle, first_move, captured));
                        }
                        break;
                    }
                }
            }
        }
    }

    /// Castling candidates. Transit safety is checked by the rules, not here.
    fn castling_moves(&self, position: &Position, handle: PieceHandle, moves: &mut Vec<Move>) {
        let king = &position.registry[handle];
        if king.has_moved {
            return;
        }
        let from = king.square;

        for direction in [-1i8, 1] {
            // Walk towards the edge until the first occupied square
            let mut target = from.offset(0, direction);
            while let Some(square) = target {
                if !position.board.is_empty(square) {
                    break;
                }
                target = square.offset(0, direction);
            }
            let Some(rook_from) = target else {
                continue;
            };
            let Some((rook, record)) = position.piece_at(rook_from) else {
                continue;
            };
            if record.kind != Piece::Rook || record.color != king.color || record.has_moved {
                continue;
            }
            // The king needs two empty squares to travel over
            if (rook_from.file as i8 - from.file as i8).abs() < 3 {
                continue;
            }
            let (Some(to), Some(rook_to)) = (from.offset(0, 2 * direction), from.offset(0, direction)) else {
                continue;
            };

            let mut mv = Move::new(from, to, handle, true);
            mv.pot_threat = false;
            mv.castling = Some(Castling {
                direction,
                rook,
                rook_from,
                rook_to,
            });
            moves.push(mv);
        }
    }
}
