use crate::board::{Color, Piece, Position};
use crate::rules::Rules;

pub struct Evaluator {
    // Piece values
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    // Every piece value is scaled by this before summing
    pub material_scale: i32,
    pub mobility_weight: i32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 1,
            knight_value: 3,
            bishop_value: 3,
            rook_value: 5,
            queen_value: 9,
            king_value: 20,

            material_scale: 10,
            mobility_weight: 1,
        }
    }

    pub fn piece_value(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => self.king_value,
        }
    }

    /// Material balance, positive when White is ahead.
    pub fn material(&self, position: &Position) -> i32 {
        position
            .registry
            .alive()
            .map(|(_, record)| {
                let value = self.piece_value(record.kind) * self.material_scale;
                if record.color == Color::White { value } else { -value }
            })
            .sum()
    }

    /// Mobility from the point of view of the side to move, then signed so
    /// that positive still favours White.
    pub fn mobility(&self, side_to_move: Color, own_moves: usize, opponent_moves: usize) -> i32 {
        let score = (own_moves as i32 - opponent_moves as i32) * self.mobility_weight;
        match side_to_move {
            Color::White => score,
            Color::Black => -score,
        }
    }

    /// Scores a leaf. `own_moves` is the number of legal moves of the side
    /// to move, already known to the caller.
    pub fn evaluate(&self, position: &mut Position, rules: &Rules, own_moves: usize) -> i32 {
        let side_to_move = position.state.side_to_move;
        let opponent_moves = rules.legal_moves_for(position, side_to_move.opposite()).len();
        self.material(position) + self.mobility(side_to_move, own_moves, opponent_moves)
    }
}
