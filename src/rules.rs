use tracing::debug;

use crate::board::{Color, Position};
use crate::movegen::{Move, MoveGenerator};
use crate::square::Square;

/// Moves of the side to move (`player`) and threats of its opponent
/// (`holder`), generated in one pass over the same position.
#[derive(Debug, Clone, Default)]
pub struct MoveSets {
    pub player: Vec<Move>,
    pub holder: Vec<Move>,
}

/// True iff one of `opponent_moves` attacks `king_square`.
pub fn is_check(king_square: Square, opponent_moves: &[Move]) -> bool {
    opponent_moves
        .iter()
        .any(|mv| mv.pot_threat && mv.to == king_square)
}

#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub generator: MoveGenerator,
}

impl Rules {
    pub fn new(generator: MoveGenerator) -> Self {
        Self { generator }
    }

    /// Pseudo-legal moves of `color` with unsafe castling removed, together
    /// with the threats of the other side.
    pub fn possible_moves(&self, position: &Position, color: Color) -> MoveSets {
        let mut player = self.generator.generate_moves(position, color);
        let holder = self.generator.generate_threats(position, color.opposite());

        player.retain(|mv| match mv.castling {
            Some(castling) => {
                let transit = [mv.from, castling.rook_to, mv.to];
                !transit.iter().any(|&square| is_check(square, &holder))
            }
            None => true,
        });

        MoveSets { player, holder }
    }

    /// Legal moves of the side to move.
    pub fn legal_moves(&self, position: &mut Position) -> Vec<Move> {
        let color = position.state.side_to_move;
        let candidates = self.possible_moves(position, color).player;
        self.filter_self_check(position, candidates)
    }

    /// Legal moves of `color`, whether or not it is that side's turn.
    pub fn legal_moves_for(&self, position: &mut Position, color: Color) -> Vec<Move> {
        let side_to_move = position.state.side_to_move;
        position.state.side_to_move = color;
        let moves = self.legal_moves(position);
        position.state.side_to_move = side_to_move;
        moves
    }

    /// Drops every candidate that leaves the mover's king attacked. Each
    /// candidate is played and taken back on the shared position.
    pub fn filter_self_check(&self, position: &mut Position, candidates: Vec<Move>) -> Vec<Move> {
        let mut legal = Vec::with_capacity(candidates.len());
        for mv in candidates {
            let color = position.registry[mv.piece].color;
            position.apply(&mv);
            let exposed = self.is_in_check(position, color);
            position.undo(&mv);
            if !exposed {
                legal.push(mv);
            }
        }
        legal
    }

    pub fn is_in_check(&self, position: &Position, color: Color) -> bool {
        match position.king_square(color) {
            Some(king_square) => {
                let threats = self.generator.generate_threats(position, color.opposite());
                is_check(king_square, &threats)
            }
            None => false,
        }
    }

    /// The side to move cannot play anything. Covers both checkmate and
    /// stalemate.
    pub fn has_no_legal_moves(&self, position: &mut Position) -> bool {
        self.legal_moves(position).is_empty()
    }

    pub fn is_checkmate(&self, position: &mut Position) -> bool {
        let color = position.state.side_to_move;
        self.is_in_check(position, color) && self.has_no_legal_moves(position)
    }

    /// Recomputes the check, checkmate and stalemate flags for the side to
    /// move and returns its legal moves.
    pub fn update_state(&self, position: &mut Position) -> Vec<Move> {
        let color = position.state.side_to_move;
        let sets = self.possible_moves(position, color);
        let check = match position.king_square(color) {
            Some(king_square) => is_check(king_square, &sets.holder),
            None => false,
        };
        let legal = self.filter_self_check(position, sets.player);

        position.state.check = check;
        position.state.checkmate = check && legal.is_empty();
        position.state.stalemate = !check && legal.is_empty();
        debug!(
            side = color.name(),
            legal = legal.len(),
            check,
            "updated game state"
        );
        legal
    }
}
