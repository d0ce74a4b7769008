use tracing::{debug, info};

use crate::board::Position;
use crate::config::EngineConfig;
use crate::error::ChessError;
use crate::movegen::{Move, MoveGenerator};
use crate::rules::Rules;
use crate::search::{Search, SearchResult};
use crate::square::Square;

/// A game in progress: the position plus the legal moves of the side to
/// move, kept in step after every committed or retracted move.
pub struct Game {
    position: Position,
    rules: Rules,
    search: Search,
    legal_moves: Vec<Move>,
}

impl Game {
    pub fn new(config: &EngineConfig) -> Result<Self, ChessError> {
        config.validate()?;
        let rules = Rules::new(MoveGenerator::with_promotion(config.promotion_piece()?));
        let mut search = Search::new(rules.clone());
        search.set_max_depth(config.max_search_depth);
        search.set_depth(config.search_depth)?;
        if let Some(seed) = config.seed {
            search.set_seed(seed);
        }
        Ok(Self::from_parts(config.starting_position()?, rules, search))
    }

    pub fn from_position(position: Position) -> Self {
        let rules = Rules::default();
        let search = Search::new(rules.clone());
        Self::from_parts(position, rules, search)
    }

    fn from_parts(position: Position, rules: Rules, search: Search) -> Self {
        let mut game = Self {
            position,
            rules,
            search,
            legal_moves: Vec::new(),
        };
        game.refresh();
        game
    }

    fn refresh(&mut self) {
        self.legal_moves = self.rules.update_state(&mut self.position);
        let state = self.position.state;
        if state.checkmate {
            info!(loser = state.side_to_move.name(), "checkmate");
        } else if state.stalemate {
            info!(side = state.side_to_move.name(), "stalemate");
        } else if state.check {
            info!(side = state.side_to_move.name(), "in check");
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn is_over(&self) -> bool {
        self.legal_moves.is_empty()
    }

    pub fn find_move(&self, from: Square, to: Square) -> Option<Move> {
        self.legal_moves
            .iter()
            .find(|mv| mv.from == from && mv.to == to)
            .copied()
    }

    /// Commits the legal move going from `from` to `to`. Nothing changes
    /// if there is none.
    pub fn play(&mut self, from: Square, to: Square) -> Result<Move, ChessError> {
        let mv = self.find_move(from, to).ok_or_else(|| ChessError::IllegalMove {
            from: from.to_string(),
            to: to.to_string(),
        })?;
        self.position.apply(&mv);
        info!(from = %mv.from, to = %mv.to, capture = mv.is_capture(), "move played");
        self.refresh();
        Ok(mv)
    }

    /// Takes back the last committed move.
    pub fn undo_last(&mut self) -> Option<Move> {
        let mv = *self.position.last_move()?;
        self.position.undo(&mv);
        debug!(from = %mv.from, to = %mv.to, "move taken back");
        self.refresh();
        Some(mv)
    }

    pub fn best_move(&mut self) -> Option<SearchResult> {
        self.search.find_best_move(&mut self.position, &self.legal_moves)
    }
}
