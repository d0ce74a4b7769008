use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;
use tracing::debug;

use crate::board::{Color, Position};
use crate::error::ChessError;
use crate::evaluation::Evaluator;
use crate::movegen::Move;
use crate::rules::Rules;

/// One move of the explicit search tree with its backed-up score.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub mv: Move,
    pub score: i32,
    pub children: Vec<SearchNode>,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub nodes: u64,
    pub tree: Vec<SearchNode>,
}

pub struct Search {
    evaluator: Evaluator,
    rules: Rules,
    depth: u32,
    max_depth: u32,
    rng: Option<StdRng>,
    nodes_searched: u64,
}

impl Search {
    pub fn new(rules: Rules) -> Self {
        Self {
            evaluator: Evaluator::new(),
            rules,
            depth: 1,
            max_depth: 3,
            rng: None,
            nodes_searched: 0,
        }
    }

    /// Best move for the side to move among `moves`, which must be its
    /// legal moves. The position is left exactly as it was found.
    pub fn find_best_move(&mut self, position: &mut Position, moves: &[Move]) -> Option<SearchResult> {
        self.nodes_searched = 0;
        let start_time = Instant::now();
        let side = position.state.side_to_move;

        let tree = self.build_tree(position, moves, self.depth);
        let best_score = backup(&tree, side)?;

        let best: Vec<&SearchNode> = tree.iter().filter(|node| node.score == best_score).collect();
        let chosen = match self.rng.as_mut() {
            Some(rng) => best.choose(rng).copied(),
            None => best.first().copied(),
        }?;
        let best_move = chosen.mv;

        debug!(
            depth = self.depth,
            nodes = self.nodes_searched,
            score = best_score,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "search finished"
        );

        Some(SearchResult {
            best_move,
            score: best_score,
            nodes: self.nodes_searched,
            tree,
        })
    }

    /// Plays each move on the shared position, scores or expands the
    /// resulting node, then takes the move back.
    pub fn build_tree(&mut self, position: &mut Position, moves: &[Move], depth: u32) -> Vec<SearchNode> {
        let mut nodes = Vec::with_capacity(moves.len());

        for mv in moves {
            self.nodes_searched += 1;
            position.apply(mv);
            let replies = self.rules.legal_moves(position);

            let node = if depth > 0 && !replies.is_empty() {
                let children = self.build_tree(position, &replies, depth - 1);
                let score = backup(&children, position.state.side_to_move).unwrap_or_default();
                SearchNode {
                    mv: *mv,
                    score,
                    children,
                }
            } else {
                // No replies means checkmate or stalemate; the node is a leaf
                SearchNode {
                    mv: *mv,
                    score: self.evaluator.evaluate(position, &self.rules, replies.len()),
                    children: Vec::new(),
                }
            };

            position.undo(mv);
            nodes.push(node);
        }

        nodes
    }

    pub fn set_depth(&mut self, depth: u32) -> Result<(), ChessError> {
        if depth > self.max_depth {
            return Err(ChessError::DepthTooLarge {
                depth,
                max: self.max_depth,
            });
        }
        self.depth = depth;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
        self.depth = self.depth.min(max_depth);
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

/// Score of a node whose children are `nodes` when `side` is to move there:
/// White takes the highest child score, Black the lowest.
fn backup(nodes: &[SearchNode], side: Color) -> Option<i32> {
    let scores = nodes.iter().map(|node| node.score);
    match side {
        Color::White => scores.max(),
        Color::Black => scores.min(),
    }
}
