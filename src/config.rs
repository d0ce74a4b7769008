use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::board::{Color, Piece, Position};
use crate::error::ChessError;
use crate::layout::{parse_diagram, Layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search_depth: u32,
    pub max_search_depth: u32,
    pub promotion: String,
    pub layout: Layout,
    pub diagram: Option<String>,
    pub side_to_move: Side,
    pub suggest_moves: bool,
    pub color_output: bool,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_depth: 1,
            max_search_depth: 3,
            promotion: "queen".to_string(),
            layout: Layout::Standard,
            diagram: None,
            side_to_move: Side::White,
            suggest_moves: true,
            color_output: true,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChessError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ChessError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChessError> {
        if self.search_depth > self.max_search_depth {
            return Err(ChessError::DepthTooLarge {
                depth: self.search_depth,
                max: self.max_search_depth,
            });
        }
        self.promotion_piece()?;
        Ok(())
    }

    /// The piece pawns turn into. Only knight, bishop, rook and queen.
    pub fn promotion_piece(&self) -> Result<Piece, ChessError> {
        match self.promotion.to_ascii_lowercase().as_str() {
            "knight" | "n" => Ok(Piece::Knight),
            "bishop" | "b" => Ok(Piece::Bishop),
            "rook" | "r" => Ok(Piece::Rook),
            "queen" | "q" => Ok(Piece::Queen),
            _ => Err(ChessError::InvalidPromotion(self.promotion.clone())),
        }
    }

    pub fn starting_position(&self) -> Result<Position, ChessError> {
        let side_to_move = self.side_to_move.into();
        match &self.diagram {
            Some(diagram) => parse_diagram(diagram, side_to_move),
            None => self.layout.position(side_to_move),
        }
    }
}
