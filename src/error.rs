use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChessError {
    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: String, to: String },

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("search depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u32, max: u32 },

    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Toml(#[from] toml::de::Error),
}
