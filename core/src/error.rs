use alloc::string::String;
use thiserror::Error;

use crate::types::{PairCount, TileId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Deck needs at least one pair")]
    NoPairs,
    #[error("Deck needs {pairs} face values but only {available} were given")]
    NotEnoughFaceValues { pairs: PairCount, available: usize },
    #[error("Face value {0:?} appears more than once")]
    DuplicateFaceValue(String),
    #[error("Deck layout is inconsistent: {0}")]
    MalformedDeck(&'static str),
    #[error("Too many pairs for a single deck")]
    TooManyPairs,
    #[error("Time budget must be at least one tick")]
    InvalidTimeBudget,
    #[error("Timer durations must be non-zero")]
    InvalidDuration,
    #[error("Invalid config file: {0}")]
    InvalidConfigFile(String),
    #[error("No tile with id {0}")]
    InvalidTile(TileId),
    #[error("No active account, cannot submit the reward")]
    AccountUnavailable,
}

impl GameError {
    /// Whether this error comes from malformed deck or game configuration
    pub const fn is_config(&self) -> bool {
        !matches!(self, Self::InvalidTile(_) | Self::AccountUnavailable)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
