use thiserror::Error;

use crate::coin::Coin;
use crate::grid::Cell;

/// Every recoverable failure the game core can report. None of these should end
/// a running session; the wasm surface turns them into no-ops or JS errors.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("cache at {cell} has no coins to collect")]
    EmptyCache { cell: Cell },

    #[error("coin {coin} is not held in the player inventory")]
    InvalidCoin { coin: Coin },

    #[error("no active cache at {cell}")]
    NoCacheAt { cell: Cell },

    #[error("stored cache data under [{key}] is corrupt: {reason}")]
    CorruptMemento { key: String, reason: String },

    #[error("reset confirmation text did not match")]
    MalformedConfirmation,

    #[error("unknown direction [{0}], expected north, south, east or west")]
    UnknownDirection(String),

    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("storage backend error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
