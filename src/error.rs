use thiserror::Error;

/// Result type for room operations
pub type GameResult<T> = Result<T, GameError>;

/// Request-scoped failures. None of these are fatal; they are reported back
/// to the originating connection and leave other rooms untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Game already in progress")]
    GameInProgress,

    #[error("Game is not in progress")]
    GameNotInProgress,

    #[error("Only the host can do that")]
    NotHost,

    #[error("Need at least {min} players to start (have {have})")]
    InsufficientPlayers { min: usize, have: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl GameError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Stable machine-readable code sent in `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::GameInProgress => "GAME_IN_PROGRESS",
            Self::GameNotInProgress => "GAME_NOT_IN_PROGRESS",
            Self::NotHost => "NOT_HOST",
            Self::InsufficientPlayers { .. } => "INSUFFICIENT_PLAYERS",
            Self::InvalidState(_) => "INVALID_STATE",
        }
    }
}
