use thiserror::Error;

/// The §7 error taxonomy. Command handlers return this; the dispatcher maps
/// each variant to an inline message and a log level without the handler
/// needing to know about either.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    User(String),

    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    State(String),

    #[error("persistence error: {0}")]
    Io(#[from] anyhow::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// The line shown to the offending session. Internal errors are never
    /// detailed to the client.
    pub fn user_message(&self) -> String {
        match self {
            GameError::User(msg)
            | GameError::Permission(msg)
            | GameError::NotFound(msg)
            | GameError::State(msg) => msg.clone(),
            GameError::Io(_) => "Something went wrong saving that. Try again shortly.".to_string(),
            GameError::Protocol(_) => "Protocol error.".to_string(),
            GameError::Internal(_) => "Something went wrong. The incident has been logged.".to_string(),
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            GameError::User(_) | GameError::NotFound(_) | GameError::State(_) => log::Level::Info,
            GameError::Permission(_) => log::Level::Info,
            GameError::Io(_) => log::Level::Error,
            GameError::Protocol(_) => log::Level::Warn,
            GameError::Internal(_) => log::Level::Error,
        }
    }

    /// Whether the connection hosting this error should be disconnected.
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(self, GameError::Protocol(_))
    }
}
