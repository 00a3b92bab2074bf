use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Round {round} resolution stalled after {passes} passes over {intents} intents")]
    ResolutionStalled {
        round: u64,
        passes: usize,
        intents: usize,
    },

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
