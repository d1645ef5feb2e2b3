use thiserror::Error;

/// Failures while decoding the compact log alphabet.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid tile id {0}")]
    InvalidTileId(u32),

    #[error("invalid tile text {0:?}")]
    InvalidTileText(String),

    #[error("malformed meld token {token:?}: {reason}")]
    MalformedMeldToken { token: String, reason: &'static str },

    #[error("unrecognized outcome kind {0:?}")]
    UnrecognizedOutcomeKind(String),
}

impl DecodeError {
    pub(crate) fn meld(token: &str, reason: &'static str) -> Self {
        Self::MalformedMeldToken {
            token: token.to_owned(),
            reason,
        }
    }
}

/// The encoded round is self-inconsistent: a tile had to leave a hand that
/// never held it, or a token appeared where the replay cannot apply it.
#[derive(Debug, Error)]
#[error("round simulation failed for seat {seat} at turn {turn}: {reason}")]
pub struct RoundSimulationFailure {
    pub seat: u8,
    pub turn: usize,
    pub reason: String,
}

/// Inconsistent round data handed to the scoring engine.
#[derive(Debug, Error)]
#[error("inconsistent round: {0}")]
pub struct ScoreError(pub String);

/// Anything that stops a single game from being ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Simulation(#[from] RoundSimulationFailure),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("unknown game kind {0:?}")]
    UnknownGameKind(String),

    #[error("unknown player id {0:?}")]
    UnknownPlayer(String),

    #[error("malformed game record: {0}")]
    Malformed(String),

    #[error("invalid json")]
    Json(#[from] serde_json::Error),

    #[error("failed to read game record")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
