use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("grid needs at least one row and one column (got {rows}x{cols})")]
    InvalidGrid { rows: u32, cols: u32 },
    #[error("board rectangle must have a positive, finite size (got {width}x{height})")]
    InvalidBoard { width: f32, height: f32 },
    #[error("edge magnitude {0} is outside the tab range")]
    InvalidEdge(f32),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("player name is empty")]
    EmptyPlayerName,
    #[error("score service failed: {0}")]
    ScoreService(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid score endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
