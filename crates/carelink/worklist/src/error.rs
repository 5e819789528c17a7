use carelink_client::ClientError;
use thiserror::Error;

/// Worklist errors. Every variant carries a message callers can show
/// verbatim next to the untouched row.
#[derive(Debug, Error)]
pub enum WorklistError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("unknown task id {0}")]
    UnknownItem(i64),
}

pub type WorklistResult<T> = Result<T, WorklistError>;
