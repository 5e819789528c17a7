//! CLI error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] carelink_client::ClientError),

    #[error(transparent)]
    Gate(#[from] carelink_gate::GateError),

    #[error(transparent)]
    Worklist(#[from] carelink_worklist::WorklistError),
}

pub type CliResult<T> = Result<T, CliError>;
