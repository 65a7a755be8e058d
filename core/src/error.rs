use thiserror::Error;

/// Failures at the edges of the simulation: storage, config and snapshots.
/// The monthly cycle itself never fails; it saturates instead.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No snapshot stored for run '{run_id}'")]
    SnapshotNotFound { run_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
