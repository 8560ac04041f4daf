//! Runtime error types.

/// Failures raised while assembling or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),

    #[error("unknown weapon '{0}'")]
    UnknownWeapon(String),

    #[error("unknown clan '{0}'")]
    UnknownClan(String),

    #[error("invalid content: {0}")]
    Content(#[from] anyhow::Error),

    #[error("invalid save blob: {0}")]
    Save(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
