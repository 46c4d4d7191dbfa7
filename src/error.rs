use thiserror::Error;

/// Errors that can occur when constructing or calling a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("neither a network builder nor a model path was provided")]
    MissingApproximator,
    #[error("observation has {got} features but the state spec expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("failed to render architecture diagram: {0}")]
    Render(String),
}

/// Details of failed checkpoint reads and writes.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no model path is configured")]
    NoPath,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode checkpoint: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode checkpoint: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("failed to read weight record: {0}")]
    Record(#[from] burn::record::RecorderError),
    #[error("checkpoint holds a {found} network but a {expected} network was requested")]
    KindMismatch { expected: &'static str, found: &'static str },
    #[error("checkpoint dimensions {found:?} do not match the requested network {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}
