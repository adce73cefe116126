use thiserror::Error;

/// Errors surfaced by the ingestion pipeline and its components.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed record, missing ':' delimiter: {0:?}")]
    MalformedRecord(String),

    #[error("invalid number {token:?} for field {label:?}")]
    InvalidNumber { label: String, token: String },

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("expected {expected} channel values, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    #[error("pipeline is closed")]
    PipelineClosed,

    #[error("log sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("audio playback error: {0}")]
    Audio(String),
}
