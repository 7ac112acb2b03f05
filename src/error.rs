pub type ReelResult<T> = Result<T, ReelError>;

#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("no footage: {0}")]
    NoFootage(String),

    #[error("overlay render error: {0}")]
    OverlayRender(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn invalid_media(msg: impl Into<String>) -> Self {
        Self::InvalidMedia(msg.into())
    }

    pub fn no_footage(msg: impl Into<String>) -> Self {
        Self::NoFootage(msg.into())
    }

    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::OverlayRender(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for failures that should be downgraded to a warning and skipped
    /// rather than aborting the pipeline (missing caption, watermark, banner).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OverlayRender(_))
    }
}
