/// Crate-wide result alias.
pub type BubbleResult<T> = Result<T, BubbleError>;

/// Errors produced while configuring, composing, rendering or encoding the scene.
#[derive(thiserror::Error, Debug)]
pub enum BubbleError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be loaded or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// A frame sink failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BubbleError {
    /// Build a [`BubbleError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BubbleError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`BubbleError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BubbleError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`BubbleError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
