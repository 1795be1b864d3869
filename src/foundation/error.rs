/// Convenience result type used across gifsplit.
pub type SplitResult<T> = Result<T, SplitError>;

/// Top-level error taxonomy used by the splitting APIs.
///
/// Every variant is fatal for the request that produced it: the orchestrator never returns a
/// partially filled set of cells.
#[derive(thiserror::Error, Debug)]
pub enum SplitError {
    /// The input is not a decodable GIF, or it declares no frames.
    #[error("decode error: {0}")]
    Decode(String),

    /// A cell could not be serialized into a GIF bitstream.
    #[error("encode error: {0}")]
    Encode(String),

    /// Grid dimensions or options are outside their allowed bounds.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplitError {
    /// Build a [`SplitError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SplitError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SplitError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
