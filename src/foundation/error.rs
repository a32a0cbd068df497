/// Convenience result type used across photostamp.
pub type PhotostampResult<T> = Result<T, PhotostampError>;

/// Top-level error taxonomy used by editor, compositor, and submission APIs.
#[derive(thiserror::Error, Debug)]
pub enum PhotostampError {
    /// The base photo or a stamp asset could not be decoded.
    ///
    /// Non-fatal: callers fall back to the raw photo bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// A preview compose result was superseded by a newer request and must not be shown.
    #[error("stale render discarded: token {token} superseded by {latest}")]
    StaleRender {
        /// Token of the discarded result.
        token: u64,
        /// Latest issued token at the time the result arrived.
        latest: u64,
    },

    /// The authoritative compose or the persistence handoff failed. Retryable.
    #[error("submission failure: {0}")]
    Submission(String),

    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotostampError {
    /// Build a [`PhotostampError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PhotostampError::Submission`] value.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Build a [`PhotostampError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotostampError::StaleRender`] value.
    pub fn stale(token: u64, latest: u64) -> Self {
        Self::StaleRender { token, latest }
    }

    /// `true` for decode failures, which callers answer with the raw-photo fallback.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// `true` when retrying the same operation may succeed without re-editing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
