use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollationError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("witness '{witness}' has no chapter {chapter} ({available} chapters available)")]
    ChapterNotFound {
        witness: String,
        chapter: usize,
        available: usize,
    },
    #[error("alignment failed: {message}")]
    AlignmentFailure { message: String },
    #[error("store error: {message}")]
    Store { message: String },
}

impl CollationError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn alignment(message: impl Into<String>) -> Self {
        Self::AlignmentFailure {
            message: message.into(),
        }
    }

    pub(crate) fn store(err: impl std::fmt::Display) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }
}
