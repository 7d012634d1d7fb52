use thiserror::Error;

/// Fatal errors raised before any frame processing begins.
///
/// Everything recoverable mid-run (a short frame read, a detector failure on
/// one frame) is handled in place by the pipeline and never surfaces here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
}

impl EngineError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::configuration("skip interval must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: skip interval must be positive"
        );

        let err = EngineError::source_unavailable("video has no frames");
        assert_eq!(err.to_string(), "source unavailable: video has no frames");
    }
}
