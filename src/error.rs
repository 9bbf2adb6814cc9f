use thiserror::Error;

/// Notice shown to the person chatting whenever the model call fails. The
/// underlying cause is only available through `source()` and the log.
pub const UNAVAILABLE_NOTICE: &str =
    "Assistant is currently unavailable. You may have hit API limits or encountered a server issue.";

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable credential, or a broken startup setting. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{}", UNAVAILABLE_NOTICE)]
    UpstreamUnavailable(#[source] UpstreamError),

    #[error("message text is empty")]
    EmptyMessage,

    #[error("a reply to the previous message is still pending")]
    Busy,

    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Anything that went wrong talking to the hosted model.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to model endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model returned no text")]
    EmptyReply,
}

impl From<UpstreamError> for Error {
    fn from(e: UpstreamError) -> Self {
        Error::UpstreamUnavailable(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn upstream_detail_is_not_in_display() {
        let err = Error::from(UpstreamError::Status { status: 429, message: "quota exhausted for project 1234".into() });
        assert_eq!(err.to_string(), UNAVAILABLE_NOTICE);
        assert!(err.source().unwrap().to_string().contains("429"));
    }
}
