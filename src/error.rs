use thiserror::Error;

/// Failures of a single upload or deletion.
///
/// `Busy` and `Encode` are returned synchronously from `upload()`. The rest
/// reach callers as text on the event channel.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An upload is already in progress")]
    Busy,

    #[error("Failed to encode capture as PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("{0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to save upload history: {0}")]
    History(#[from] anyhow::Error),

    #[error("Unable to open the URL.")]
    DeletionUnreachable,
}

impl UploadError {
    /// Flattens a reqwest error and its sources into one display string,
    /// e.g. `error sending request: Connection refused`. The request URL is
    /// dropped because it carries the API key.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = std::error::Error::source(cause);
        }
        UploadError::Transport(message)
    }
}
