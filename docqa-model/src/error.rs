use thiserror::Error;

/// Errors returned by a [`ChatModel`](crate::ChatModel).
#[derive(Debug, Error)]
pub enum ModelError {
    /// The client could not be constructed (bad API key, bad base URL).
    #[error("{model}: failed to create client: {message}")]
    Client { model: String, message: String },

    /// The generation request failed.
    #[error("{model}: request failed: {message}")]
    Request { model: String, message: String },

    /// The model answered without any text, e.g. because the prompt was blocked.
    #[error("{model}: empty response{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyResponse { model: String, reason: Option<String> },
}

pub type Result<T> = std::result::Result<T, ModelError>;
