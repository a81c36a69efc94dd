use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Missing response payload: {0}")]
    MissingPayload(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Action '{action}' is not supported by {store}")]
    UnsupportedAction {
        store: &'static str,
        action: &'static str,
    },
}

impl ClientError {
    /// HTTP status of a server-side rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_missing_payload(&self) -> bool {
        matches!(self, ClientError::MissingPayload(_))
    }

    pub fn is_authorization_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
