use crate::llm::UpstreamError;
use crate::palette::PaletteError;
use thiserror::Error;

/// Message returned for every failure whose details stay server-side.
pub const GENERIC_ERROR: &str = "An unexpected error occurred on the server.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("The AI model returned no content, possibly due to safety filters.")]
    NoContentReturned,

    #[error("The AI did not return a valid JSON object.")]
    MalformedResponse,

    #[error("The AI returned a palette that failed validation: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("unexpected upstream response shape: {0}")]
    UnexpectedShape(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<PaletteError> for RelayError {
    fn from(error: PaletteError) -> Self {
        RelayError::InvalidPayload(error.to_string())
    }
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::BadRequest(_) => 400,
            _ => 500,
        }
    }

    /// Text placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::BadRequest(_)
            | RelayError::NoContentReturned
            | RelayError::MalformedResponse
            | RelayError::InvalidPayload(_) => self.to_string(),
            RelayError::Upstream(_) | RelayError::UnexpectedShape(_) | RelayError::Other(_) => {
                GENERIC_ERROR.to_string()
            }
        }
    }
}
