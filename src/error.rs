use hyper::{Response, StatusCode};
use http_body_util::Full;
use bytes::Bytes;

use crate::items::ItemError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn network(message: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Network {
            message: message.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Network { .. } => StatusCode::BAD_GATEWAY,
            Error::Json(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string()
        });

        crate::api::with_body(status, body.to_string())
    }
}

impl From<ItemError> for Error {
    fn from(e: ItemError) -> Self {
        match e {
            ItemError::NotFound(id) => Error::NotFound(id),
            e @ (ItemError::EmptyTitle | ItemError::TitleTooLong { .. }) => {
                Error::Validation(e.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
