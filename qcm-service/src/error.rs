use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{1}")]
    Server(StatusCode, String),
    // Froms
    #[error(transparent)]
    Qcm(#[from] qcm_utils::error::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        use qcm_utils::error::Error as QcmError;

        match self {
            Error::Server(c, _) => *c,
            Error::Qcm(QcmError::EmptySelection) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Qcm(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<Error> for StatusCode {
    fn from(error: Error) -> Self {
        error.status()
    }
}
