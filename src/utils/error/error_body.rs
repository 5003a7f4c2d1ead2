use super::{Error, ErrorMessage, ErrorName};
use axum::{http::StatusCode, response::IntoResponse};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Wire shape for every error response from the control-plane API: `{detail, code}`
/// plus the internal name, matching spec's documented error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    name: ErrorName,
    detail: ErrorMessage,
    code: u16,
    status_message: String,
}

impl Default for ErrorBody {
    fn default() -> Self {
        Self {
            name: ErrorName::default(),
            detail: ErrorMessage::default(),
            code: 500,
            status_message: "Internal Server Error".to_string(),
        }
    }
}

impl From<Error> for ErrorBody {
    fn from(error: Error) -> Self {
        let code = error.code.unwrap_or_default();
        Self {
            name: error.name.unwrap_or_default(),
            detail: error.message.unwrap_or_default(),
            code: code.into_status_code(),
            status_message: code.into_status_message(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = self.trace();
        let body = ErrorBody::from(error);
        let status = StatusCode::from_u16(body.code).unwrap_or_default();
        (status, axum::Json(body)).into_response()
    }
}
