use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::core::ProxyError;
use crate::web::types::ErrorBody;

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let ready = match self {
            ProxyError::EngineNotReady | ProxyError::EngineUnavailable(_) => Some(false),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            ready,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
