use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ProxyError {
    #[error("{body}")]
    Upstream { status: u16, body: String },

    #[error("invalid gene id: {0}")]
    InvalidGeneId(String),

    #[error("invalid variant id: {0}")]
    InvalidVariantId(String),

    #[error("invalid species: {0}")]
    InvalidSpecies(String),

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("failed to build Ensembl client: {0}")]
    HttpClient(String),

    #[error("server error: {0}")]
    Server(String),
}

impl ProxyError {
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        ProxyError::Upstream {
            status,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::InvalidGeneId(_)
            | ProxyError::InvalidVariantId(_)
            | ProxyError::InvalidSpecies(_)
            | ProxyError::MissingParameter(_)
            | ProxyError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::HttpClient(_) | ProxyError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ProxyError {
    fn from(rejection: QueryRejection) -> Self {
        ProxyError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_passes_through() {
        assert_eq!(
            ProxyError::upstream(503, "down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::upstream(404, "not found").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn out_of_range_status_becomes_bad_gateway() {
        assert_eq!(
            ProxyError::upstream(1000, "weird").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn request_errors_are_unprocessable() {
        assert_eq!(
            ProxyError::MissingParameter("gene_id").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
