use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bson::oid::ObjectId;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use gather_db::DbError;

/// Failure taxonomy for the whole API surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Driver/store failures are logged server-side, never echoed.
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateKey => ApiError::Conflict("duplicate key".into()),
            DbError::Driver(err) => ApiError::Internal(err.into()),
        }
    }
}

/// Identifiers on the wire are opaque hex strings; anything that does not
/// parse cannot address a document.
pub fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest(format!("invalid id: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_statuses() {
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response = ApiError::Internal(anyhow::anyhow!("connection refused: 10.0.0.7"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn object_id_parsing() {
        assert!(parse_object_id("64b5f0d2a7e8c9001f3a2b1c").is_ok());
        assert!(matches!(
            parse_object_id("not-an-id"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn duplicate_key_becomes_conflict() {
        let err: ApiError = DbError::DuplicateKey.into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
