use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Everything a user handler can fail with. Unexpected errors carry the
/// underlying cause and surface as a generic 500.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("This email already exists")]
    DuplicateEmail,
    #[error("User not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl UserError {
    fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) | UserError::DuplicateEmail => StatusCode::BAD_REQUEST,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Unauthorized => StatusCode::UNAUTHORIZED,
            UserError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UserError::Unexpected(e) => {
                error!(error = %e, "unexpected error in user handler");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            UserError::Validation("firstName is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(UserError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UserError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(UserError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            UserError::Unexpected(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_status_and_shape() {
        let res = UserError::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = UserError::Validation("email must be a valid email".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unexpected_hides_the_cause() {
        let res = UserError::Unexpected(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
