use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_http::error::AppError;
use thiserror::Error;

use super::models::{BookId, InvalidBookId};

#[derive(Debug, Error)]
pub enum BookError {
    /// No stored book matches the requested id.
    #[error("book '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Http(#[from] AppError),
}

impl BookError {
    pub fn not_found(id: BookId) -> Self {
        Self::NotFound(id.to_string())
    }
}

// A segment that is not a number can never match a stored id.
impl From<InvalidBookId> for BookError {
    fn from(err: InvalidBookId) -> Self {
        Self::NotFound(err.0)
    }
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        match self {
            BookError::NotFound(id) => {
                tracing::debug!(id = %id, "book not found");
                StatusCode::NOT_FOUND.into_response()
            }
            BookError::Http(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_found_has_empty_body() {
        let response = BookError::not_found(BookId(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn invalid_id_maps_to_not_found() {
        let err: BookError = InvalidBookId("abc".to_string()).into();
        assert!(matches!(err, BookError::NotFound(ref raw) if raw == "abc"));
    }

    #[test]
    fn http_errors_keep_their_status() {
        let response = BookError::from(AppError::bad_request("bad body")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
