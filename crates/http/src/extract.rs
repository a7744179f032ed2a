//! Request extractors shared by modules.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::AppError;

/// JSON body extractor that never rejects a well-formed document.
///
/// The `Content-Type` header is ignored. An empty body, or a JSON document
/// whose top level is not an object, yields `T::default()`. Only bytes that
/// are not valid JSON are rejected, with a 400 [`AppError::BadRequest`].
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        parse_lenient(&bytes).map(LenientJson)
    }
}

fn parse_lenient<T>(bytes: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        AppError::bad_request_with(
            vec![json!({ "line": e.line(), "column": e.column() })],
            format!("malformed JSON body: {e}"),
        )
    })?;

    if !value.is_object() {
        return Ok(T::default());
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::bad_request(format!("unexpected JSON body: {e}")))
}
