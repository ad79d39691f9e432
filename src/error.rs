// HTTP-facing error taxonomy
use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use std::fmt::Display;
use thiserror::Error;

use crate::auth::TokenError;
use crate::mappers::MapError;
use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Unclassified store/serialization failure; logged here so handlers don't have to.
    pub fn internal(context: &str, err: impl Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::Internal(format!("{}: {}", context, err))
    }

    pub fn bad_request(context: &str, err: impl Display) -> Self {
        tracing::warn!("{}: {}", context, err);
        ApiError::BadRequest(format!("{}: {}", context, err))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, ApiError::Unauthorized(_)) {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(ErrorResponse::new(self.code(), self.to_string()))
    }
}

impl From<MapError> for ApiError {
    fn from(err: MapError) -> Self {
        ApiError::internal("failed to map stored document", err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(format!("invalid or expired token: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn responses_carry_status_and_code() {
        let cases = [
            (ApiError::BadRequest("x".into()), 400, "bad_request"),
            (ApiError::Unauthorized("x".into()), 401, "unauthorized"),
            (ApiError::Forbidden("x".into()), 403, "forbidden"),
            (ApiError::NotFound("x".into()), 404, "not_found"),
            (ApiError::Internal("x".into()), 500, "internal_error"),
        ];
        for (err, status, code) in cases {
            let resp = err.error_response();
            assert_eq!(resp.status().as_u16(), status);
            let body = to_bytes(resp.into_body()).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"]["code"], code);
            assert_eq!(json["error"]["message"], "x");
        }
    }

    #[test]
    fn unauthorized_advertises_bearer_scheme() {
        let resp = ApiError::Unauthorized("missing token".into()).error_response();
        assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}
