//! Bearer-token authentication and role gating.
//!
//! Per request: `Unauthenticated -> (valid token?) -> Authenticated ->
//! (role permitted?) -> Authorized`. A failed step ends the request with
//! 401 or 403; nothing is retried or refreshed.

use actix_web::{http::header, web, HttpRequest};
use chrono::{DateTime, Utc};

use crate::db::{DocumentStore, Filter, USERS};
use crate::error::ApiError;
use crate::mappers;
use crate::models::Claims;

pub mod gate;
mod token;

pub use gate::Authorized;
pub use token::{TokenError, TokenService};

/// Bearer token from the `Authorization` header.
pub fn extract_bearer(req: &HttpRequest) -> Result<String, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("unreadable authorization header".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("authorization header is not a bearer token".into()))?;
    Ok(token.to_string())
}

/// Verify the request's bearer token against the app's `TokenService`.
pub fn verify_request(req: &HttpRequest) -> Result<Claims, ApiError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| ApiError::internal("auth", "token service not configured"))?;
    let token = extract_bearer(req)?;
    Ok(tokens.verify(&token, Utc::now())?)
}

/// Look the user up by exact email and sign a token carrying their current role.
pub fn issue_token_for_email(
    store: &dyn DocumentStore,
    tokens: &TokenService,
    email: &str,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    let doc = store
        .find_one(USERS, &Filter::new().eq("email", email))
        .map_err(|e| ApiError::internal("user lookup failed", e))?
        .ok_or_else(|| ApiError::NotFound(format!("user '{}' not found", email)))?;
    let user = mappers::user_view(&doc)?;
    let claims = tokens
        .claims_for(&user.email, user.role, now)
        .map_err(|e| ApiError::internal("token claims", e))?;
    tokens
        .sign(&claims)
        .map_err(|e| ApiError::internal("token signing failed", e))
}
