// Token issuance, the token guard and the role-gated informational endpoints
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{get, post, web, HttpMessage, HttpResponse};
use chrono::Utc;

use crate::auth::gate::{AdminOnly, AnyRole, PlainUser, SalesStaff};
use crate::auth::{issue_token_for_email, verify_request, Authorized, TokenService};
use crate::db::DocumentStore;
use crate::error::ApiError;
use crate::models::{Claims, LoginQuery, TokenResponse};
use crate::types::{AccessInfo, ErrorResponse};

/// Exchange a registered email for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    params(LoginQuery),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing email parameter", body = ErrorResponse),
        (status = 404, description = "No user with this email", body = ErrorResponse)
    )
)]
#[post("/login")]
pub async fn login(
    store: web::Data<dyn DocumentStore>,
    tokens: web::Data<TokenService>,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, ApiError> {
    let email = query.into_inner().email;
    let token = issue_token_for_email(store.get_ref(), &tokens, &email, Utc::now())?;
    tracing::info!(email = %email, "token issued");
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

fn access_info(message: &str, claims: &Claims) -> AccessInfo {
    AccessInfo {
        message: message.to_string(),
        email: claims.sub.clone(),
        rol: claims.role,
    }
}

#[utoipa::path(
    get,
    path = "/admin",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = AccessInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
#[get("/admin")]
pub async fn admin_area(auth: Authorized<AdminOnly>) -> HttpResponse {
    HttpResponse::Ok().json(access_info("welcome to the admin area", auth.claims()))
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = AccessInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
#[get("/user")]
pub async fn user_area(auth: Authorized<PlainUser>) -> HttpResponse {
    HttpResponse::Ok().json(access_info("welcome to the user area", auth.claims()))
}

#[utoipa::path(
    get,
    path = "/ventas",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = AccessInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
#[get("/ventas")]
pub async fn sales_area(auth: Authorized<SalesStaff>) -> HttpResponse {
    HttpResponse::Ok().json(access_info("welcome to the sales area", auth.claims()))
}

/// Who the token says you are.
#[utoipa::path(
    get,
    path = "/perfil",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = AccessInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[get("/perfil")]
pub async fn profile(auth: Authorized<AnyRole>) -> HttpResponse {
    HttpResponse::Ok().json(access_info("profile", auth.claims()))
}

/// Rejects requests without a valid bearer token; otherwise stores the
/// claims in request extensions for the role gate.
pub async fn guard_api(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let verified = verify_request(req.request());
    match verified {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req).await
        }
        Err(err) => {
            tracing::debug!(path = %req.path(), "rejected by token guard: {}", err);
            Ok(req.error_response(err))
        }
    }
}
