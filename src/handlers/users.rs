// User management endpoints
use actix_web::{delete, get, post, put, web, HttpResponse};

use super::parse_id;
use crate::auth::gate::{AdminOnly, Management};
use crate::auth::Authorized;
use crate::db::{to_document, DocumentId, DocumentStore, USERS};
use crate::error::ApiError;
use crate::mappers;
use crate::models::{UserInput, UserView};
use crate::types::{ErrorResponse, MessageResponse};

fn load_user(store: &dyn DocumentStore, id: &DocumentId) -> Result<UserView, ApiError> {
    let doc = store
        .find_by_id(USERS, id)
        .map_err(|e| ApiError::internal("failed to load user", e))?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", id)))?;
    Ok(mappers::user_view(&doc)?)
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every stored user", body = [UserView]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
#[get("/users")]
pub async fn list_users(
    _auth: Authorized<Management>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let docs = store
        .find_all(USERS)
        .map_err(|e| ApiError::internal("failed to list users", e))?;
    Ok(HttpResponse::Ok().json(mappers::users_view(&docs)?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "The user", body = UserView),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
#[get("/users/{id}")]
pub async fn get_user(
    _auth: Authorized<Management>,
    path: web::Path<String>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    Ok(HttpResponse::Ok().json(load_user(store.get_ref(), &id)?))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Invalid body or store rejected the insert", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
#[post("/users")]
pub async fn create_user(
    auth: Authorized<AdminOnly>,
    payload: web::Json<UserInput>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let doc = to_document(&payload.into_inner())
        .map_err(|e| ApiError::bad_request("invalid user", e))?;
    let id = store
        .insert_one(USERS, doc)
        .map_err(|e| ApiError::bad_request("failed to create user", e))?;
    tracing::info!(%id, by = %auth.claims().sub, "user created");
    Ok(HttpResponse::Created().json(load_user(store.get_ref(), &id)?))
}

/// Replace the user's fields; the identifier never changes.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = UserInput,
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
#[put("/users/{id}")]
pub async fn update_user(
    auth: Authorized<AdminOnly>,
    path: web::Path<String>,
    payload: web::Json<UserInput>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let changes = to_document(&payload.into_inner())
        .map_err(|e| ApiError::bad_request("invalid user", e))?;
    let matched = store
        .update_one(USERS, &id, changes)
        .map_err(|e| ApiError::internal("failed to update user", e))?;
    if !matched {
        return Err(ApiError::NotFound(format!("user {} not found", id)));
    }
    tracing::info!(%id, by = %auth.claims().sub, "user updated");
    Ok(HttpResponse::Ok().json(load_user(store.get_ref(), &id)?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    auth: Authorized<AdminOnly>,
    path: web::Path<String>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let removed = store
        .delete_one(USERS, &id)
        .map_err(|e| ApiError::internal("failed to delete user", e))?;
    if !removed {
        return Err(ApiError::NotFound(format!("user {} not found", id)));
    }
    tracing::info!(%id, by = %auth.claims().sub, "user deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("user {} deleted", id))))
}
