// Order endpoints under /pedidos
use actix_web::{web, HttpResponse};
use chrono::Utc;

use super::parse_id;
use crate::auth::gate::{Management, SalesStaff};
use crate::auth::Authorized;
use crate::db::{to_document, DocumentId, DocumentStore, ORDERS};
use crate::error::ApiError;
use crate::mappers;
use crate::models::{OrderInput, OrderView};
use crate::types::ErrorResponse;

// Builder form so one resource answers both /pedidos and /pedidos/.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pedidos")
            .service(
                web::resource(["", "/"])
                    .route(web::get().to(list_orders))
                    .route(web::post().to(create_order)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_order))
                    .route(web::put().to(update_order))
                    .route(web::delete().to(delete_order)),
            ),
    );
}

fn load_order(store: &dyn DocumentStore, id: &DocumentId) -> Result<OrderView, ApiError> {
    let doc = store
        .find_by_id(ORDERS, id)
        .map_err(|e| ApiError::internal("failed to load order", e))?
        .ok_or_else(|| ApiError::NotFound(format!("order {} not found", id)))?;
    Ok(mappers::order_view(&doc, Utc::now())?)
}

#[utoipa::path(
    get,
    path = "/pedidos/",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every stored order", body = [OrderView]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn list_orders(
    _auth: Authorized<SalesStaff>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let docs = store
        .find_all(ORDERS)
        .map_err(|e| ApiError::internal("failed to list orders", e))?;
    Ok(HttpResponse::Ok().json(mappers::orders_view(&docs, Utc::now())?))
}

#[utoipa::path(
    get,
    path = "/pedidos/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order id (UUID)")),
    responses(
        (status = 200, description = "The order", body = OrderView),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse)
    )
)]
pub async fn get_order(
    _auth: Authorized<SalesStaff>,
    path: web::Path<String>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    Ok(HttpResponse::Ok().json(load_order(store.get_ref(), &id)?))
}

/// Register an order tally; `fecha` defaults to now.
#[utoipa::path(
    post,
    path = "/pedidos/",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = OrderInput,
    responses(
        (status = 201, description = "Order created", body = OrderView),
        (status = 400, description = "Invalid body or store rejected the insert", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    )
)]
pub async fn create_order(
    auth: Authorized<SalesStaff>,
    payload: web::Json<OrderInput>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let mut order = payload.into_inner();
    order.placed_at.get_or_insert_with(Utc::now);
    let doc = to_document(&order).map_err(|e| ApiError::bad_request("invalid order", e))?;
    let id = store
        .insert_one(ORDERS, doc)
        .map_err(|e| ApiError::bad_request("failed to create order", e))?;
    tracing::info!(%id, by = %auth.claims().sub, "order created");
    Ok(HttpResponse::Created().json(load_order(store.get_ref(), &id)?))
}

/// Overwrite the counters; an omitted `fecha` keeps the stored one.
#[utoipa::path(
    put,
    path = "/pedidos/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order id (UUID)")),
    request_body = OrderInput,
    responses(
        (status = 200, description = "Updated order", body = OrderView),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse)
    )
)]
pub async fn update_order(
    auth: Authorized<SalesStaff>,
    path: web::Path<String>,
    payload: web::Json<OrderInput>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let changes = to_document(&payload.into_inner())
        .map_err(|e| ApiError::bad_request("invalid order", e))?;
    let matched = store
        .update_one(ORDERS, &id, changes)
        .map_err(|e| ApiError::internal("failed to update order", e))?;
    if !matched {
        return Err(ApiError::NotFound(format!("order {} not found", id)));
    }
    tracing::info!(%id, by = %auth.claims().sub, "order updated");
    Ok(HttpResponse::Ok().json(load_order(store.get_ref(), &id)?))
}

#[utoipa::path(
    delete,
    path = "/pedidos/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order id (UUID)")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "No such order", body = ErrorResponse)
    )
)]
pub async fn delete_order(
    auth: Authorized<Management>,
    path: web::Path<String>,
    store: web::Data<dyn DocumentStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let removed = store
        .delete_one(ORDERS, &id)
        .map_err(|e| ApiError::internal("failed to delete order", e))?;
    if !removed {
        return Err(ApiError::NotFound(format!("order {} not found", id)));
    }
    tracing::info!(%id, by = %auth.claims().sub, "order deleted");
    Ok(HttpResponse::NoContent().finish())
}
