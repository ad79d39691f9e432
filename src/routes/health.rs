// Health check endpoint
use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::db::{DocumentStore, ORDERS, USERS};
use crate::logging::build_version;
use crate::types::{HealthResponse, StoreHealth};

fn check(store: &dyn DocumentStore) -> HttpResponse {
    let counts = store
        .count(USERS)
        .and_then(|users| Ok((users, store.count(ORDERS)?)));

    let (status, users, orders) = match counts {
        Ok((users, orders)) => ("ok", Some(users), Some(orders)),
        Err(e) => {
            tracing::error!("health check: store unavailable: {}", e);
            ("degraded", None, None)
        }
    };
    let response = HealthResponse {
        status: status.to_string(),
        time: Utc::now().to_rfc3339(),
        version: Some(build_version()),
        store: StoreHealth {
            backend: store.backend().to_string(),
            users,
            orders,
        },
    };
    if users.is_some() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unavailable", body = HealthResponse)
    )
)]
#[get("/healthz")]
pub async fn healthz(store: web::Data<dyn DocumentStore>) -> HttpResponse {
    check(store.get_ref())
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unavailable", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health(store: web::Data<dyn DocumentStore>) -> HttpResponse {
    // Alias for compatibility
    check(store.get_ref())
}
