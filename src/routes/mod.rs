pub mod docs;
pub mod health;

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{get, middleware::from_fn, web, HttpRequest, HttpResponse};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{self, auth::guard_api};
use crate::logging::build_version;
use crate::types::IndexResponse;

const JSON_LIMIT: usize = 1 << 20;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_err = ApiError::BadRequest(format!("invalid JSON body: {}", err));
    InternalError::from_response(err, actix_web::ResponseError::error_response(&api_err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_err = ApiError::BadRequest(format!("invalid query string: {}", err));
    InternalError::from_response(err, actix_web::ResponseError::error_response(&api_err)).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

#[get("/")]
pub async fn index(cfg: Option<web::Data<AppConfig>>) -> HttpResponse {
    let name = cfg
        .map(|cfg| cfg.server.name.clone())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    HttpResponse::Ok().json(IndexResponse {
        name,
        version: build_version(),
        message: "users and orders API; see /docs".into(),
    })
}

/// Public routes first, then everything behind the token guard.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(index)
        .service(health::healthz)
        .service(health::health)
        .service(docs::openapi_json)
        .service(docs::swagger_ui)
        .service(docs::swagger_init)
        .service(handlers::auth::login)
        .service(
            web::scope("")
                .wrap(from_fn(guard_api))
                .service(handlers::auth::admin_area)
                .service(handlers::auth::user_area)
                .service(handlers::auth::sales_area)
                .service(handlers::auth::profile)
                .service(handlers::users::list_users)
                .service(handlers::users::get_user)
                .service(handlers::users::create_user)
                .service(handlers::users::update_user)
                .service(handlers::users::delete_user)
                .configure(handlers::orders::configure),
        );
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, seeded_store, test_app};
    use crate::models::Role;
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn public_routes_need_no_token() {
        let (store, _) = seeded_store();
        let app = test::init_service(test_app(store)).await;

        for uri in ["/", "/healthz", "/health", "/api-docs/openapi.json", "/docs"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn index_reports_configured_name() {
        let (store, _) = seeded_store();
        let app = test::init_service(test_app(store)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "orders_test");
    }

    #[actix_web::test]
    async fn malformed_json_uses_error_envelope() {
        let (store, _) = seeded_store();
        let app = test::init_service(test_app(store)).await;

        let req = test::TestRequest::post()
            .uri("/pedidos/")
            .insert_header(bearer(Role::Admin))
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "bad_request");
    }
}
