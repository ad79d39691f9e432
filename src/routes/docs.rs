// OpenAPI document and the Swagger UI page that renders it
use actix_web::{get, http::header, HttpResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models::{Claims, OrderInput, OrderView, Role, TokenResponse, UserInput, UserView};
use crate::routes::health;
use crate::types::{AccessInfo, ErrorDetail, ErrorResponse, HealthResponse, MessageResponse, StoreHealth};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orders backend",
        description = "Users and orders over a document store. Obtain a token from `POST /login`."
    ),
    paths(
        health::healthz,
        health::health,
        handlers::auth::login,
        handlers::auth::admin_area,
        handlers::auth::user_area,
        handlers::auth::sales_area,
        handlers::auth::profile,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::create_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
    ),
    components(schemas(
        Role,
        Claims,
        TokenResponse,
        UserInput,
        UserView,
        OrderInput,
        OrderView,
        AccessInfo,
        MessageResponse,
        ErrorResponse,
        ErrorDetail,
        HealthResponse,
        StoreHealth,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Token issuance and role checks"),
        (name = "users", description = "User management"),
        (name = "orders", description = "Order tallies"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

const SWAGGER_UI: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Orders backend API</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script src="/docs/init.js"></script>
</body>
</html>
"#;

const SWAGGER_INIT: &str = r##"window.ui = SwaggerUIBundle({
  url: "/api-docs/openapi.json",
  dom_id: "#swagger-ui",
  persistAuthorization: true
});
"##;

const DOCS_CSP: &str = "default-src 'self'; script-src 'self' https://cdn.jsdelivr.net; \
style-src 'self' https://cdn.jsdelivr.net; img-src 'self' data: https://cdn.jsdelivr.net; \
connect-src 'self'; frame-ancestors 'none'";

#[get("/docs")]
pub async fn swagger_ui() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::CONTENT_SECURITY_POLICY, DOCS_CSP))
        .body(SWAGGER_UI)
}

#[get("/docs/init.js")]
pub async fn swagger_init() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(SWAGGER_INIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{call_and_read_body_json, call_service, init_service, read_body, TestRequest};
    use actix_web::App;
    use serde_json::Value;

    fn security_of(doc: &Value, path: &str, method: &str) -> Option<Value> {
        doc["paths"][path][method].get("security").cloned()
    }

    #[test]
    fn gated_operations_declare_bearer_auth() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert_eq!(doc["components"]["securitySchemes"]["bearer_auth"]["scheme"], "bearer");
        assert!(security_of(&doc, "/login", "post").is_none());
        assert!(security_of(&doc, "/healthz", "get").is_none());
        assert!(doc["paths"]["/health"]["get"].is_object());
        assert!(security_of(&doc, "/health", "get").is_none());

        for (path, method) in [
            ("/users", "get"),
            ("/users", "post"),
            ("/users/{id}", "delete"),
            ("/pedidos/", "post"),
            ("/pedidos/{id}", "put"),
            ("/perfil", "get"),
        ] {
            let security = security_of(&doc, path, method)
                .unwrap_or_else(|| panic!("{} {} has no security", method, path));
            assert!(security[0].get("bearer_auth").is_some(), "{} {}", method, path);
        }
    }

    #[actix_web::test]
    async fn serves_document_and_ui() {
        let app = init_service(
            App::new()
                .service(openapi_json)
                .service(swagger_ui)
                .service(swagger_init),
        )
        .await;

        let req = TestRequest::get().uri(OPENAPI_PATH).to_request();
        let doc: Value = call_and_read_body_json(&app, req).await;
        assert_eq!(doc["info"]["title"], "Orders backend");
        assert!(doc["paths"]["/pedidos/{id}"].is_object());

        let req = TestRequest::get().uri("/docs").to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        let body = read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("swagger-ui"));

        let req = TestRequest::get().uri("/docs/init.js").to_request();
        let script = read_body(call_service(&app, req).await).await;
        let script = std::str::from_utf8(&script).unwrap();
        assert!(script.contains(r##"dom_id: "#swagger-ui""##));
        assert!(script.contains(OPENAPI_PATH));
    }
}
