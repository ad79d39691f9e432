// Shared fixtures for handler tests
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{http::header, web, App};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{AppConfig, LoggingConfig, SecurityConfig, ServerConfig, StoreBackend, StoreConfig};
use crate::db::{to_document, DocumentId, DocumentStore, MemoryStore, USERS};
use crate::middleware::SecurityHeaders;
use crate::models::{Role, UserInput};
use crate::routes;

pub const TEST_SECRET: &str = "handler_test_secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 8000,
            name: "orders_test".into(),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            sled_path: String::new(),
        },
        security: SecurityConfig {
            jwt_secret: TEST_SECRET.into(),
            token_ttl_seconds: 3600,
        },
        cors_origins: Vec::new(),
        logging: LoggingConfig {
            level: "debug".into(),
        },
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 3600)
}

pub fn email_for(role: Role) -> String {
    format!("{}@example.com", role)
}

/// One user per role, in `Role::ALL` order.
pub fn seeded_store() -> (Arc<dyn DocumentStore>, Vec<DocumentId>) {
    let store = MemoryStore::new();
    let ids = Role::ALL
        .iter()
        .map(|role| {
            let user = UserInput {
                name: format!("Test {}", role),
                email: email_for(*role),
                role: *role,
            };
            store.insert_one(USERS, to_document(&user).unwrap()).unwrap()
        })
        .collect();
    (Arc::new(store), ids)
}

/// `Authorization` header carrying a fresh token for `role`.
pub fn bearer(role: Role) -> (header::HeaderName, String) {
    let tokens = tokens();
    let token = tokens
        .sign(&tokens.claims_for(&email_for(role), role, Utc::now()).unwrap())
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// The production route table over `store`, with test config and secret.
pub fn test_app(
    store: Arc<dyn DocumentStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(store))
        .app_data(web::Data::new(tokens()))
        .app_data(web::Data::new(test_config()))
        .wrap(SecurityHeaders)
        .configure(routes::configure)
}
