// src/models/auth_types.rs
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::Role;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct Claims {
    pub sub: String, // user email
    #[serde(rename = "rol")]
    pub role: Role, // copied from the user record at login
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Email of a registered user
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}
