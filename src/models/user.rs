use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Role;

/// Body of `POST /users` and `PUT /users/{id}`; also the stored shape.
///
/// A client-supplied `id` is ignored, the store assigns identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserInput {
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol", alias = "role")]
    pub role: Role,
}

/// User as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol")]
    pub role: Role,
}
