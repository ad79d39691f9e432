// src/models/role.rs
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

/// Closed set of roles a user record (and therefore a token) can carry.
///
/// Wire names are the lowercase Spanish role names clients already send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "gerente")]
    Manager,
    #[serde(rename = "cliente")]
    Customer,
    #[serde(rename = "vendedor")]
    Seller,
    #[serde(rename = "usuario")]
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected one of: admin, gerente, cliente, vendedor, usuario)")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Customer,
        Role::Seller,
        Role::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "gerente",
            Role::Customer => "cliente",
            Role::Seller => "vendedor",
            Role::User => "usuario",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exact wire names only, same rule as Deserialize.
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
