// Role gate: a policy is a total function over the closed role set
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::marker::PhantomData;

use super::verify_request;
use crate::error::ApiError;
use crate::models::{Claims, Role};

pub trait RolePolicy {
    fn permits(role: Role) -> bool;

    fn allowed() -> Vec<Role> {
        Role::ALL.into_iter().filter(|role| Self::permits(*role)).collect()
    }
}

/// `admin` only.
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    fn permits(role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::Manager | Role::Customer | Role::Seller | Role::User => false,
        }
    }
}

/// Plain `usuario` accounts.
pub struct PlainUser;

impl RolePolicy for PlainUser {
    fn permits(role: Role) -> bool {
        match role {
            Role::User => true,
            Role::Admin | Role::Manager | Role::Customer | Role::Seller => false,
        }
    }
}

/// People who run the store: admins and managers.
pub struct Management;

impl RolePolicy for Management {
    fn permits(role: Role) -> bool {
        match role {
            Role::Admin | Role::Manager => true,
            Role::Customer | Role::Seller | Role::User => false,
        }
    }
}

/// Management plus sellers.
pub struct SalesStaff;

impl RolePolicy for SalesStaff {
    fn permits(role: Role) -> bool {
        match role {
            Role::Admin | Role::Manager | Role::Seller => true,
            Role::Customer | Role::User => false,
        }
    }
}

/// Any authenticated caller.
pub struct AnyRole;

impl RolePolicy for AnyRole {
    fn permits(role: Role) -> bool {
        match role {
            Role::Admin | Role::Manager | Role::Customer | Role::Seller | Role::User => true,
        }
    }
}

/// Pass `claims` through if policy `P` permits their role.
pub fn authorize<P: RolePolicy>(claims: Claims) -> Result<Claims, ApiError> {
    if P::permits(claims.role) {
        return Ok(claims);
    }
    let allowed = P::allowed()
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::debug!(sub = %claims.sub, role = %claims.role, "role gate denied request");
    Err(ApiError::Forbidden(format!(
        "role '{}' is not allowed here; allowed roles: {}",
        claims.role, allowed
    )))
}

/// Claims from the token guard, or a direct verification when the guard
/// is not mounted in front of this route.
fn authenticate(req: &HttpRequest) -> Result<Claims, ApiError> {
    if let Some(claims) = req.extensions().get::<Claims>() {
        return Ok(claims.clone());
    }
    verify_request(req)
}

/// Extractor for handlers behind the role gate.
pub struct Authorized<P> {
    claims: Claims,
    _policy: PhantomData<P>,
}

impl<P> Authorized<P> {
    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

impl<P: RolePolicy> FromRequest for Authorized<P> {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            authenticate(req)
                .and_then(authorize::<P>)
                .map(|claims| Authorized {
                    claims,
                    _policy: PhantomData,
                }),
        )
    }
}
