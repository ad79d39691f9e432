pub mod auth;
pub mod orders;
pub mod users;

use crate::db::DocumentId;
use crate::error::ApiError;

/// Path identifiers are validated before any store call.
pub(crate) fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id format: '{}'", raw)))
}
