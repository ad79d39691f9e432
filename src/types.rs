// Shared response envelopes
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Role;

// ============================================================================
// Error response
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

// ============================================================================
// Informational responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Payload of the role-gated informational endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessInfo {
    pub message: String,
    pub email: String,
    pub rol: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub message: String,
}

// ============================================================================
// Health check response
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub store: StoreHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreHealth {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<usize>,
}
