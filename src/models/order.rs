use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /pedidos/` and `PUT /pedidos/{id}`.
///
/// Counters are aggregate tallies, not per-customer records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "pedidos_cancelados": 100,
    "pedidos_enviados": 500,
    "pedidos_pagados": 180,
    "pedidos_reenviados": 2,
    "fecha": "2023-10-25T00:00:00Z"
}))]
pub struct OrderInput {
    #[serde(rename = "pedidos_cancelados")]
    pub cancelled: u64,
    #[serde(rename = "pedidos_enviados")]
    pub shipped: u64,
    #[serde(rename = "pedidos_pagados")]
    pub paid: u64,
    #[serde(rename = "pedidos_reenviados")]
    pub resent: u64,
    /// Registration time; the server fills in the current time when omitted.
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
}

/// Order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: String,
    #[serde(rename = "pedidos_cancelados")]
    pub cancelled: u64,
    #[serde(rename = "pedidos_enviados")]
    pub shipped: u64,
    #[serde(rename = "pedidos_pagados")]
    pub paid: u64,
    #[serde(rename = "pedidos_reenviados")]
    pub resent: u64,
    #[serde(rename = "fecha")]
    pub placed_at: DateTime<Utc>,
}
