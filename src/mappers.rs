// Stored documents -> API shapes. Pure: the clock is passed in.
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::db::{Document, ID_FIELD};
use crate::models::{OrderView, UserInput, UserView};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("stored {0} document has no string _id")]
    MissingId(&'static str),
    #[error("malformed stored user document: {0}")]
    MalformedUser(#[source] serde_json::Error),
}

fn document_id(doc: &Document, kind: &'static str) -> Result<String, MapError> {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(MapError::MissingId(kind))
}

pub fn user_view(doc: &Document) -> Result<UserView, MapError> {
    let id = document_id(doc, "user")?;
    let user: UserInput =
        serde_json::from_value(Value::Object(doc.clone())).map_err(MapError::MalformedUser)?;
    Ok(UserView {
        id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

pub fn users_view(docs: &[Document]) -> Result<Vec<UserView>, MapError> {
    docs.iter().map(user_view).collect()
}

fn counter(doc: &Document, field: &str) -> u64 {
    doc.get(field).and_then(Value::as_u64).unwrap_or(0)
}

/// Absent or unreadable timestamps become `now`.
fn timestamp(doc: &Document, field: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

pub fn order_view(doc: &Document, now: DateTime<Utc>) -> Result<OrderView, MapError> {
    Ok(OrderView {
        id: document_id(doc, "order")?,
        cancelled: counter(doc, "pedidos_cancelados"),
        shipped: counter(doc, "pedidos_enviados"),
        paid: counter(doc, "pedidos_pagados"),
        resent: counter(doc, "pedidos_reenviados"),
        placed_at: timestamp(doc, "fecha", now),
    })
}

pub fn orders_view(docs: &[Document], now: DateTime<Utc>) -> Result<Vec<OrderView>, MapError> {
    docs.iter().map(|doc| order_view(doc, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are objects"),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn user_view_stringifies_id_and_maps_fields() {
        let view = user_view(&doc(json!({
            "_id": "6f1c8f0e-2a53-4c3e-9d0b-6a9f0d3e2b11",
            "nombre": "Ana",
            "email": "ana@example.com",
            "rol": "vendedor"
        })))
        .unwrap();
        assert_eq!(view.id, "6f1c8f0e-2a53-4c3e-9d0b-6a9f0d3e2b11");
        assert_eq!(view.name, "Ana");
        assert_eq!(view.role, Role::Seller);

        let wire = serde_json::to_value(&view).unwrap();
        assert_eq!(wire["nombre"], json!("Ana"));
        assert_eq!(wire["rol"], json!("vendedor"));
    }

    #[test]
    fn user_view_rejects_unknown_role_and_missing_id() {
        let bad_role = doc(json!({"_id": "x", "nombre": "A", "email": "a@x.io", "rol": "root"}));
        assert!(matches!(user_view(&bad_role), Err(MapError::MalformedUser(_))));

        let no_id = doc(json!({"nombre": "A", "email": "a@x.io", "rol": "admin"}));
        assert!(matches!(user_view(&no_id), Err(MapError::MissingId("user"))));
    }

    #[test]
    fn order_view_defaults_missing_counters_to_zero() {
        let view = order_view(&doc(json!({"_id": "o1", "pedidos_pagados": 7})), fixed_now()).unwrap();
        assert_eq!(view.paid, 7);
        assert_eq!(view.cancelled, 0);
        assert_eq!(view.shipped, 0);
        assert_eq!(view.resent, 0);
    }

    #[test]
    fn order_view_uses_now_for_absent_or_unreadable_timestamp() {
        let now = fixed_now();
        let absent = order_view(&doc(json!({"_id": "o1"})), now).unwrap();
        assert_eq!(absent.placed_at, now);

        let null = order_view(&doc(json!({"_id": "o1", "fecha": null})), now).unwrap();
        assert_eq!(null.placed_at, now);

        let garbage = order_view(&doc(json!({"_id": "o1", "fecha": "yesterday"})), now).unwrap();
        assert_eq!(garbage.placed_at, now);
    }

    #[test]
    fn order_view_keeps_stored_timestamp() {
        let view = order_view(
            &doc(json!({"_id": "o1", "fecha": "2023-10-25T00:00:00Z"})),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(view.placed_at, Utc.with_ymd_and_hms(2023, 10, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn orders_view_maps_every_document() {
        let docs = vec![doc(json!({"_id": "a"})), doc(json!({"_id": "b"}))];
        let views = orders_view(&docs, fixed_now()).unwrap();
        assert_eq!(views.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
    }
}
