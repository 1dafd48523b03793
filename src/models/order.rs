use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    InPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Paid,
}

/// Immutable record of a purchase. Inserted once by the purchase
/// orchestrator, never updated or deleted through this service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub gateway_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::InPerson).unwrap(),
            "\"in_person\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), "\"card\"");
        let parsed: PaymentMethod = serde_json::from_str("\"in_person\"").unwrap();
        assert_eq!(parsed, PaymentMethod::InPerson);
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        assert!(serde_json::from_str::<PaymentMethod>("\"paypal\"").is_err());
    }

    #[test]
    fn order_status_wire_format() {
        assert_eq!(serde_json::to_string(&OrderStatus::Created).unwrap(), "\"created\"");
        assert_eq!(serde_json::to_string(&OrderStatus::Paid).unwrap(), "\"paid\"");
    }
}
