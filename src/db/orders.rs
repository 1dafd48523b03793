/// Order ledger: append-only inserts plus buyer/seller projections.
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Order, OrderStatus, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pure insert; nothing ever updates an order row through this service.
/// Executor-generic so the purchase path can run it inside its transaction.
pub async fn insert<'e, E>(
    executor: E,
    listing_id: Uuid,
    buyer_id: Uuid,
    payment_method: PaymentMethod,
    status: OrderStatus,
    gateway_session_id: Option<&str>,
) -> Result<Order>
where
    E: PgExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (listing_id, buyer_id, payment_method, status, gateway_session_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(listing_id)
    .bind(buyer_id)
    .bind(payment_method)
    .bind(status)
    .bind(gateway_session_id)
    .fetch_one(executor)
    .await?;

    Ok(order)
}

/// Order joined with its listing title for history views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub buyer_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

pub async fn list_for_buyer(pool: &PgPool, buyer_id: Uuid) -> Result<Vec<OrderSummary>> {
    let orders = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT o.id, o.listing_id, l.title AS listing_title, o.buyer_id,
               o.payment_method, o.status, o.created_at
        FROM orders o
        JOIN listings l ON l.id = o.listing_id
        WHERE o.buyer_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(buyer_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn list_for_seller(pool: &PgPool, seller_id: Uuid) -> Result<Vec<OrderSummary>> {
    let orders = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT o.id, o.listing_id, l.title AS listing_title, o.buyer_id,
               o.payment_method, o.status, o.created_at
        FROM orders o
        JOIN listings l ON l.id = o.listing_id
        WHERE l.owner_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(seller_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}
