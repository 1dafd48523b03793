/// Postgres implementation of the purchase storage seam.
///
/// `commit_purchase` is the atomic unit of the purchase workflow: the order
/// insert, the conditional sold-flip, and the seeded conversation share one
/// transaction. Either all of them commit or none are visible.
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{conversations, listings, orders};
use crate::error::{AppError, Result};
use crate::models::Listing;
use crate::services::purchase::{MarketStore, PurchaseCommit, PurchaseRecord};

pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A unique violation on orders(listing_id) means another purchase already
/// recorded an order for this listing; treat it like a lost sold-flip race.
fn map_order_conflict(err: AppError) -> AppError {
    if let AppError::Database(sqlx::Error::Database(ref db_err)) = err {
        if db_err.constraint() == Some("orders_listing_unique") {
            return AppError::AlreadySold;
        }
    }
    err
}

#[async_trait]
impl MarketStore for PgMarketStore {
    async fn fetch_listing(&self, id: Uuid) -> Result<Option<Listing>> {
        listings::find_by_id(&self.pool, id).await
    }

    async fn commit_purchase(&self, commit: PurchaseCommit) -> Result<PurchaseRecord> {
        let mut tx = self.pool.begin().await?;

        let order = orders::insert(
            &mut *tx,
            commit.listing_id,
            commit.buyer_id,
            commit.payment_method,
            commit.status,
            commit.gateway_session_id.as_deref(),
        )
        .await
        .map_err(map_order_conflict)?;

        // Compare-and-set: only flips if the listing is still active.
        // Dropping the transaction on failure rolls the order back with it.
        let sold = listings::mark_sold(&mut *tx, commit.listing_id, commit.sold_at).await?;
        if !sold {
            return Err(AppError::AlreadySold);
        }

        let conversation =
            conversations::insert(&mut *tx, order.id, commit.buyer_id, commit.seller_id).await?;
        conversations::insert_message(
            &mut *tx,
            conversation.id,
            commit.buyer_id,
            &commit.opening_message,
        )
        .await?;

        tx.commit().await?;

        Ok(PurchaseRecord {
            order_id: order.id,
            conversation_id: conversation.id,
        })
    }
}
