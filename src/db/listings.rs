/// Listing store: active-listing reads, owner-scoped writes, and the
/// conditional sold-flip used by the purchase path.
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Listing;

pub struct NewListing<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price_cents: i32,
    pub category: &'a str,
    pub condition: &'a str,
    pub campus: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub campus: Option<String>,
    pub image_url: Option<String>,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Listing>> {
    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(listing)
}

pub async fn list_active(
    pool: &PgPool,
    category: Option<&str>,
    campus: Option<&str>,
) -> Result<Vec<Listing>> {
    let listings = sqlx::query_as::<_, Listing>(
        r#"
        SELECT * FROM listings
        WHERE is_active
          AND ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR campus = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(category)
    .bind(campus)
    .fetch_all(pool)
    .await?;

    Ok(listings)
}

pub async fn list_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Listing>> {
    let listings = sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(listings)
}

pub async fn create(pool: &PgPool, owner_id: Uuid, new: NewListing<'_>) -> Result<Listing> {
    let listing = sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (title, description, price_cents, category, condition, campus, image_url, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.title)
    .bind(new.description)
    .bind(new.price_cents)
    .bind(new.category)
    .bind(new.condition)
    .bind(new.campus)
    .bind(new.image_url)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    Ok(listing)
}

/// Owner-scoped partial update. Sold listings are immutable through this
/// path, so the WHERE clause also requires is_active.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    update: ListingUpdate,
) -> Result<Option<Listing>> {
    let listing = sqlx::query_as::<_, Listing>(
        r#"
        UPDATE listings SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            price_cents = COALESCE($5, price_cents),
            category = COALESCE($6, category),
            condition = COALESCE($7, condition),
            campus = COALESCE($8, campus),
            image_url = COALESCE($9, image_url),
            updated_at = NOW()
        WHERE id = $1 AND owner_id = $2 AND is_active
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(update.title)
    .bind(update.description)
    .bind(update.price_cents)
    .bind(update.category)
    .bind(update.condition)
    .bind(update.campus)
    .bind(update.image_url)
    .fetch_optional(pool)
    .await?;

    Ok(listing)
}

pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1 AND owner_id = $2 AND is_active")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Compare-and-set sold flip: succeeds only if the listing is still active.
/// Returns false when the race was lost to a concurrent purchase.
/// Executor-generic so the purchase path can run it inside its transaction.
pub async fn mark_sold<'e, E>(executor: E, id: Uuid, sold_at: DateTime<Utc>) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result =
        sqlx::query("UPDATE listings SET is_active = FALSE, sold_at = $2 WHERE id = $1 AND is_active")
            .bind(id)
            .bind(sold_at)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}
