/// Announcement CRUD (admin-authored campus notices).
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Announcement;

pub async fn list(pool: &PgPool) -> Result<Vec<Announcement>> {
    let announcements = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(announcements)
}

pub async fn create(
    pool: &PgPool,
    title: &str,
    body: &str,
    created_by: Uuid,
) -> Result<Announcement> {
    let announcement = sqlx::query_as::<_, Announcement>(
        r#"
        INSERT INTO announcements (title, body, created_by)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(body)
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    Ok(announcement)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
