/// Campus chat rooms: room listing, pin toggling, and room message history.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatMessage, ChatRoom};

pub async fn list_rooms(pool: &PgPool) -> Result<Vec<ChatRoom>> {
    let rooms = sqlx::query_as::<_, ChatRoom>("SELECT * FROM chat_rooms ORDER BY created_at ASC")
        .fetch_all(pool)
        .await?;

    Ok(rooms)
}

pub async fn room_exists(pool: &PgPool, room_id: Uuid) -> Result<bool> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM chat_rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub async fn pinned_room_ids(pool: &PgPool, student_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT room_id FROM student_pinned_rooms WHERE student_id = $1")
            .bind(student_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Toggle pin state; returns the new state (true = pinned).
pub async fn toggle_pin(pool: &PgPool, student_id: Uuid, room_id: Uuid) -> Result<bool> {
    let removed = sqlx::query(
        "DELETE FROM student_pinned_rooms WHERE student_id = $1 AND room_id = $2",
    )
    .bind(student_id)
    .bind(room_id)
    .execute(pool)
    .await?;

    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query("INSERT INTO student_pinned_rooms (student_id, room_id) VALUES ($1, $2)")
        .bind(student_id)
        .bind(room_id)
        .execute(pool)
        .await?;

    Ok(true)
}

pub async fn list_messages(pool: &PgPool, room_id: Uuid) -> Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT m.id, m.room_id, m.student_id, s.full_name AS student_name,
               s.avatar_url AS student_avatar_url, m.content, m.created_at
        FROM chat_messages m
        JOIN students s ON s.id = m.student_id
        WHERE m.room_id = $1
        ORDER BY m.created_at ASC
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

pub async fn insert_message(
    pool: &PgPool,
    room_id: Uuid,
    student_id: Uuid,
    content: &str,
) -> Result<ChatMessage> {
    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        WITH inserted AS (
            INSERT INTO chat_messages (room_id, student_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
        )
        SELECT i.id, i.room_id, i.student_id, s.full_name AS student_name,
               s.avatar_url AS student_avatar_url, i.content, i.created_at
        FROM inserted i
        JOIN students s ON s.id = i.student_id
        "#,
    )
    .bind(room_id)
    .bind(student_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(message)
}
