/// Marketplace conversations: one thread per order, append-only messages.
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Conversation, Message};

pub async fn insert<'e, E>(
    executor: E,
    order_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
) -> Result<Conversation>
where
    E: PgExecutor<'e>,
{
    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO market_conversations (order_id, buyer_id, seller_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(buyer_id)
    .bind(seller_id)
    .fetch_one(executor)
    .await?;

    Ok(conversation)
}

pub async fn insert_message<'e, E>(
    executor: E,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> Result<Message>
where
    E: PgExecutor<'e>,
{
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO market_messages (conversation_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(executor)
    .await?;

    Ok(message)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Conversation>> {
    let conversation =
        sqlx::query_as::<_, Conversation>("SELECT * FROM market_conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(conversation)
}

pub async fn list_for_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<Conversation>> {
    let conversations = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT * FROM market_conversations
        WHERE buyer_id = $1 OR seller_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(conversations)
}

/// Messages in creation order; the seq column breaks created_at ties.
pub async fn list_messages(pool: &PgPool, conversation_id: Uuid) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT * FROM market_messages
        WHERE conversation_id = $1
        ORDER BY created_at ASC, seq ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
