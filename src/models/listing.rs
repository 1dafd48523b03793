use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A marketplace item. `owner_id` is nullable at the schema level; the
/// purchase path treats an active listing without an owner as a data
/// integrity violation rather than a user error.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i32,
    pub category: String,
    pub condition: String,
    pub campus: String,
    pub image_url: Option<String>,
    pub owner_id: Option<Uuid>,
    pub is_active: bool,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
