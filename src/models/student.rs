use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub student_type: String,
    pub program: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection, never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub student_type: String,
    pub program: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

impl From<Student> for StudentProfile {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            full_name: s.full_name,
            email: s.email,
            student_type: s.student_type,
            program: s.program,
            avatar_url: s.avatar_url,
            is_admin: s.is_admin,
        }
    }
}
