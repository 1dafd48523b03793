/// Student database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Student, StudentProfile};

pub struct NewStudent<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub student_type: &'a str,
    pub program: &'a str,
    pub avatar_url: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, new: NewStudent<'_>) -> Result<Student> {
    let student = sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students (full_name, email, password_hash, student_type, program, avatar_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(new.full_name)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.student_type)
    .bind(new.program)
    .bind(new.avatar_url)
    .fetch_one(pool)
    .await?;

    Ok(student)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(student)
}

pub async fn find_profile(pool: &PgPool, id: Uuid) -> Result<Option<StudentProfile>> {
    let profile = sqlx::query_as::<_, StudentProfile>(
        r#"
        SELECT id, full_name, email, student_type, program, avatar_url, is_admin
        FROM students WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
