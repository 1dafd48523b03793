use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    get, post, web, HttpResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    db::students::{self, NewStudent},
    error::{AppError, Result},
    middleware::auth::{AuthenticatedStudent, SESSION_COOKIE},
    models::StudentProfile,
    security::{jwt, password},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 40))]
    pub student_type: String,
    #[validate(length(min = 1, max = 120))]
    pub program: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub student: StudentProfile,
}

#[post("/api/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = body.email.trim().to_lowercase();
    if students::email_exists(&state.db, &email).await? {
        return Err(AppError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let password_hash = password::hash_password(&body.password)?;
    let student = students::insert(
        &state.db,
        NewStudent {
            full_name: body.full_name.trim(),
            email: &email,
            password_hash: &password_hash,
            student_type: body.student_type.trim(),
            program: body.program.trim(),
            avatar_url: body.avatar_url.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "Registration successful".into(),
        student: student.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub student: StudentProfile,
}

#[post("/api/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let student = students::find_by_email(&state.db, &body.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".into()))?;

    if !password::verify_password(&body.password, &student.password_hash)? {
        return Err(AppError::Authentication("Invalid credentials".into()));
    }

    let token = jwt::issue_session(
        &state.config.jwt_secret,
        student.id,
        &student.email,
        student.is_admin,
        state.config.session_ttl_hours,
    )?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(state.config.session_ttl_hours))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        success: true,
        student: student.into(),
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub student: Option<StudentProfile>,
}

#[get("/api/auth/me")]
pub async fn me(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let profile = students::find_profile(&state.db, student.id).await?;
    Ok(HttpResponse::Ok().json(MeResponse { student: profile }))
}
