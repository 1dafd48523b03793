/// Current-principal extraction from the session cookie.
/// Session mechanics stay behind this one seam; handlers only see ids.
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::{error::AppError, security::jwt, state::AppState};

pub const SESSION_COOKIE: &str = "student_session";

/// Authenticated principal resolved from the `student_session` JWT cookie
/// (or a Bearer token for non-browser clients).
#[derive(Debug, Clone)]
pub struct AuthenticatedStudent {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

impl AuthenticatedStudent {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin access required".into()))
        }
    }
}

fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedStudent, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState missing from request".into()))?;

    let token = extract_token(req)
        .ok_or_else(|| AppError::Authentication("Missing session".into()))?;

    let claims = jwt::decode_session(&state.config.jwt_secret, &token)
        .map_err(|_| AppError::Authentication("Invalid or expired session".into()))?;

    Ok(AuthenticatedStudent {
        id: claims.sub,
        email: claims.email,
        is_admin: claims.is_admin,
    })
}

impl FromRequest for AuthenticatedStudent {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
