use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::announcements,
    error::{AppError, Result},
    middleware::AuthenticatedStudent,
    models::Announcement,
    state::AppState,
};

#[derive(Serialize)]
pub struct AnnouncementsResponse {
    pub announcements: Vec<Announcement>,
}

#[get("/api/announcements")]
pub async fn list_announcements(
    state: web::Data<AppState>,
    _student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let announcements = announcements::list(&state.db).await?;
    Ok(HttpResponse::Ok().json(AnnouncementsResponse { announcements }))
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub body: String,
}

#[post("/api/announcements")]
pub async fn create_announcement(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    body: web::Json<CreateAnnouncementRequest>,
) -> Result<HttpResponse> {
    student.require_admin()?;

    let title = body.title.trim();
    let text = body.body.trim();
    if title.is_empty() || text.is_empty() {
        return Err(AppError::BadRequest("Title and body are required".into()));
    }

    let announcement = announcements::create(&state.db, title, text, student.id).await?;
    Ok(HttpResponse::Created().json(announcement))
}

#[delete("/api/announcements/{id}")]
pub async fn delete_announcement(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    student.require_admin()?;

    if !announcements::delete(&state.db, id.into_inner()).await? {
        return Err(AppError::NotFound("Announcement not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
