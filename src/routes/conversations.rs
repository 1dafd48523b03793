use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::conversations,
    error::{AppError, Result},
    middleware::AuthenticatedStudent,
    models::{Conversation, Message},
    state::AppState,
};

#[derive(Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[get("/api/marketplace/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let conversations = conversations::list_for_student(&state.db, student.id).await?;
    Ok(HttpResponse::Ok().json(ConversationsResponse { conversations }))
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[get("/api/marketplace/conversations/{id}/messages")]
pub async fn get_messages(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let conversation = conversations::find_by_id(&state.db, id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

    if !conversation.includes(student.id) {
        return Err(AppError::Authorization(
            "You are not part of this conversation".into(),
        ));
    }

    let messages = conversations::list_messages(&state.db, conversation.id).await?;
    Ok(HttpResponse::Ok().json(MessagesResponse { messages }))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    pub message: Message,
}

#[post("/api/marketplace/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    id: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".into()));
    }

    let conversation = conversations::find_by_id(&state.db, id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

    if !conversation.includes(student.id) {
        return Err(AppError::Authorization(
            "You are not part of this conversation".into(),
        ));
    }

    let message =
        conversations::insert_message(&state.db, conversation.id, student.id, content).await?;

    Ok(HttpResponse::Ok().json(SendMessageResponse { message }))
}
