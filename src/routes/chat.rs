use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::chat,
    error::{AppError, Result},
    middleware::AuthenticatedStudent,
    models::{ChatMessage, ChatRoom},
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    #[serde(flatten)]
    pub room: ChatRoom,
    pub pinned: bool,
}

#[derive(Serialize)]
pub struct RoomsResponse {
    pub rooms: Vec<RoomView>,
}

/// Rooms are shared campus-wide; pins are per student.
#[get("/api/chat/rooms")]
pub async fn list_rooms(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let rooms = chat::list_rooms(&state.db).await?;
    let pinned = chat::pinned_room_ids(&state.db, student.id).await?;

    let rooms = rooms
        .into_iter()
        .map(|room| RoomView {
            pinned: pinned.contains(&room.id),
            room,
        })
        .collect();

    Ok(HttpResponse::Ok().json(RoomsResponse { rooms }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub room_id: Uuid,
}

#[derive(Serialize)]
pub struct PinResponse {
    pub pinned: bool,
}

#[post("/api/chat/rooms/pin")]
pub async fn toggle_pin(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    body: web::Json<PinRequest>,
) -> Result<HttpResponse> {
    if !chat::room_exists(&state.db, body.room_id).await? {
        return Err(AppError::NotFound("Room not found".into()));
    }

    let pinned = chat::toggle_pin(&state.db, student.id, body.room_id).await?;
    Ok(HttpResponse::Ok().json(PinResponse { pinned }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessagesQuery {
    pub room_id: Uuid,
}

#[derive(Serialize)]
pub struct ChatMessagesResponse {
    pub messages: Vec<ChatMessage>,
}

#[get("/api/chat/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    _student: AuthenticatedStudent,
    query: web::Query<RoomMessagesQuery>,
) -> Result<HttpResponse> {
    if !chat::room_exists(&state.db, query.room_id).await? {
        return Err(AppError::NotFound("Room not found".into()));
    }

    let messages = chat::list_messages(&state.db, query.room_id).await?;
    Ok(HttpResponse::Ok().json(ChatMessagesResponse { messages }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatMessageRequest {
    pub room_id: Uuid,
    pub content: String,
}

#[derive(Serialize)]
pub struct SendChatMessageResponse {
    pub message: ChatMessage,
}

#[post("/api/chat/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    body: web::Json<SendChatMessageRequest>,
) -> Result<HttpResponse> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".into()));
    }

    if !chat::room_exists(&state.db, body.room_id).await? {
        return Err(AppError::NotFound("Room not found".into()));
    }

    let message = chat::insert_message(&state.db, body.room_id, student.id, content).await?;
    Ok(HttpResponse::Ok().json(SendChatMessageResponse { message }))
}
